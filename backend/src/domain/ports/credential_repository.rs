//! Driven port for the credential store.
use async_trait::async_trait;

use crate::domain::{UserCredential, Username};

use super::define_port_error;

define_port_error! {
    /// Failures raised by credential store adapters.
    pub enum CredentialRepositoryError {
        /// Store could not be reached.
        Connection { message: String } => transient "credential store connection failed: {message}",
        /// Lookup or write failed during execution.
        Query { message: String } => permanent "credential store query failed: {message}",
        /// A stored hash could not be decoded.
        CorruptRecord { username: String } => permanent "stored credential for {username} is corrupt",
    }
}

/// Lookup and provisioning of user credentials.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Find the credential registered under `username`.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserCredential>, CredentialRepositoryError>;

    /// Create the account, or replace the password of an existing username.
    ///
    /// Returns the stored record; an existing account keeps its identifier.
    async fn upsert(
        &self,
        credential: &UserCredential,
    ) -> Result<UserCredential, CredentialRepositoryError>;
}
