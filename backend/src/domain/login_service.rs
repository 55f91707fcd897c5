//! Credential verifier backing the `LoginService` port.
//!
//! Looks the username up in the credential store and checks the password
//! against the stored Argon2id hash. Unknown users and wrong passwords are
//! indistinguishable to the caller: an unknown username is checked against a
//! decoy hash so both rejections pay the same Argon2 cost.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};
use zeroize::Zeroizing;

use super::ports::{CredentialRepository, CredentialRepositoryError, LoginService};
use super::{Error, LoginCredentials, PasswordHash, UserId, Username};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// `LoginService` implementation over a [`CredentialRepository`].
#[derive(Clone)]
pub struct CredentialLoginService {
    credentials: Arc<dyn CredentialRepository>,
}

impl CredentialLoginService {
    /// Create a service reading from `credentials`.
    pub fn new(credentials: Arc<dyn CredentialRepository>) -> Self {
        Self { credentials }
    }
}

pub(crate) fn map_credential_error(error: CredentialRepositoryError) -> Error {
    match error {
        CredentialRepositoryError::CorruptRecord { username } => {
            error!(%username, "stored password hash is corrupt");
            Error::internal("stored credential is corrupt")
        }
        other if other.is_transient() => {
            warn!(error = %other, "credential store unavailable");
            Error::service_unavailable("credential store unavailable")
        }
        other => Error::internal(other.to_string()),
    }
}

#[async_trait]
impl LoginService for CredentialLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let Ok(username) = Username::new(credentials.username()) else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let record = self
            .credentials
            .find_by_username(&username)
            .await
            .map_err(map_credential_error)?;
        let hash = record
            .as_ref()
            .map_or_else(PasswordHash::decoy, |stored| stored.password_hash.clone());
        let matches = verify_off_thread(hash, credentials.password()).await?;

        match record {
            Some(record) if matches => {
                info!(%username, user_id = %record.id, "login accepted");
                Ok(record.id)
            }
            Some(_) => {
                info!(%username, "login rejected: password mismatch");
                Err(Error::unauthorized(INVALID_CREDENTIALS))
            }
            None => {
                info!(%username, "login rejected: unknown user");
                Err(Error::unauthorized(INVALID_CREDENTIALS))
            }
        }
    }
}

/// Argon2 verification blocks, so it runs on the blocking pool.
async fn verify_off_thread(hash: PasswordHash, password: &str) -> Result<bool, Error> {
    let password = Zeroizing::new(password.to_owned());
    tokio::task::spawn_blocking(move || hash.verify(&password))
        .await
        .map_err(|err| {
            error!(error = %err, "password verification task failed");
            Error::internal("password verification failed")
        })
}
