//! In-memory `CredentialRepository` keyed by username.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{CredentialRepository, CredentialRepositoryError};
use crate::domain::{UserCredential, Username};

/// Map-backed credential store.
#[derive(Debug, Default)]
pub struct InMemoryCredentialRepository {
    accounts: Mutex<HashMap<String, UserCredential>>,
}

impl InMemoryCredentialRepository {
    fn poisoned() -> CredentialRepositoryError {
        CredentialRepositoryError::query("credential store lock poisoned")
    }
}

#[async_trait]
impl CredentialRepository for InMemoryCredentialRepository {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserCredential>, CredentialRepositoryError> {
        let accounts = self.accounts.lock().map_err(|_| Self::poisoned())?;
        Ok(accounts.get(username.as_str()).cloned())
    }

    async fn upsert(
        &self,
        credential: &UserCredential,
    ) -> Result<UserCredential, CredentialRepositoryError> {
        let mut accounts = self.accounts.lock().map_err(|_| Self::poisoned())?;
        let stored = accounts
            .entry(credential.username.as_str().to_owned())
            .and_modify(|existing| existing.password_hash = credential.password_hash.clone())
            .or_insert_with(|| credential.clone());
        Ok(stored.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use crate::domain::{PasswordHash, UserId};

    fn credential(name: &str, password: &str) -> UserCredential {
        UserCredential {
            id: UserId::random(),
            username: Username::new(name).expect("username"),
            password_hash: PasswordHash::hash(password).expect("hash"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn upsert_keeps_identity_and_replaces_password() {
        let repo = InMemoryCredentialRepository::default();
        let first = repo
            .upsert(&credential("admin", "password"))
            .await
            .expect("create");
        let second = repo
            .upsert(&credential("admin", "rotated"))
            .await
            .expect("update");

        assert_eq!(first.id, second.id);
        assert!(second.password_hash.verify("rotated"));
        assert!(!second.password_hash.verify("password"));
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_usernames_are_absent() {
        let repo = InMemoryCredentialRepository::default();
        let found = repo
            .find_by_username(&Username::new("ghost").expect("username"))
            .await
            .expect("lookup");
        assert!(found.is_none());
    }
}
