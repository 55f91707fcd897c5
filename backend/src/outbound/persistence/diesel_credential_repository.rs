//! PostgreSQL-backed `CredentialRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{CredentialRepository, CredentialRepositoryError};
use crate::domain::{PasswordHash, UserCredential, UserId, Username};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{CredentialRow, NewCredentialRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed credential store.
#[derive(Clone)]
pub struct DieselCredentialRepository {
    pool: DbPool,
}

impl DieselCredentialRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> CredentialRepositoryError {
    map_pool_error(error, CredentialRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> CredentialRepositoryError {
    map_diesel_error(
        error,
        CredentialRepositoryError::query,
        CredentialRepositoryError::connection,
    )
}

fn row_to_credential(row: CredentialRow) -> Result<UserCredential, CredentialRepositoryError> {
    let CredentialRow {
        id,
        username,
        password_hash,
    } = row;

    let Ok(parsed_name) = Username::new(&username) else {
        warn!(user_id = %id, "stored username failed validation");
        return Err(CredentialRepositoryError::corrupt_record(username));
    };
    let Ok(password_hash) = PasswordHash::parse(password_hash) else {
        warn!(user_id = %id, "stored password hash failed to parse");
        return Err(CredentialRepositoryError::corrupt_record(username));
    };

    Ok(UserCredential {
        id: UserId::from_uuid(id),
        username: parsed_name,
        password_hash,
    })
}

#[async_trait]
impl CredentialRepository for DieselCredentialRepository {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserCredential>, CredentialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row: Option<CredentialRow> = users::table
            .filter(users::username.eq(username.as_str()))
            .select(CredentialRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map(row_to_credential).transpose()
    }

    async fn upsert(
        &self,
        credential: &UserCredential,
    ) -> Result<UserCredential, CredentialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = NewCredentialRow {
            id: *credential.id.as_uuid(),
            username: credential.username.as_str(),
            password_hash: credential.password_hash.as_str(),
        };

        let stored: CredentialRow = diesel::insert_into(users::table)
            .values(&row)
            .on_conflict(users::username)
            .do_update()
            .set((
                users::password_hash.eq(excluded(users::password_hash)),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .returning(CredentialRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;

        row_to_credential(stored)
    }
}
