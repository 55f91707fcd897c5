//! Translation of pool and Diesel failures into port error constructors.
//!
//! Repositories pass their own `connection`/`query` constructors so each port
//! keeps its error type while sharing one classification of Diesel failures.
//! Messages are generic; driver detail is logged at debug level only.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Pool failures always mean the database is unreachable.
pub(super) fn map_pool_error<E>(error: PoolError, connection: impl FnOnce(String) -> E) -> E {
    debug!(error = %error, "connection checkout failed");
    connection(error.into_message())
}

/// Classify a Diesel error as a connection or query failure.
pub(super) fn map_diesel_error<E>(
    error: DieselError,
    query: impl FnOnce(&'static str) -> E,
    connection: impl FnOnce(&'static str) -> E,
) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
        | DieselError::BrokenTransactionManager => connection("database connection error"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            query("unique constraint violated")
        }
        DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, _) => {
            query("check constraint violated")
        }
        DieselError::NotFound => query("record not found"),
        _ => query("database error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq, Eq)]
    enum Mapped {
        Query(&'static str),
        Connection(String),
    }

    fn classify(error: DieselError) -> Mapped {
        map_diesel_error(error, Mapped::Query, |m| Mapped::Connection(m.to_owned()))
    }

    #[rstest]
    fn not_found_is_a_query_failure() {
        assert_eq!(classify(DieselError::NotFound), Mapped::Query("record not found"));
    }

    #[rstest]
    fn broken_transactions_are_connection_failures() {
        assert!(matches!(
            classify(DieselError::BrokenTransactionManager),
            Mapped::Connection(_)
        ));
    }

    #[rstest]
    fn pool_errors_keep_their_message() {
        let mapped = map_pool_error(PoolError::checkout("timed out"), Mapped::Connection);
        assert_eq!(mapped, Mapped::Connection("timed out".to_owned()));
    }
}
