//! Error type for the task client.
//!
//! Every failure the client can observe collapses into [`ClientError`], whose
//! `Display` output is suitable for showing to a person.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised while talking to the task API or reconciling board state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The configured base URL cannot be used to build request URLs.
    #[error("invalid API base URL '{url}': {message}")]
    InvalidBaseUrl {
        /// Rejected value.
        url: String,
        /// Parser diagnostic.
        message: String,
    },

    /// The request never produced an HTTP response.
    #[error("could not reach the task service: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected response from the task service: {message}")]
    Decode {
        /// Description of the decoding failure.
        message: String,
    },

    /// A protected call was attempted before logging in.
    #[error("please log in to continue")]
    NotAuthenticated,

    /// The server rejected the held token, which has been discarded.
    #[error("{message}; please log in again")]
    SessionExpired {
        /// Message extracted from the 401 response.
        message: String,
    },

    /// The board has no task with this identifier.
    #[error("task {id} is not on the board")]
    UnknownTask {
        /// Identifier that was looked up.
        id: Uuid,
    },
}

impl ClientError {
    /// HTTP status for [`ClientError::Api`] failures.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the server reported the target as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    /// True when the caller has to log in before retrying.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Api { status: 401, .. } | Self::NotAuthenticated | Self::SessionExpired { .. }
        )
    }
}
