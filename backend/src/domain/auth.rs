//! Shape checks for the `/login` payload.
//!
//! The verifier only ever sees a [`LoginCredentials`]; blank fields are
//! rejected here so the repository is never queried for them.

use std::fmt;

use thiserror::Error;
use zeroize::Zeroizing;

/// Why a login payload was refused before verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoginValidationError {
    /// Missing, empty or whitespace-only username.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Missing or empty password.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Username and password as submitted to `/login`.
///
/// The username is trimmed; the password is kept byte for byte, since
/// surrounding spaces are part of what was hashed at provisioning time.
/// The password buffer is zeroed when dropped and never printed by `Debug`.
///
/// # Examples
/// ```
/// use backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" alice ", "s3cret").unwrap();
/// assert_eq!(creds.username(), "alice");
/// assert!(!format!("{creds:?}").contains("s3cret"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Validate raw form fields.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Lookup key for the credential store.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Candidate password to check against the stored hash.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
