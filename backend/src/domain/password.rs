//! Argon2id password hashing for stored credentials.
//!
//! Hashes are kept as PHC strings (`$argon2id$v=19$...`) so the algorithm
//! parameters and salt travel with the digest.

use std::fmt;

use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash as PhcString, PasswordHasher, PasswordVerifier, SaltString,
};
use rand::rngs::OsRng;

/// Digest checked when the username is unknown, so the rejection costs the
/// same as a wrong password. Uses the default Argon2id cost parameters.
const DECOY_PHC: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Failures while producing or parsing a password hash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordHashError {
    /// The stored value is not a PHC string.
    #[error("password hash is not a valid PHC string")]
    Malformed,
    /// Hashing failed inside the Argon2 implementation.
    #[error("failed to hash password: {message}")]
    Hashing {
        /// Underlying failure description.
        message: String,
    },
}

/// Salted Argon2id password hash.
///
/// # Examples
/// ```
/// use backend::domain::PasswordHash;
///
/// let hash = PasswordHash::hash("correct horse").unwrap();
/// assert!(hash.verify("correct horse"));
/// assert!(!hash.verify("wrong"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash `plaintext` with a fresh random salt.
    pub fn hash(plaintext: &str) -> Result<Self, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let digest = Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|err| PasswordHashError::Hashing {
                message: err.to_string(),
            })?;
        Ok(Self(digest.to_string()))
    }

    /// Accept a stored PHC string after checking its shape.
    pub fn parse(encoded: impl Into<String>) -> Result<Self, PasswordHashError> {
        let encoded = encoded.into();
        PhcString::new(&encoded).map_err(|_| PasswordHashError::Malformed)?;
        Ok(Self(encoded))
    }

    /// Check `plaintext` against the stored digest.
    pub fn verify(&self, plaintext: &str) -> bool {
        match PhcString::new(&self.0) {
            Ok(parsed) => Argon2::default()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Hash that matches no password, verified in place of a missing account.
    pub(crate) fn decoy() -> Self {
        Self(DECOY_PHC.to_owned())
    }

    /// Encoded PHC string, for persistence.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn hashes_are_salted() {
        let first = PasswordHash::hash("hunter2").expect("hash");
        let second = PasswordHash::hash("hunter2").expect("hash");
        assert_ne!(first.as_str(), second.as_str());
        assert!(first.as_str().starts_with("$argon2id$"));
        assert!(second.verify("hunter2"));
    }

    #[rstest]
    fn parse_round_trips_stored_hash() {
        let hash = PasswordHash::hash("hunter2").expect("hash");
        let parsed = PasswordHash::parse(hash.as_str()).expect("parse");
        assert!(parsed.verify("hunter2"));
        assert!(!parsed.verify("hunter3"));
    }

    #[rstest]
    #[case("")]
    #[case("plaintext")]
    fn parse_rejects_non_phc_values(#[case] raw: &str) {
        assert_eq!(
            PasswordHash::parse(raw).expect_err("must fail"),
            PasswordHashError::Malformed
        );
    }

    #[rstest]
    fn decoy_costs_as_much_as_a_real_hash() {
        let decoy = PasswordHash::decoy();
        let phc = PhcString::new(decoy.as_str()).expect("decoy is a PHC string");
        let params = argon2::Params::try_from(&phc).expect("argon2 params");
        let defaults = argon2::Params::default();
        assert_eq!(params.m_cost(), defaults.m_cost());
        assert_eq!(params.t_cost(), defaults.t_cost());
        assert_eq!(params.p_cost(), defaults.p_cost());
        assert!(!decoy.verify("password"));
        assert!(!decoy.verify(""));
    }

    #[rstest]
    fn debug_hides_digest() {
        let hash = PasswordHash::hash("hunter2").expect("hash");
        assert_eq!(format!("{hash:?}"), "PasswordHash(..)");
    }
}
