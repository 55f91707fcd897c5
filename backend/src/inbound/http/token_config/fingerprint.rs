//! Token secret fingerprinting for operational visibility.
//!
//! Operators compare fingerprints across replicas to confirm they share a
//! signing secret without the secret ever reaching the logs.

use sha2::{Digest, Sha256};

/// Length of the fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Truncated SHA-256 fingerprint of `secret`: the first 8 bytes of the
/// digest as 16 lowercase hex characters.
///
/// # Examples
///
/// ```rust
/// use backend::inbound::http::token_config::fingerprint::secret_fingerprint;
///
/// let fp = secret_fingerprint(b"an example signing secret");
///
/// assert_eq!(fp.len(), 16);
/// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn secret_fingerprint(secret: &[u8]) -> String {
    let digest = Sha256::digest(secret);
    hex::encode(&digest[..FINGERPRINT_BYTES])
}
