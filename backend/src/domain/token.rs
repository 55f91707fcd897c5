//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying `{sub, iat, exp}` with a fixed one-hour
//! lifetime. Nothing is stored server side; the signature and the expiry are
//! the whole story.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::{Error, UserId};

/// Lifetime of every issued token, in seconds.
pub const TOKEN_TTL_SECONDS: i64 = 3600;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// HMAC key pair derived from the signing secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    /// Derive keys from raw secret bytes.
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Outcome of checking a presented token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenVerification {
    /// Signature and expiry are valid; carries the embedded identity.
    Verified(UserId),
    /// Signature is valid but the token is past its expiry.
    Expired,
    /// Malformed, wrongly signed, or missing required claims.
    Invalid,
}

/// Verify `token` against `keys` at instant `now`.
///
/// Pure: no I/O and no ambient clock, so the gate can be tested with fixed
/// timestamps.
///
/// # Examples
/// ```
/// use backend::domain::{TokenKeys, TokenVerification, verify_token};
/// use chrono::Utc;
///
/// let keys = TokenKeys::from_secret(b"an example secret that is long enough");
/// assert_eq!(verify_token("not-a-jwt", &keys, Utc::now()), TokenVerification::Invalid);
/// ```
pub fn verify_token(token: &str, keys: &TokenKeys, now: DateTime<Utc>) -> TokenVerification {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let Ok(data) = decode::<Claims>(token, &keys.decoding, &validation) else {
        return TokenVerification::Invalid;
    };
    if data.claims.exp <= now.timestamp() {
        return TokenVerification::Expired;
    }
    match UserId::new(&data.claims.sub) {
        Ok(user_id) => TokenVerification::Verified(user_id),
        Err(_) => TokenVerification::Invalid,
    }
}

/// Freshly signed token with its validity window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Compact JWT.
    pub token: String,
    /// Issue instant (`iat`).
    pub issued_at: DateTime<Utc>,
    /// Expiry instant (`exp`).
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Seconds between issue and expiry.
    pub fn expires_in(&self) -> i64 {
        (self.expires_at - self.issued_at).num_seconds()
    }
}

/// Issues and verifies tokens using the injected clock.
#[derive(Clone)]
pub struct TokenService {
    keys: TokenKeys,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Create a token service.
    pub fn new(keys: TokenKeys, clock: Arc<dyn Clock>) -> Self {
        Self { keys, clock }
    }

    /// Sign a token for `user_id` that expires one hour from now.
    pub fn issue(&self, user_id: &UserId) -> Result<IssuedToken, Error> {
        let issued_at = truncate_to_seconds(self.clock.utc());
        let expires_at = issued_at + Duration::seconds(TOKEN_TTL_SECONDS);
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)
            .map_err(|err| {
                error!(error = %err, "failed to sign access token");
                Error::internal("failed to sign access token")
            })?;
        Ok(IssuedToken {
            token,
            issued_at,
            expires_at,
        })
    }

    /// Verify a token at the current instant.
    pub fn verify(&self, token: &str) -> TokenVerification {
        verify_token(token, &self.keys, self.clock.utc())
    }
}

fn truncate_to_seconds(instant: DateTime<Utc>) -> DateTime<Utc> {
    Utc.timestamp_opt(instant.timestamp(), 0)
        .single()
        .unwrap_or(instant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use rstest::{fixture, rstest};

    const SECRET: &[u8] = b"test secret with at least thirty-two bytes";

    struct FixtureClock(DateTime<Utc>);

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.0.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[fixture]
    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn service_at(now: DateTime<Utc>) -> TokenService {
        TokenService::new(TokenKeys::from_secret(SECRET), Arc::new(FixtureClock(now)))
    }

    #[rstest]
    fn issued_token_expires_in_exactly_one_hour(issued_at: DateTime<Utc>) {
        let issued = service_at(issued_at)
            .issue(&UserId::random())
            .expect("issue token");
        assert_eq!(issued.expires_in(), 3600);
        assert_eq!(issued.issued_at, issued_at);
    }

    #[rstest]
    fn verifies_own_tokens_within_lifetime(issued_at: DateTime<Utc>) {
        let user = UserId::random();
        let issued = service_at(issued_at).issue(&user).expect("issue token");
        let keys = TokenKeys::from_secret(SECRET);

        let later = issued_at + Duration::seconds(TOKEN_TTL_SECONDS - 1);
        assert_eq!(
            verify_token(&issued.token, &keys, later),
            TokenVerification::Verified(user)
        );
    }

    #[rstest]
    #[case(TOKEN_TTL_SECONDS)]
    #[case(TOKEN_TTL_SECONDS + 1)]
    fn tokens_expire_after_one_hour(issued_at: DateTime<Utc>, #[case] offset: i64) {
        let issued = service_at(issued_at)
            .issue(&UserId::random())
            .expect("issue token");
        let keys = TokenKeys::from_secret(SECRET);
        assert_eq!(
            verify_token(&issued.token, &keys, issued_at + Duration::seconds(offset)),
            TokenVerification::Expired
        );
    }

    #[rstest]
    fn rejects_tokens_signed_with_other_secret(issued_at: DateTime<Utc>) {
        let issued = service_at(issued_at)
            .issue(&UserId::random())
            .expect("issue token");
        let other = TokenKeys::from_secret(b"another secret of sufficient length!!");
        assert_eq!(
            verify_token(&issued.token, &other, issued_at),
            TokenVerification::Invalid
        );
    }

    #[rstest]
    fn rejects_non_uuid_subject(issued_at: DateTime<Utc>) {
        let claims = Claims {
            sub: "admin".to_owned(),
            iat: issued_at.timestamp(),
            exp: issued_at.timestamp() + TOKEN_TTL_SECONDS,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .expect("encode");
        assert_eq!(
            verify_token(&token, &TokenKeys::from_secret(SECRET), issued_at),
            TokenVerification::Invalid
        );
    }

    #[rstest]
    #[case("")]
    #[case("abc.def.ghi")]
    fn rejects_garbage(issued_at: DateTime<Utc>, #[case] token: &str) {
        assert_eq!(
            verify_token(token, &TokenKeys::from_secret(SECRET), issued_at),
            TokenVerification::Invalid
        );
    }
}
