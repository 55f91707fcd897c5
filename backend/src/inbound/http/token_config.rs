//! Bearer token signing configuration.
//!
//! Resolves the HS256 signing secret from `JWT_SECRET` or the file named by
//! `JWT_SECRET_FILE`, validating it against the build mode. The secret bytes
//! are zeroized once the keys are derived; only a fingerprint survives for
//! logging.

pub mod fingerprint;

use std::path::PathBuf;

use rand::RngCore;
use rand::rngs::OsRng;
use tracing::warn;
use zeroize::Zeroize;

use crate::domain::TokenKeys;
use crate::settings::{BuildMode, ConfigEnv};

use self::fingerprint::secret_fingerprint;

pub const SECRET_ENV: &str = "JWT_SECRET";
pub const SECRET_FILE_ENV: &str = "JWT_SECRET_FILE";
pub const ALLOW_EPHEMERAL_ENV: &str = "JWT_ALLOW_EPHEMERAL";
const SECRET_DEFAULT_PATH: &str = "/var/run/secrets/jwt_secret";
/// Minimum secret length accepted in release builds.
pub const SECRET_MIN_LEN: usize = 32;
const EPHEMERAL_SECRET_LEN: usize = 64;
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";

/// Where the signing secret came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SecretSource {
    /// `JWT_SECRET`.
    Env,
    /// The secret file.
    File,
    /// Randomly generated for this process only.
    Ephemeral,
}

/// Token signing settings derived from configuration.
pub struct TokenSettings {
    /// HS256 keys for issuing and verifying tokens.
    pub keys: TokenKeys,
    /// Truncated SHA-256 fingerprint of the secret.
    pub fingerprint: String,
    /// Origin of the secret.
    pub source: SecretSource,
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("fingerprint", &self.fingerprint)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Errors raised while validating token configuration.
#[derive(thiserror::Error, Debug)]
pub enum TokenConfigError {
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the secret file failed.
    #[error("failed to read token secret at {path}: {source}")]
    SecretRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The secret is too short for release builds.
    #[error("token secret from {origin} too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort {
        origin: String,
        length: usize,
        min_len: usize,
    },
    /// Release builds must not allow ephemeral secrets.
    #[error("JWT_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Build token settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use backend::inbound::http::token_config::{token_settings_from_env, SecretSource};
/// use backend::settings::{BuildMode, ConfigEnv};
///
/// struct Vars;
///
/// impl ConfigEnv for Vars {
///     fn string(&self, name: &str) -> Option<String> {
///         (name == "JWT_SECRET").then(|| "x".repeat(48))
///     }
/// }
///
/// let settings = token_settings_from_env(&Vars, BuildMode::Release).expect("valid secret");
/// assert_eq!(settings.source, SecretSource::Env);
/// assert_eq!(settings.fingerprint.len(), 16);
/// ```
pub fn token_settings_from_env<E: ConfigEnv>(
    env: &E,
    mode: BuildMode,
) -> Result<TokenSettings, TokenConfigError> {
    let allow_ephemeral = allow_ephemeral_from_env(env, mode)?;
    let (mut secret, source) = secret_from_env(env, mode, allow_ephemeral)?;
    let fingerprint = secret_fingerprint(&secret);
    let keys = TokenKeys::from_secret(&secret);
    secret.zeroize();
    Ok(TokenSettings {
        keys,
        fingerprint,
        source,
    })
}

fn allow_ephemeral_from_env<E: ConfigEnv>(
    env: &E,
    mode: BuildMode,
) -> Result<bool, TokenConfigError> {
    let Some(value) = env.string(ALLOW_EPHEMERAL_ENV) else {
        return Ok(false);
    };
    match parse_bool(&value) {
        Some(true) if mode.is_debug() => Ok(true),
        Some(true) => Err(TokenConfigError::EphemeralNotAllowed),
        Some(false) => Ok(false),
        None if mode.is_debug() => {
            warn!(value = %value, "invalid JWT_ALLOW_EPHEMERAL; defaulting to disabled");
            Ok(false)
        }
        None => Err(TokenConfigError::InvalidEnv {
            name: ALLOW_EPHEMERAL_ENV,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn secret_from_env<E: ConfigEnv>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<(Vec<u8>, SecretSource), TokenConfigError> {
    if let Some(mut value) = env.string(SECRET_ENV).filter(|value| !value.is_empty()) {
        let secret = value.as_bytes().to_vec();
        value.zeroize();
        return check_length(secret, SECRET_ENV.to_owned(), mode).map(|s| (s, SecretSource::Env));
    }

    let path = PathBuf::from(
        env.string(SECRET_FILE_ENV)
            .unwrap_or_else(|| SECRET_DEFAULT_PATH.to_owned()),
    );
    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let secret = bytes.trim_ascii_end().to_vec();
            bytes.zeroize();
            check_length(secret, path.display().to_string(), mode)
                .map(|s| (s, SecretSource::File))
        }
        Err(error) => {
            if mode.is_debug() || allow_ephemeral {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "using temporary token secret (dev only); tokens will not survive a restart"
                );
                let mut secret = vec![0_u8; EPHEMERAL_SECRET_LEN];
                OsRng.fill_bytes(&mut secret);
                Ok((secret, SecretSource::Ephemeral))
            } else {
                Err(TokenConfigError::SecretRead {
                    path,
                    source: error,
                })
            }
        }
    }
}

fn check_length(
    mut secret: Vec<u8>,
    origin: String,
    mode: BuildMode,
) -> Result<Vec<u8>, TokenConfigError> {
    let length = secret.len();
    if length >= SECRET_MIN_LEN {
        return Ok(secret);
    }
    if mode.is_debug() {
        warn!(origin = %origin, length, "token secret shorter than {SECRET_MIN_LEN} bytes");
        return Ok(secret);
    }
    secret.zeroize();
    Err(TokenConfigError::SecretTooShort {
        origin,
        length,
        min_len: SECRET_MIN_LEN,
    })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
