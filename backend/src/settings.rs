//! Process-level settings read from the environment.
//!
//! Debug builds warn and fall back to defaults; release builds reject
//! malformed values so a misconfigured deployment fails at startup.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use tracing::warn;
use zeroize::Zeroizing;

use crate::inbound::http::cors::AllowedOrigins;

pub const PORT_ENV: &str = "PORT";
pub const HOST_ENV: &str = "HOST";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const SUGGESTION_API_URL_ENV: &str = "SUGGESTION_API_URL";
pub const SUGGESTION_API_KEY_ENV: &str = "SUGGESTION_API_KEY";
pub const CORS_ALLOWED_ORIGINS_ENV: &str = "CORS_ALLOWED_ORIGINS";

const DEFAULT_PORT: u16 = 5040;
const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
/// Browser origin allowed in debug builds when none is configured.
pub const DEFAULT_DEV_ORIGIN: &str = "http://localhost:3000";
/// Cohere-compatible generation endpoint used when none is configured.
pub const DEFAULT_SUGGESTION_API_URL: &str = "https://api.cohere.ai/v1/generate";

/// Source of configuration values.
///
/// Production reads the process environment through [`ProcessEnv`]; tests
/// wrap `mockable::MockEnv`.
pub trait ConfigEnv {
    /// Return the value of `name`, or `None` when unset or not valid UTF-8.
    fn string(&self, name: &str) -> Option<String>;
}

/// [`ConfigEnv`] backed by `std::env`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl ConfigEnv for ProcessEnv {
    fn string(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Build mode for configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings.
    Debug,
    /// Release builds require valid, explicit settings.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use backend::settings::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    pub(crate) fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Errors raised while validating process settings.
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Remote suggestion endpoint and credentials.
#[derive(Clone)]
pub struct SuggestionSettings {
    /// Generation endpoint URL.
    pub endpoint: String,
    /// Bearer API key.
    pub api_key: Zeroizing<String>,
}

impl fmt::Debug for SuggestionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuggestionSettings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Settings for the HTTP server and its adapters.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Listener address.
    pub bind_addr: SocketAddr,
    /// Postgres connection string; `None` selects in-memory repositories.
    pub database_url: Option<String>,
    /// Suggestion endpoint; `None` disables `/ai/suggest`.
    pub suggestion: Option<SuggestionSettings>,
    /// Seed the in-memory credential store with a development account.
    pub seed_dev_account: bool,
    /// Browser origins allowed by CORS and the `/ws` upgrade.
    pub allowed_origins: AllowedOrigins,
}

/// Build server settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use backend::settings::{server_settings_from_env, BuildMode, ConfigEnv};
///
/// struct Vars;
///
/// impl ConfigEnv for Vars {
///     fn string(&self, name: &str) -> Option<String> {
///         (name == "PORT").then(|| "8088".to_owned())
///     }
/// }
///
/// let settings = server_settings_from_env(&Vars, BuildMode::Release).expect("valid settings");
/// assert_eq!(settings.bind_addr.port(), 8088);
/// assert!(settings.database_url.is_none());
/// assert!(!settings.seed_dev_account);
/// ```
pub fn server_settings_from_env<E: ConfigEnv>(
    env: &E,
    mode: BuildMode,
) -> Result<ServerSettings, SettingsError> {
    let port = port_from_env(env, mode)?;
    let host = host_from_env(env, mode)?;
    let database_url = non_empty(env, DATABASE_URL_ENV);
    if database_url.is_none() {
        warn!("DATABASE_URL not set; tasks and credentials are kept in memory");
    }
    let suggestion = suggestion_from_env(env);
    let seed_dev_account = mode.is_debug() && database_url.is_none();
    let allowed_origins = allowed_origins_from_env(env, mode)?;

    Ok(ServerSettings {
        bind_addr: SocketAddr::new(host, port),
        database_url,
        suggestion,
        seed_dev_account,
        allowed_origins,
    })
}

fn non_empty<E: ConfigEnv>(env: &E, name: &str) -> Option<String> {
    env.string(name).filter(|value| !value.trim().is_empty())
}

fn port_from_env<E: ConfigEnv>(env: &E, mode: BuildMode) -> Result<u16, SettingsError> {
    let Some(value) = env.string(PORT_ENV) else {
        return Ok(DEFAULT_PORT);
    };
    match value.trim().parse::<u16>() {
        Ok(port) => Ok(port),
        Err(_) if mode.is_debug() => {
            warn!(value = %value, "invalid PORT; using default");
            Ok(DEFAULT_PORT)
        }
        Err(_) => Err(SettingsError::InvalidEnv {
            name: PORT_ENV,
            value,
            expected: "a TCP port number",
        }),
    }
}

fn host_from_env<E: ConfigEnv>(env: &E, mode: BuildMode) -> Result<IpAddr, SettingsError> {
    let Some(value) = env.string(HOST_ENV) else {
        return Ok(DEFAULT_HOST);
    };
    match value.trim().parse::<IpAddr>() {
        Ok(host) => Ok(host),
        Err(_) if mode.is_debug() => {
            warn!(value = %value, "invalid HOST; using default");
            Ok(DEFAULT_HOST)
        }
        Err(_) => Err(SettingsError::InvalidEnv {
            name: HOST_ENV,
            value,
            expected: "an IP address",
        }),
    }
}

fn dev_origins(mode: BuildMode) -> AllowedOrigins {
    if mode.is_debug() {
        AllowedOrigins::parse(DEFAULT_DEV_ORIGIN).unwrap_or_default()
    } else {
        AllowedOrigins::default()
    }
}

fn allowed_origins_from_env<E: ConfigEnv>(
    env: &E,
    mode: BuildMode,
) -> Result<AllowedOrigins, SettingsError> {
    let Some(value) = env.string(CORS_ALLOWED_ORIGINS_ENV) else {
        if !mode.is_debug() {
            warn!("CORS_ALLOWED_ORIGINS not set; browser origins are refused");
        }
        return Ok(dev_origins(mode));
    };
    match AllowedOrigins::parse(&value) {
        Ok(origins) => Ok(origins),
        Err(err) if mode.is_debug() => {
            warn!(error = %err, "invalid CORS_ALLOWED_ORIGINS; using default");
            Ok(dev_origins(mode))
        }
        Err(_) => Err(SettingsError::InvalidEnv {
            name: CORS_ALLOWED_ORIGINS_ENV,
            value,
            expected: "comma-separated http(s) origins",
        }),
    }
}

fn suggestion_from_env<E: ConfigEnv>(env: &E) -> Option<SuggestionSettings> {
    let Some(api_key) = non_empty(env, SUGGESTION_API_KEY_ENV) else {
        warn!("SUGGESTION_API_KEY not set; /ai/suggest will answer 503");
        return None;
    };
    let endpoint = non_empty(env, SUGGESTION_API_URL_ENV)
        .unwrap_or_else(|| DEFAULT_SUGGESTION_API_URL.to_owned());
    Some(SuggestionSettings {
        endpoint,
        api_key: Zeroizing::new(api_key),
    })
}

#[cfg(test)]
pub(crate) mod test_env {
    //! `ConfigEnv` over a `mockable::MockEnv` seeded from a map.

    use std::collections::HashMap;

    use mockable::{Env as MockableEnv, MockEnv};

    use super::ConfigEnv;

    pub struct TestEnv {
        inner: MockEnv,
    }

    impl ConfigEnv for TestEnv {
        fn string(&self, name: &str) -> Option<String> {
            MockableEnv::string(&self.inner, name)
        }
    }

    pub fn mock_env(vars: &[(&str, &str)]) -> TestEnv {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        let mut env = MockEnv::new();
        env.expect_string()
            .times(0..)
            .returning(move |key| vars.get(key).cloned());
        TestEnv { inner: env }
    }
}
