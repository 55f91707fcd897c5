//! Cross-origin policy for browser clients.
//!
//! Only origins on the configured allow-list receive CORS headers. The same
//! list gates WebSocket upgrades on `/ws`.

use std::fmt;

use actix_cors::Cors;
use actix_web::http::Method;
use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;

use crate::domain::TRACE_ID_HEADER;

const PREFLIGHT_MAX_AGE_SECONDS: usize = 3600;

/// An entry of the allow-list that is not an `http(s)` origin.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not an http(s) origin")]
pub struct InvalidOrigin {
    /// The rejected entry, trimmed.
    pub value: String,
}

/// Normalised origins (`scheme://host[:port]`) allowed to call the API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedOrigins(Vec<String>);

impl AllowedOrigins {
    /// Parse a comma-separated list, ignoring blank entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use backend::inbound::http::cors::AllowedOrigins;
    ///
    /// let origins = AllowedOrigins::parse("http://localhost:3000/, https://Tasks.example")
    ///     .expect("valid origins");
    /// assert!(origins.contains("https://tasks.example"));
    /// assert!(!origins.contains("https://evil.example"));
    /// ```
    pub fn parse(raw: &str) -> Result<Self, InvalidOrigin> {
        let mut origins = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let origin = normalise(entry).ok_or_else(|| InvalidOrigin {
                value: entry.to_owned(),
            })?;
            if !origins.contains(&origin) {
                origins.push(origin);
            }
        }
        Ok(Self(origins))
    }

    /// True when `origin` names an entry of the list.
    #[must_use]
    pub fn contains(&self, origin: &str) -> bool {
        normalise(origin).is_some_and(|origin| self.0.contains(&origin))
    }

    /// True when no origin is allowed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the normalised origins.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for AllowedOrigins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

fn normalise(value: &str) -> Option<String> {
    let url = Url::parse(value).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }
    Some(url.origin().ascii_serialization())
}

/// Build the CORS middleware for `origins`.
#[must_use]
pub fn cors(origins: &AllowedOrigins) -> Cors {
    let allowed = origins.clone();
    Cors::default()
        .allowed_origin_fn(move |origin, _head| {
            origin.to_str().is_ok_and(|origin| allowed.contains(origin))
        })
        .allowed_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allowed_headers([AUTHORIZATION, CONTENT_TYPE])
        .expose_headers([TRACE_ID_HEADER])
        .supports_credentials()
        .max_age(PREFLIGHT_MAX_AGE_SECONDS)
}
