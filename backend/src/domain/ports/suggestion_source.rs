//! Driven port for the remote text-generation service behind `/ai/suggest`.
//!
//! The service is opaque: the backend forwards a description and relays the
//! generated text without interpreting it.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised while asking the remote service for a suggestion.
    pub enum SuggestionSourceError {
        /// No endpoint or API key is configured.
        NotConfigured => permanent "suggestion service is not configured",
        /// Network or timeout failure.
        Transport { message: String } => transient "suggestion transport failed: {message}",
        /// Upstream answered with a non-success status.
        Status { status: u16, message: String } => transient "suggestion service returned {status}: {message}",
        /// Upstream payload could not be decoded or held no generations.
        Decode { message: String } => permanent "suggestion payload was invalid: {message}",
    }
}

/// Remote suggestion generator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    /// Generate suggestion text for `description`.
    async fn suggest(&self, description: &str) -> Result<String, SuggestionSourceError>;
}

/// Source used when no remote service is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSuggestionSource;

#[async_trait]
impl SuggestionSource for DisabledSuggestionSource {
    async fn suggest(&self, _description: &str) -> Result<String, SuggestionSourceError> {
        Err(SuggestionSourceError::not_configured())
    }
}
