//! Reqwest-backed suggestion source.
//!
//! This adapter owns transport details only: prompt framing, bearer
//! authentication, timeout and status mapping, and decoding the first
//! generation. The text is relayed verbatim.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use zeroize::Zeroizing;

use super::dto::{GenerateRequestDto, GenerateResponseDto};
use crate::domain::ports::{SuggestionSource, SuggestionSourceError};

const DEFAULT_MODEL: &str = "command-xlarge-nightly";
const DEFAULT_MAX_TOKENS: u32 = 200;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const PROMPT_PREFIX: &str = "You are a helpful task management assistant. \
Suggest a task based on the user's description: ";

/// Model parameters sent with each generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    /// Model identifier.
    pub model: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_owned(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Suggestion source that POSTs prompts to one `generate` endpoint.
pub struct CohereSuggestionSource {
    client: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
    options: GenerationOptions,
}

impl CohereSuggestionSource {
    /// Build an adapter with default model parameters.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, api_key: Zeroizing<String>) -> Result<Self, reqwest::Error> {
        Self::with_options(endpoint, api_key, GenerationOptions::default())
    }

    /// Build an adapter with explicit model parameters.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_options(
        endpoint: Url,
        api_key: Zeroizing<String>,
        options: GenerationOptions,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(options.timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
            options,
        })
    }
}

#[async_trait]
impl SuggestionSource for CohereSuggestionSource {
    async fn suggest(&self, description: &str) -> Result<String, SuggestionSourceError> {
        let request = GenerateRequestDto {
            model: &self.options.model,
            prompt: build_prompt(description),
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_generation(body.as_ref())
    }
}

fn build_prompt(description: &str) -> String {
    format!("{PROMPT_PREFIX}{description}")
}

fn parse_generation(body: &[u8]) -> Result<String, SuggestionSourceError> {
    let decoded: GenerateResponseDto = serde_json::from_slice(body).map_err(|error| {
        SuggestionSourceError::decode(format!("invalid generation payload: {error}"))
    })?;
    decoded
        .into_first_text()
        .ok_or_else(|| SuggestionSourceError::decode("response held no generations"))
}

fn map_transport_error(error: reqwest::Error) -> SuggestionSourceError {
    if error.is_timeout() {
        SuggestionSourceError::transport(format!("timed out: {error}"))
    } else {
        SuggestionSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> SuggestionSourceError {
    SuggestionSourceError::status(status.as_u16(), body_preview(body))
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
