//! Text-generation outbound adapters.
//!
//! Provides a thin HTTP implementation of the `SuggestionSource` port against
//! a Cohere-compatible `generate` endpoint.

mod dto;
mod http_source;

pub use http_source::{CohereSuggestionSource, GenerationOptions};
