//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod cors;
pub mod error;
pub mod health;
pub mod login;
pub mod state;
pub mod suggestions;
pub mod tasks;
#[cfg(test)]
pub mod test_utils;
pub mod token_config;
pub mod validation;

pub use error::ApiResult;
