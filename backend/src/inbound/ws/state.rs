//! Shared WebSocket adapter state.

use std::sync::Arc;

use crate::domain::TokenService;
use crate::domain::ports::TaskEventSource;
use crate::inbound::http::cors::AllowedOrigins;

/// Dependency bundle for the `/ws` upgrade handler.
#[derive(Clone)]
pub struct WsState {
    pub events: Arc<dyn TaskEventSource>,
    pub tokens: Arc<TokenService>,
    pub origins: AllowedOrigins,
}

impl WsState {
    /// Construct state from the event source, the token verifier shared with
    /// the HTTP gate and the browser origin allow-list.
    pub fn new(
        events: Arc<dyn TaskEventSource>,
        tokens: Arc<TokenService>,
        origins: AllowedOrigins,
    ) -> Self {
        Self {
            events,
            tokens,
            origins,
        }
    }
}
