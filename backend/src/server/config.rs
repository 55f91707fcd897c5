//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use backend::domain::ports::SuggestionSource;
use backend::domain::TokenKeys;
use backend::inbound::http::cors::AllowedOrigins;
use backend::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) token_keys: TokenKeys,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) suggestions: Option<Arc<dyn SuggestionSource>>,
    pub(crate) seed_dev_account: bool,
    pub(crate) allowed_origins: AllowedOrigins,
}

impl ServerConfig {
    /// Construct a configuration with in-memory storage, suggestions
    /// disabled and no browser origins allowed.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, token_keys: TokenKeys) -> Self {
        Self {
            bind_addr,
            token_keys,
            db_pool: None,
            suggestions: None,
            seed_dev_account: false,
            allowed_origins: AllowedOrigins::default(),
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When provided, tasks and credentials are stored in PostgreSQL.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach the remote suggestion adapter.
    #[must_use]
    pub fn with_suggestions(mut self, source: Arc<dyn SuggestionSource>) -> Self {
        self.suggestions = Some(source);
        self
    }

    /// Seed the in-memory credential store with the development account.
    #[must_use]
    pub fn with_dev_account(mut self, seed: bool) -> Self {
        self.seed_dev_account = seed;
        self
    }

    /// Allow `origins` through CORS and the `/ws` upgrade.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: AllowedOrigins) -> Self {
        self.allowed_origins = origins;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
