//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::TokenService;
use crate::domain::ports::{LoginService, SuggestionSource, TaskCommand, TaskQuery};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub tasks: Arc<dyn TaskCommand>,
    pub tasks_query: Arc<dyn TaskQuery>,
    pub suggestions: Arc<dyn SuggestionSource>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub tasks: Arc<dyn TaskCommand>,
    pub tasks_query: Arc<dyn TaskQuery>,
    pub suggestions: Arc<dyn SuggestionSource>,
    pub tokens: Arc<TokenService>,
}

impl HttpState {
    /// Construct state from a ports bundle and the token service shared with
    /// the authorization gate.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use backend::domain::ports::DisabledSuggestionSource;
    /// use backend::domain::{CredentialLoginService, TaskService, TokenKeys, TokenService};
    /// use backend::inbound::http::state::{HttpState, HttpStatePorts};
    /// use backend::outbound::memory::{InMemoryCredentialRepository, InMemoryTaskRepository};
    ///
    /// let clock = Arc::new(mockable::DefaultClock);
    /// let tasks = Arc::new(TaskService::new(
    ///     Arc::new(InMemoryTaskRepository::default()),
    ///     clock.clone(),
    /// ));
    /// let ports = HttpStatePorts {
    ///     login: Arc::new(CredentialLoginService::new(Arc::new(
    ///         InMemoryCredentialRepository::default(),
    ///     ))),
    ///     tasks: tasks.clone(),
    ///     tasks_query: tasks,
    ///     suggestions: Arc::new(DisabledSuggestionSource),
    /// };
    /// let tokens = Arc::new(TokenService::new(
    ///     TokenKeys::from_secret(b"0123456789abcdef0123456789abcdef"),
    ///     clock,
    /// ));
    /// let state = HttpState::new(ports, tokens);
    /// let _login = state.login.clone();
    /// ```
    pub fn new(ports: HttpStatePorts, tokens: Arc<TokenService>) -> Self {
        let HttpStatePorts {
            login,
            tasks,
            tasks_query,
            suggestions,
        } = ports;
        Self {
            login,
            tasks,
            tasks_query,
            suggestions,
            tokens,
        }
    }
}
