//! Builders for adapter state: repository selection, development seeding
//! and the task event hub shared by the HTTP and WebSocket adapters.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::info;

use backend::domain::ports::{
    CredentialRepository, DisabledSuggestionSource, SuggestionSource, TaskRepository,
};
use backend::domain::{
    CredentialLoginService, PasswordHash, TaskService, TokenService, UserCredential, UserId,
    Username,
};
use backend::inbound::http::state::{HttpState, HttpStatePorts};
use backend::inbound::ws::state::WsState;
use backend::outbound::events::TaskEventHub;
use backend::outbound::memory::{InMemoryCredentialRepository, InMemoryTaskRepository};
use backend::outbound::persistence::{DbPool, DieselCredentialRepository, DieselTaskRepository};

use super::ServerConfig;

const DEV_ACCOUNT_USERNAME: &str = "admin";
const DEV_ACCOUNT_PASSWORD: &str = "password";
const DEV_ACCOUNT_USER_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

/// Driven-port adapters chosen for this process.
struct Repositories {
    credentials: Arc<dyn CredentialRepository>,
    tasks: Arc<dyn TaskRepository>,
}

/// Use Diesel adapters when a pool is configured, otherwise in-memory ones.
fn build_repositories(pool: Option<&DbPool>) -> Repositories {
    match pool {
        Some(pool) => Repositories {
            credentials: Arc::new(DieselCredentialRepository::new(pool.clone())),
            tasks: Arc::new(DieselTaskRepository::new(pool.clone())),
        },
        None => Repositories {
            credentials: Arc::new(InMemoryCredentialRepository::default()),
            tasks: Arc::new(InMemoryTaskRepository::default()),
        },
    }
}

/// Provision `admin`/`password` so a fresh debug server can be logged into.
async fn seed_dev_account(credentials: &dyn CredentialRepository) -> std::io::Result<()> {
    let credential = UserCredential {
        id: UserId::new(DEV_ACCOUNT_USER_ID)
            .map_err(|err| std::io::Error::other(format!("invalid dev account id: {err}")))?,
        username: Username::new(DEV_ACCOUNT_USERNAME)
            .map_err(|err| std::io::Error::other(format!("invalid dev account name: {err}")))?,
        password_hash: PasswordHash::hash(DEV_ACCOUNT_PASSWORD)
            .map_err(|err| std::io::Error::other(format!("hash dev password: {err}")))?,
    };
    credentials
        .upsert(&credential)
        .await
        .map_err(|err| std::io::Error::other(format!("seed dev account: {err}")))?;
    info!(username = DEV_ACCOUNT_USERNAME, "seeded development account");
    Ok(())
}

/// Adapter state built once per process and cloned into every worker.
pub(super) struct AppState {
    pub(super) http: web::Data<HttpState>,
    pub(super) ws: web::Data<WsState>,
    pub(super) tokens: Arc<TokenService>,
}

/// Build the shared adapter state and the token service used by the gate.
///
/// # Errors
///
/// Fails when the development account cannot be seeded.
pub(super) async fn build_app_state(config: &ServerConfig) -> std::io::Result<AppState> {
    let clock = Arc::new(DefaultClock);
    let Repositories { credentials, tasks } = build_repositories(config.db_pool.as_ref());

    if config.seed_dev_account {
        seed_dev_account(credentials.as_ref()).await?;
    }

    let hub = Arc::new(TaskEventHub::default());
    let task_service = Arc::new(TaskService::new(tasks, clock.clone()).with_events(hub.clone()));
    let suggestions: Arc<dyn SuggestionSource> = config
        .suggestions
        .clone()
        .unwrap_or_else(|| Arc::new(DisabledSuggestionSource));
    let tokens = Arc::new(TokenService::new(config.token_keys.clone(), clock));

    let http = HttpState::new(
        HttpStatePorts {
            login: Arc::new(CredentialLoginService::new(credentials)),
            tasks: task_service.clone(),
            tasks_query: task_service,
            suggestions,
        },
        Arc::clone(&tokens),
    );
    let ws = WsState::new(hub, Arc::clone(&tokens), config.allowed_origins.clone());
    Ok(AppState {
        http: web::Data::new(http),
        ws: web::Data::new(ws),
        tokens,
    })
}
