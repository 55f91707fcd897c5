//! Backend entry-point: loads configuration, prepares storage and serves the
//! task API.

mod server;

use std::io;
use std::sync::Arc;

use actix_web::web;
use reqwest::Url;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::inbound::http::token_config::{SecretSource, token_settings_from_env};
use backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use backend::outbound::suggestion::CohereSuggestionSource;
use backend::settings::{
    BuildMode, ProcessEnv, SuggestionSettings, server_settings_from_env,
};
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let env = ProcessEnv;
    let mode = BuildMode::from_debug_assertions();
    let settings =
        server_settings_from_env(&env, mode).map_err(|err| io::Error::other(err.to_string()))?;
    let tokens =
        token_settings_from_env(&env, mode).map_err(|err| io::Error::other(err.to_string()))?;
    if tokens.source == SecretSource::Ephemeral {
        warn!("tokens are signed with an ephemeral secret and will not survive a restart");
    }
    info!(fingerprint = %tokens.fingerprint, source = ?tokens.source, "token signing secret loaded");

    let mut config = ServerConfig::new(settings.bind_addr, tokens.keys)
        .with_dev_account(settings.seed_dev_account)
        .with_allowed_origins(settings.allowed_origins.clone());
    info!(origins = %settings.allowed_origins, "browser origins allowed");

    if let Some(database_url) = settings.database_url.as_deref() {
        run_pending_migrations(database_url)
            .await
            .map_err(|err| io::Error::other(err.to_string()))?;
        let pool = DbPool::new(PoolConfig::new(database_url))
            .await
            .map_err(|err| io::Error::other(err.to_string()))?;
        config = config.with_db_pool(pool);
    }

    if let Some(suggestion) = settings.suggestion {
        config = config.with_suggestions(Arc::new(build_suggestion_source(suggestion)?));
    }

    let health_state = web::Data::new(HealthState::new());
    info!(addr = %config.bind_addr(), "starting server");
    let server = create_server(health_state, config).await?;
    server.await
}

fn build_suggestion_source(settings: SuggestionSettings) -> io::Result<CohereSuggestionSource> {
    let SuggestionSettings { endpoint, api_key } = settings;
    let endpoint = Url::parse(&endpoint).map_err(|err| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid SUGGESTION_API_URL '{endpoint}': {err}"),
        )
    })?;
    CohereSuggestionSource::new(endpoint, api_key)
        .map_err(|err| io::Error::other(format!("build suggestion client: {err}")))
}
