//! WebSocket inbound adapter pushing task changes to their owner.
//!
//! `GET /ws` upgrades once two checks pass:
//! - the caller presents a valid token, either as `?token=` (browsers cannot
//!   set headers on an upgrade) or as `Authorization: Bearer`;
//! - a browser `Origin`, when sent, is on the CORS allow-list.
//!
//! Each connection subscribes to the event hub before the upgrade response
//! is written, so no event committed after the handshake is missed.

use actix_web::http::header::ORIGIN;
use actix_web::web::{self, Payload};
use actix_web::{HttpRequest, HttpResponse, get};
use serde::Deserialize;
use tracing::{error, warn};

use crate::domain::{Error, TokenService, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cors::AllowedOrigins;
use crate::middleware::bearer_auth::{authorize, verify_bearer};

mod session;

pub mod messages;
pub mod state;

#[derive(Debug, Default, Deserialize)]
struct FeedQuery {
    token: Option<String>,
}

/// Upgrade to the caller's live task feed.
#[get("/ws")]
pub async fn ws_entry(
    state: web::Data<state::WsState>,
    req: HttpRequest,
    stream: Payload,
) -> ApiResult<HttpResponse> {
    check_origin(&req, &state.origins)?;
    let subscriber = caller(&req, &state.tokens)?;
    let events = state.events.subscribe();

    let (response, session, messages) = actix_ws::handle(&req, stream).map_err(|err| {
        warn!(error = %err, "rejected malformed WebSocket handshake");
        Error::invalid_request("invalid WebSocket handshake")
    })?;
    actix_web::rt::spawn(session::run_feed(subscriber, events, session, messages));
    Ok(response)
}

fn check_origin(req: &HttpRequest, origins: &AllowedOrigins) -> Result<(), Error> {
    let mut values = req.headers().get_all(ORIGIN);
    let Some(value) = values.next() else {
        return Ok(());
    };
    if values.next().is_some() {
        error!("multiple Origin headers on WebSocket upgrade");
        return Err(Error::invalid_request("invalid Origin header"));
    }
    let origin = value.to_str().map_err(|err| {
        error!(error = %err, "Origin header is not valid UTF-8");
        Error::invalid_request("invalid Origin header")
    })?;
    if origins.contains(origin) {
        Ok(())
    } else {
        warn!(origin, "rejected WebSocket upgrade from disallowed Origin");
        Err(Error::forbidden("origin not allowed"))
    }
}

fn caller(req: &HttpRequest, tokens: &TokenService) -> Result<UserId, Error> {
    let query = web::Query::<FeedQuery>::from_query(req.query_string())
        .map(web::Query::into_inner)
        .unwrap_or_default();
    match query.token.as_deref().map(str::trim) {
        Some(token) if !token.is_empty() => verify_bearer(token, tokens),
        _ => authorize(req.headers(), tokens),
    }
}
