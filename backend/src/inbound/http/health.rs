//! Liveness and readiness checks.
//!
//! The process moves through three phases: starting (alive, not ready),
//! serving (alive and ready) and draining (neither). Both checks answer with a
//! small JSON body and `Cache-Control: no-store`.

use std::sync::atomic::{AtomicU8, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::Serialize;
use utoipa::ToSchema;

const STARTING: u8 = 0;
const SERVING: u8 = 1;
const DRAINING: u8 = 2;

/// Lifecycle phase shared between the server and the health handlers.
#[derive(Debug)]
pub struct HealthState {
    phase: AtomicU8,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            phase: AtomicU8::new(STARTING),
        }
    }
}

impl HealthState {
    /// New state in the starting phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// The listener is bound; start reporting ready. Ignored once draining.
    pub fn mark_ready(&self) {
        let _previous =
            self.phase
                .compare_exchange(STARTING, SERVING, Ordering::AcqRel, Ordering::Acquire);
    }

    /// Shutdown has begun; both checks fail from now on.
    pub fn mark_draining(&self) {
        self.phase.store(DRAINING, Ordering::Release);
    }

    /// True while serving.
    pub fn is_ready(&self) -> bool {
        self.phase.load(Ordering::Acquire) == SERVING
    }

    /// True until draining starts.
    pub fn is_alive(&self) -> bool {
        self.phase.load(Ordering::Acquire) != DRAINING
    }
}

/// Health check response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthReport {
    /// `ok` or `unavailable`.
    #[schema(example = "ok")]
    pub status: &'static str,
}

fn health_response(ok: bool) -> HttpResponse {
    let (mut builder, status) = if ok {
        (HttpResponse::Ok(), "ok")
    } else {
        (HttpResponse::ServiceUnavailable(), "unavailable")
    };
    builder
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(HealthReport { status })
}

/// Readiness: 200 while serving.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Accepting traffic", body = HealthReport),
        (status = 503, description = "Starting or draining", body = HealthReport)
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    health_response(state.is_ready())
}

/// Liveness: 200 until shutdown begins.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Process is alive", body = HealthReport),
        (status = 503, description = "Draining", body = HealthReport)
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    health_response(state.is_alive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::Value;

    #[::core::prelude::v1::test]
    fn draining_is_terminal() {
        let state = HealthState::new();
        assert!(state.is_alive() && !state.is_ready());

        state.mark_ready();
        assert!(state.is_ready());

        state.mark_draining();
        state.mark_ready();
        assert!(!state.is_ready());
        assert!(!state.is_alive());
    }

    #[actix_web::test]
    async fn health_checks_report_the_current_phase() {
        let state = web::Data::new(HealthState::new());
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(ready)
                .service(live),
        )
        .await;
        let get = |uri: &'static str| test::TestRequest::get().uri(uri).to_request();

        let res = test::call_service(&app, get("/health/ready")).await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            res.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "unavailable");

        state.mark_ready();
        let res = test::call_service(&app, get("/health/ready")).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "ok");

        state.mark_draining();
        let res = test::call_service(&app, get("/health/live")).await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
