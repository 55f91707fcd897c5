//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::{AppState, build_app_state};

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::body::{BoxBody, EitherBody};
use actix_web::{App, HttpServer, web};

use backend::Trace;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::domain::TokenService;
use backend::inbound::http::cors::{AllowedOrigins, cors};
use backend::inbound::http::error::{json_error_handler, query_error_handler};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::login::login;
use backend::inbound::http::state::HttpState;
use backend::inbound::http::suggestions::suggest_task;
use backend::inbound::http::tasks::{
    create_task, delete_task, list_tasks, set_task_status, update_task,
};
use backend::inbound::ws::state::WsState;
use backend::inbound::ws::ws_entry;
use backend::middleware::BearerAuth;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    ws_state: web::Data<WsState>,
    tokens: Arc<TokenService>,
    origins: AllowedOrigins,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        ws_state,
        tokens,
        origins,
    } = deps;

    let tasks = web::scope("/tasks")
        .wrap(BearerAuth::new(Arc::clone(&tokens)))
        .service(list_tasks)
        .service(create_task)
        .service(update_task)
        .service(set_task_status)
        .service(delete_task);

    let ai = web::scope("/ai")
        .wrap(BearerAuth::new(tokens))
        .service(suggest_task);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(ws_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .wrap(Trace)
        .wrap(cors(&origins))
        .service(login)
        .service(tasks)
        .service(ai)
        .service(ws_entry)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is initialised.
/// - `config`: pre-built [`ServerConfig`] with binding, token keys and adapters.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when seeding, binding the socket or starting
/// the server fails.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let AppState { http, ws, tokens } = build_app_state(&config).await?;
    let origins = config.allowed_origins.clone();
    let bind_addr = config.bind_addr();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http.clone(),
            ws_state: ws.clone(),
            tokens: Arc::clone(&tokens),
            origins: origins.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use backend::domain::TokenKeys;
    use rstest::rstest;
    use serde_json::{Value, json};

    const FRONTEND: &str = "http://localhost:3000";

    async fn deps() -> AppDependencies {
        let config = ServerConfig::new(
            "127.0.0.1:0".parse().expect("socket address"),
            TokenKeys::from_secret(b"server wiring test secret, 32 bytes"),
        )
        .with_dev_account(true)
        .with_allowed_origins(AllowedOrigins::parse(FRONTEND).expect("origins"));
        let AppState { http, ws, tokens } = build_app_state(&config).await.expect("state");
        let health_state = web::Data::new(HealthState::new());
        health_state.mark_ready();
        AppDependencies {
            health_state,
            http_state: http,
            ws_state: ws,
            tokens,
            origins: config.allowed_origins.clone(),
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn dev_account_can_log_in_and_create_tasks() {
        let app = test::init_service(build_app(deps().await)).await;

        let login_req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({"username": "admin", "password": "password"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, login_req).await;
        let token = body["token"].as_str().expect("token").to_owned();
        assert_eq!(body["expiresIn"], 3600);

        let create = test::TestRequest::post()
            .uri("/tasks")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(json!({"title": "Wire the server"}))
            .to_request();
        let res = test::call_service(&app, create).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[rstest]
    #[case("/tasks")]
    #[case("/ai/suggest")]
    #[actix_web::test]
    async fn gated_scopes_reject_anonymous_requests(#[case] uri: &str) {
        let app = test::init_service(build_app(deps().await)).await;
        let req = test::TestRequest::post()
            .uri(uri)
            .set_json(json!({"title": "x", "description": "x"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_json_is_a_bad_request() {
        let app = test::init_service(build_app(deps().await)).await;
        let req = test::TestRequest::post()
            .uri("/login")
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(res.headers().contains_key("trace-id"));
    }

    #[rstest]
    #[actix_web::test]
    async fn browser_preflight_is_answered_for_listed_origin() {
        let app = test::init_service(build_app(deps().await)).await;
        let req = test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/tasks")
            .insert_header(("Origin", FRONTEND))
            .insert_header(("Access-Control-Request-Method", "POST"))
            .insert_header(("Access-Control-Request-Headers", "authorization, content-type"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()
                .get("Access-Control-Allow-Origin")
                .and_then(|v| v.to_str().ok()),
            Some(FRONTEND)
        );
    }

    #[rstest]
    #[case(None, StatusCode::FORBIDDEN)]
    #[case(Some("forged"), StatusCode::UNAUTHORIZED)]
    #[actix_web::test]
    async fn live_feed_requires_a_token(
        #[case] token: Option<&str>,
        #[case] expected: StatusCode,
    ) {
        let app = test::init_service(build_app(deps().await)).await;
        let uri = token.map_or_else(|| "/ws".to_owned(), |token| format!("/ws?token={token}"));
        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(("Upgrade", "websocket"))
            .insert_header(("Connection", "Upgrade"))
            .insert_header(("Sec-WebSocket-Version", "13"))
            .insert_header(("Sec-WebSocket-Key", "dGhlIHNhbXBsZSBub25jZQ=="))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), expected);
    }
}
