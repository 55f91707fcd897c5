//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer, the domain
//! schemas they exchange, and the bearer-token security scheme. The document
//! backs Swagger UI in debug builds and is exported by the `openapi-dump`
//! binary.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, Task, TaskPriority, TaskStatus};
use crate::inbound::http::health::HealthReport;
use crate::inbound::http::login::{LoginRequest, LoginResponse};
use crate::inbound::http::suggestions::{SuggestionRequest, SuggestionResponse};
use crate::inbound::http::tasks::{
    CreateTaskRequest, MessageResponse, StatusRequest, TaskEnvelope, UpdateTaskRequest,
};

/// Name of the bearer security scheme referenced by gated operations.
pub const BEARER_SCHEME: &str = "BearerToken";

/// Enrich the generated document with the bearer security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by POST /login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Taskmaster API",
        description = "Per-user task tracking with bearer-token authentication."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::login::login,
        crate::inbound::http::tasks::list_tasks,
        crate::inbound::http::tasks::create_task,
        crate::inbound::http::tasks::update_task,
        crate::inbound::http::tasks::set_task_status,
        crate::inbound::http::tasks::delete_task,
        crate::inbound::http::suggestions::suggest_task,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Task,
        TaskStatus,
        TaskPriority,
        LoginRequest,
        LoginResponse,
        CreateTaskRequest,
        UpdateTaskRequest,
        StatusRequest,
        TaskEnvelope,
        MessageResponse,
        SuggestionRequest,
        SuggestionResponse,
        HealthReport,
    )),
    tags(
        (name = "auth", description = "Token issuance"),
        (name = "tasks", description = "Owner-scoped task management"),
        (name = "suggestions", description = "AI task suggestions"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
