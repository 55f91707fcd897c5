//! Suggestion pass-through handler.
//!
//! ```text
//! POST /ai/suggest {"description":"plan my week"}
//! -> 200 {"suggestion":"Task: ..."}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::domain::Error;
use crate::domain::ports::SuggestionSourceError;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, empty_field_error};

const DESCRIPTION_FIELD: FieldName = FieldName::new("description");

/// Body for `POST /ai/suggest`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SuggestionRequest {
    #[serde(default)]
    pub description: String,
}

/// Generated suggestion text, relayed verbatim.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SuggestionResponse {
    pub suggestion: String,
}

fn map_suggestion_error(error: SuggestionSourceError) -> Error {
    match error {
        SuggestionSourceError::NotConfigured => {
            Error::service_unavailable("suggestion service is not configured")
        }
        other => {
            if other.is_transient() {
                warn!(error = %other, "suggestion request failed");
            } else {
                error!(error = %other, "suggestion service sent an unusable reply");
            }
            Error::service_unavailable("suggestion service unavailable")
        }
    }
}

/// Ask the text-generation service for a task suggestion.
#[utoipa::path(
    post,
    path = "/ai/suggest",
    request_body = SuggestionRequest,
    responses(
        (status = 200, description = "Suggestion generated", body = SuggestionResponse),
        (status = 400, description = "Empty description", body = Error),
        (status = 401, description = "Invalid or expired token", body = Error),
        (status = 403, description = "Missing token", body = Error),
        (status = 503, description = "Suggestion service unavailable", body = Error)
    ),
    tags = ["suggestions"],
    operation_id = "suggestTask"
)]
#[post("/suggest")]
pub async fn suggest_task(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
    payload: web::Json<SuggestionRequest>,
) -> ApiResult<web::Json<SuggestionResponse>> {
    let description = payload.into_inner().description;
    let description = description.trim();
    if description.is_empty() {
        return Err(empty_field_error(DESCRIPTION_FIELD));
    }
    let suggestion = state
        .suggestions
        .suggest(description)
        .await
        .map_err(map_suggestion_error)?;
    Ok(web::Json(SuggestionResponse { suggestion }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use crate::inbound::http::test_utils::{MockPorts, bearer_for, test_tokens};
    use crate::middleware::BearerAuth;
    use actix_web::http::StatusCode;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};

    async fn call(ports: MockPorts, body: Value) -> actix_web::dev::ServiceResponse {
        let tokens = test_tokens();
        let header = bearer_for(&tokens, &UserId::random());
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(ports.into_state(tokens.clone())))
                .service(
                    web::scope("/ai")
                        .wrap(BearerAuth::new(tokens))
                        .service(suggest_task),
                ),
        )
        .await;
        let req = actix_test::TestRequest::post()
            .uri("/ai/suggest")
            .insert_header((AUTHORIZATION, header))
            .set_json(body)
            .to_request();
        actix_test::call_service(&app, req).await
    }

    #[actix_web::test]
    async fn relays_generated_text() {
        let mut ports = MockPorts::default();
        ports
            .suggestions
            .expect_suggest()
            .withf(|description| description == "plan a trip")
            .times(1)
            .returning(|_| Ok("Task: **Book flights**".to_owned()));

        let res = call(ports, json!({"description": "  plan a trip "})).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["suggestion"], "Task: **Book flights**");
    }

    #[rstest]
    #[case(json!({"description": ""}))]
    #[case(json!({"description": "   "}))]
    #[case(json!({}))]
    #[actix_web::test]
    async fn empty_description_is_rejected(#[case] body: Value) {
        let mut ports = MockPorts::default();
        ports.suggestions.expect_suggest().times(0);
        let res = call(ports, body).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[case(SuggestionSourceError::not_configured())]
    #[case(SuggestionSourceError::transport("timed out"))]
    #[case(SuggestionSourceError::status(500_u16, "upstream secret detail"))]
    #[case(SuggestionSourceError::decode("no generations"))]
    #[actix_web::test]
    async fn upstream_failures_are_unavailable(#[case] failure: SuggestionSourceError) {
        let mut ports = MockPorts::default();
        ports
            .suggestions
            .expect_suggest()
            .return_once(move |_| Err(failure));
        let res = call(ports, json!({"description": "anything"})).await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["code"], "service_unavailable");
        assert!(
            !body["message"]
                .as_str()
                .unwrap_or_default()
                .contains("secret")
        );
    }
}
