//! Task API handlers.
//!
//! ```text
//! GET    /tasks[?user_id=<uuid>]
//! POST   /tasks        {"title":"Buy milk","status":"pending"}
//! PUT    /tasks/{id}   {"priority":"high","due_date":null}
//! PATCH  /tasks/{id}   {"status":"completed"}
//! DELETE /tasks/{id}
//! ```
//!
//! Every handler sits behind [`crate::middleware::BearerAuth`] and scopes
//! its work to the [`AuthenticatedUser`]. Ids that do not parse are treated
//! like ids that do not exist.

use actix_web::{delete, get, patch, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Error, Task, TaskChanges, TaskDraft, TaskId, TaskPriority, TaskStatus, TaskTitle,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, empty_field_error, missing_field_error, parse_uuid, present,
};

const TITLE_FIELD: FieldName = FieldName::new("title");
const USER_ID_FIELD: FieldName = FieldName::new("user_id");

/// Body for `POST /tasks`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreateTaskRequest {
    /// Required; must be non-empty after trimming.
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to `todo`.
    #[serde(default)]
    pub status: Option<TaskStatus>,
    /// Defaults to `medium`.
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl TryFrom<CreateTaskRequest> for TaskDraft {
    type Error = Error;

    fn try_from(value: CreateTaskRequest) -> Result<Self, Self::Error> {
        let CreateTaskRequest {
            title,
            description,
            status,
            priority,
            due_date,
        } = value;
        let raw_title = title.ok_or_else(|| missing_field_error(TITLE_FIELD))?;
        let mut draft = Self::new(parse_title(&raw_title)?);
        draft.description = description;
        draft.status = status.unwrap_or_default();
        draft.priority = priority.unwrap_or_default();
        draft.due_date = due_date;
        Ok(draft)
    }
}

/// Body for `PUT /tasks/{id}`. Absent fields are left untouched; `null`
/// clears `description` and `due_date`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TryFrom<UpdateTaskRequest> for TaskChanges {
    type Error = Error;

    fn try_from(value: UpdateTaskRequest) -> Result<Self, Self::Error> {
        let UpdateTaskRequest {
            title,
            description,
            status,
            priority,
            due_date,
        } = value;
        Ok(Self {
            title: title.as_deref().map(parse_title).transpose()?,
            description,
            status,
            priority,
            due_date,
        })
    }
}

/// Body for `PATCH /tasks/{id}`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StatusRequest {
    pub status: TaskStatus,
}

/// Query string for `GET /tasks`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Must match the caller when present.
    pub user_id: Option<String>,
}

/// Mutation acknowledgement carrying the stored record.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct TaskEnvelope {
    pub message: String,
    pub task: Task,
}

impl TaskEnvelope {
    fn new(message: &str, task: Task) -> Self {
        Self {
            message: message.to_owned(),
            task,
        }
    }
}

/// Plain acknowledgement.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

fn parse_title(raw: &str) -> Result<TaskTitle, Error> {
    TaskTitle::new(raw).map_err(|_| empty_field_error(TITLE_FIELD))
}

fn parse_task_id(raw: &str) -> Result<TaskId, Error> {
    TaskId::new(raw).map_err(|_| Error::not_found("task not found"))
}

/// List the caller's tasks.
#[utoipa::path(
    get,
    path = "/tasks",
    params(ListQuery),
    responses(
        (status = 200, description = "Tasks owned by the caller", body = [Task]),
        (status = 400, description = "Malformed user_id", body = Error),
        (status = 401, description = "Invalid or expired token", body = Error),
        (status = 403, description = "Missing token or foreign user_id", body = Error),
        (status = 503, description = "Task store unavailable", body = Error)
    ),
    tags = ["tasks"],
    operation_id = "listTasks"
)]
#[get("")]
pub async fn list_tasks(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<Vec<Task>>> {
    if let Some(raw) = query.into_inner().user_id {
        let requested = parse_uuid(&raw, USER_ID_FIELD)?;
        if requested != *user.user_id().as_uuid() {
            return Err(Error::forbidden("cannot list tasks of another user"));
        }
    }
    let tasks = state.tasks_query.list(user.user_id()).await?;
    Ok(web::Json(tasks))
}

/// Create a task owned by the caller.
#[utoipa::path(
    post,
    path = "/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 200, description = "Task created", body = TaskEnvelope),
        (status = 400, description = "Missing or blank title", body = Error),
        (status = 401, description = "Invalid or expired token", body = Error),
        (status = 403, description = "Missing token", body = Error),
        (status = 503, description = "Task store unavailable", body = Error)
    ),
    tags = ["tasks"],
    operation_id = "createTask"
)]
#[post("")]
pub async fn create_task(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreateTaskRequest>,
) -> ApiResult<web::Json<TaskEnvelope>> {
    let draft = TaskDraft::try_from(payload.into_inner())?;
    let task = state.tasks.create(user.user_id(), draft).await?;
    Ok(web::Json(TaskEnvelope::new("Task created", task)))
}

/// Update fields of one of the caller's tasks.
#[utoipa::path(
    put,
    path = "/tasks/{id}",
    params(("id" = String, Path, description = "Task identifier")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskEnvelope),
        (status = 400, description = "Blank title", body = Error),
        (status = 401, description = "Invalid or expired token", body = Error),
        (status = 403, description = "Missing token", body = Error),
        (status = 404, description = "No such task for the caller", body = Error)
    ),
    tags = ["tasks"],
    operation_id = "updateTask"
)]
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateTaskRequest>,
) -> ApiResult<web::Json<TaskEnvelope>> {
    let id = parse_task_id(&path.into_inner())?;
    let changes = TaskChanges::try_from(payload.into_inner())?;
    let task = state.tasks.update(user.user_id(), &id, changes).await?;
    Ok(web::Json(TaskEnvelope::new("Task updated", task)))
}

/// Change the status of one of the caller's tasks.
#[utoipa::path(
    patch,
    path = "/tasks/{id}",
    params(("id" = String, Path, description = "Task identifier")),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskEnvelope),
        (status = 400, description = "Unknown status", body = Error),
        (status = 401, description = "Invalid or expired token", body = Error),
        (status = 403, description = "Missing token", body = Error),
        (status = 404, description = "No such task for the caller", body = Error)
    ),
    tags = ["tasks"],
    operation_id = "setTaskStatus"
)]
#[patch("/{id}")]
pub async fn set_task_status(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<StatusRequest>,
) -> ApiResult<web::Json<TaskEnvelope>> {
    let id = parse_task_id(&path.into_inner())?;
    let task = state
        .tasks
        .set_status(user.user_id(), &id, payload.into_inner().status)
        .await?;
    Ok(web::Json(TaskEnvelope::new("Task updated", task)))
}

/// Delete one of the caller's tasks.
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    params(("id" = String, Path, description = "Task identifier")),
    responses(
        (status = 200, description = "Task deleted", body = MessageResponse),
        (status = 401, description = "Invalid or expired token", body = Error),
        (status = 403, description = "Missing token", body = Error),
        (status = 404, description = "No such task for the caller", body = Error)
    ),
    tags = ["tasks"],
    operation_id = "deleteTask"
)]
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageResponse>> {
    let id = parse_task_id(&path.into_inner())?;
    state.tasks.delete(user.user_id(), &id).await?;
    Ok(web::Json(MessageResponse {
        message: "Task deleted".to_owned(),
    }))
}

#[cfg(test)]
#[path = "tasks_tests.rs"]
mod tests;
