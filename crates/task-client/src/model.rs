//! Wire types exchanged with the task API.
//!
//! Field names follow the server's snake_case task representation; the login
//! response uses camelCase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Progress state of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started.
    #[default]
    Todo,
    /// Being worked on.
    InProgress,
    /// Done.
    Completed,
    /// Legacy spelling of "not started", treated like [`TaskStatus::Todo`].
    Pending,
}

impl TaskStatus {
    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Pending => "Pending",
        }
    }

    /// True for both spellings of "not started".
    #[must_use]
    pub const fn is_not_started(self) -> bool {
        matches!(self, Self::Todo | Self::Pending)
    }
}

/// Next status in the board's click-through cycle.
///
/// `todo` and `pending` advance to `in-progress`, then `completed`, then back
/// to `todo`.
///
/// # Examples
/// ```
/// use task_client::{TaskStatus, cycle_status};
///
/// assert_eq!(cycle_status(TaskStatus::Pending), TaskStatus::InProgress);
/// assert_eq!(cycle_status(TaskStatus::Completed), TaskStatus::Todo);
/// ```
#[must_use]
pub const fn cycle_status(status: TaskStatus) -> TaskStatus {
    match status {
        TaskStatus::Todo | TaskStatus::Pending => TaskStatus::InProgress,
        TaskStatus::InProgress => TaskStatus::Completed,
        TaskStatus::Completed => TaskStatus::Todo,
    }
}

/// Relative importance of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Can wait.
    Low,
    /// Normal.
    #[default]
    Medium,
    /// Urgent.
    High,
}

impl TaskPriority {
    /// Sort weight; higher is more urgent.
    #[must_use]
    pub const fn weight(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    /// Badge text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Task as stored by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Server-generated identifier.
    pub id: Uuid,
    /// Non-empty title.
    pub title: String,
    /// Optional free text.
    #[serde(default)]
    pub description: Option<String>,
    /// Progress state.
    pub status: TaskStatus,
    /// Importance.
    pub priority: TaskPriority,
    /// Optional due date.
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// Owning user.
    pub user_id: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a task. Omitted fields take server defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewTask {
    /// Required title.
    pub title: String,
    /// Optional free text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Initial status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// Initial priority.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    /// Optional due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    /// Draft with only a title; everything else takes server defaults.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update. `None` leaves a field untouched; for the nullable fields
/// `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskUpdate {
    /// Replacement title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Replacement or cleared description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    /// Replacement status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// Replacement priority.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    /// Replacement or cleared due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

/// Successful login.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token.
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaskEnvelope {
    pub(crate) task: Task,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SuggestionEnvelope {
    pub(crate) suggestion: String,
}
