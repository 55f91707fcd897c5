//! Task aggregate and its value types.
//!
//! A task always has exactly one owner. Ownership is assigned from the
//! authenticated caller at creation time and never changes afterwards.
//!
//! Timestamps are held at microsecond precision, the resolution of a
//! PostgreSQL `TIMESTAMPTZ`, so the record returned by a mutation is the
//! record a later read produces.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::UserId;

/// Sub-second digits kept on stored timestamps.
const STORED_SUBSEC_DIGITS: u16 = 6;

/// Drop precision the task store cannot represent.
///
/// ```
/// use backend::domain::task::stored_precision;
/// use chrono::{TimeZone, Timelike, Utc};
///
/// let ts = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
/// assert_eq!(stored_precision(ts).nanosecond(), 123_456_000);
/// ```
pub fn stored_precision(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.trunc_subsecs(STORED_SUBSEC_DIGITS)
}

/// Validation errors for task values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title was missing or blank once trimmed.
    EmptyTitle,
    /// Task identifier was not a UUID.
    InvalidId,
}

impl fmt::Display for TaskValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::InvalidId => write!(f, "task id must be a valid UUID"),
        }
    }
}

impl std::error::Error for TaskValidationError {}

/// Opaque task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Parse an identifier from a path segment.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, TaskValidationError> {
        Uuid::parse_str(raw.as_ref())
            .map(Self)
            .map_err(|_| TaskValidationError::InvalidId)
    }

    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap a UUID read back from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Non-empty, trimmed task title.
///
/// # Examples
/// ```
/// use backend::domain::TaskTitle;
///
/// let title = TaskTitle::new("  Buy milk ").unwrap();
/// assert_eq!(title.as_str(), "Buy milk");
/// assert!(TaskTitle::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Trim and validate a title.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, TaskValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the title text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<TaskTitle> for String {
    fn from(value: TaskTitle) -> Self {
        value.0
    }
}

impl TryFrom<String> for TaskTitle {
    type Error = TaskValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Progress state of a task.
///
/// The server imposes no transition rules; any value may be set directly.
/// `Pending` is accepted for clients that predate `todo`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started.
    #[default]
    Todo,
    /// Being worked on.
    InProgress,
    /// Done.
    Completed,
    /// Legacy spelling of "not started".
    Pending,
}

impl TaskStatus {
    /// Wire and storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Pending => "pending",
        }
    }

    /// Parse the wire representation.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "todo" => Some(Self::Todo),
            "in-progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }
}

/// Relative importance of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
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
    /// Wire and storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parse the wire representation.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Stored task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Task {
    /// Identifier generated on creation.
    pub id: TaskId,
    /// Required title.
    pub title: TaskTitle,
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
    #[schema(value_type = String, format = Uuid)]
    pub user_id: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Materialise a new task for `owner` from a validated draft.
    pub fn create(owner: UserId, draft: TaskDraft, now: DateTime<Utc>) -> Self {
        let TaskDraft {
            title,
            description,
            status,
            priority,
            due_date,
        } = draft;
        let now = stored_precision(now);
        Self {
            id: TaskId::random(),
            title,
            description,
            status,
            priority,
            due_date: due_date.map(stored_precision),
            user_id: owner,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update, refreshing `updated_at`.
    pub fn apply(&mut self, changes: TaskChanges, now: DateTime<Utc>) {
        let TaskChanges {
            title,
            description,
            status,
            priority,
            due_date,
        } = changes;
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(priority) = priority {
            self.priority = priority;
        }
        if let Some(due_date) = due_date {
            self.due_date = due_date.map(stored_precision);
        }
        self.updated_at = stored_precision(now);
    }

    /// Whether `user` owns this task.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.user_id == *user
    }
}

/// Validated input for task creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Required title.
    pub title: TaskTitle,
    /// Optional description.
    pub description: Option<String>,
    /// Initial status, `todo` unless supplied.
    pub status: TaskStatus,
    /// Initial priority, `medium` unless supplied.
    pub priority: TaskPriority,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskDraft {
    /// Draft with default status and priority.
    pub fn new(title: TaskTitle) -> Self {
        Self {
            title,
            description: None,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            due_date: None,
        }
    }
}

/// Partial update. `None` leaves a field untouched; for nullable fields
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    /// Replacement title.
    pub title: Option<TaskTitle>,
    /// Replacement description.
    pub description: Option<Option<String>>,
    /// Replacement status.
    pub status: Option<TaskStatus>,
    /// Replacement priority.
    pub priority: Option<TaskPriority>,
    /// Replacement due date.
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TaskChanges {
    /// Change set touching only the status.
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    #[rstest]
    #[case("todo", TaskStatus::Todo)]
    #[case("in-progress", TaskStatus::InProgress)]
    #[case("completed", TaskStatus::Completed)]
    #[case("pending", TaskStatus::Pending)]
    fn status_wire_names(#[case] wire: &str, #[case] status: TaskStatus) {
        assert_eq!(TaskStatus::parse(wire), Some(status));
        assert_eq!(status.as_str(), wire);
        assert_eq!(serde_json::to_value(status).expect("serialise"), json!(wire));
    }

    #[rstest]
    fn unknown_status_is_rejected() {
        assert_eq!(TaskStatus::parse("done"), None);
        assert!(serde_json::from_value::<TaskStatus>(json!("done")).is_err());
    }

    #[rstest]
    fn create_applies_defaults_and_owner(now: DateTime<Utc>) {
        let owner = UserId::random();
        let draft = TaskDraft::new(TaskTitle::new("Buy milk").expect("title"));
        let task = Task::create(owner, draft, now);

        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert!(task.is_owned_by(&owner));
        assert_eq!(task.created_at, now);
        assert_eq!(task.updated_at, now);
    }

    #[rstest]
    fn apply_touches_only_supplied_fields(now: DateTime<Utc>) {
        let mut draft = TaskDraft::new(TaskTitle::new("Write report").expect("title"));
        draft.description = Some("quarterly".to_owned());
        draft.due_date = Some(now);
        let mut task = Task::create(UserId::random(), draft, now);
        let later = now + chrono::Duration::minutes(5);

        task.apply(
            TaskChanges {
                status: Some(TaskStatus::InProgress),
                due_date: Some(None),
                ..TaskChanges::default()
            },
            later,
        );

        assert_eq!(task.title.as_str(), "Write report");
        assert_eq!(task.description.as_deref(), Some("quarterly"));
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.due_date, None);
        assert_eq!(task.updated_at, later);
        assert_eq!(task.created_at, now);
    }

    #[rstest]
    fn timestamps_are_truncated_to_microseconds(now: DateTime<Utc>) {
        let precise = now + chrono::Duration::nanoseconds(123_456_789);
        let mut draft = TaskDraft::new(TaskTitle::new("Buy milk").expect("title"));
        draft.due_date = Some(precise);
        let mut task = Task::create(UserId::random(), draft, precise);

        let expected = now + chrono::Duration::microseconds(123_456);
        assert_eq!(task.created_at, expected);
        assert_eq!(task.updated_at, expected);
        assert_eq!(task.due_date, Some(expected));

        let later = precise + chrono::Duration::nanoseconds(999);
        task.apply(
            TaskChanges {
                due_date: Some(Some(later)),
                ..TaskChanges::default()
            },
            later,
        );
        let expected_later = now + chrono::Duration::microseconds(123_457);
        assert_eq!(task.updated_at, expected_later);
        assert_eq!(task.due_date, Some(expected_later));
        assert_eq!(
            serde_json::to_value(&task).expect("serialise")["created_at"],
            "2025-03-01T09:30:00.123456Z"
        );
    }

    #[rstest]
    fn task_serialises_snake_case(now: DateTime<Utc>) {
        let task = Task::create(
            UserId::random(),
            TaskDraft::new(TaskTitle::new("Buy milk").expect("title")),
            now,
        );
        let value = serde_json::to_value(&task).expect("serialise");
        assert_eq!(value["title"], "Buy milk");
        assert_eq!(value["status"], "todo");
        assert_eq!(value["priority"], "medium");
        assert_eq!(value["user_id"], task.user_id.to_string());
        assert!(value.get("due_date").is_some());
    }
}
