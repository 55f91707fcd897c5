//! Frames pushed to `/ws` subscribers.
//!
//! Every frame is a JSON object tagged by `type`:
//!
//! ```json
//! {"type": "task_created", "task": { ... }}
//! {"type": "task_updated", "task": { ... }}
//! {"type": "task_deleted", "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6"}
//! {"type": "resync", "missed": 3}
//! ```

use serde::Serialize;

use crate::domain::{Task, TaskEvent, TaskId, UserId};

/// Payload of one text frame on the live feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedMessage {
    TaskCreated { task: Task },
    TaskUpdated { task: Task },
    TaskDeleted { id: TaskId },
    /// Events were dropped for this subscriber; reload the task list.
    Resync { missed: u64 },
}

impl FeedMessage {
    /// Frame `event` for `subscriber`, or `None` when the task belongs to
    /// someone else.
    #[must_use]
    pub fn for_subscriber(event: TaskEvent, subscriber: &UserId) -> Option<Self> {
        if event.owner() != *subscriber {
            return None;
        }
        Some(match event {
            TaskEvent::Created(task) => Self::TaskCreated { task },
            TaskEvent::Updated(task) => Self::TaskUpdated { task },
            TaskEvent::Deleted { id, .. } => Self::TaskDeleted { id },
        })
    }
}
