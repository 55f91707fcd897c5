//! Change notifications raised by successful task mutations.

use super::{Task, TaskId, UserId};

/// A committed change to one of a user's tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    /// A task was inserted.
    Created(Task),
    /// Fields or status of a task changed; carries the stored state.
    Updated(Task),
    /// A task was removed.
    Deleted { id: TaskId, owner: UserId },
}

impl TaskEvent {
    /// User whose task changed. Subscribers only ever see their own events.
    #[must_use]
    pub fn owner(&self) -> UserId {
        match self {
            Self::Created(task) | Self::Updated(task) => task.user_id,
            Self::Deleted { owner, .. } => *owner,
        }
    }

    /// Identifier of the affected task.
    #[must_use]
    pub fn task_id(&self) -> TaskId {
        match self {
            Self::Created(task) | Self::Updated(task) => task.id,
            Self::Deleted { id, .. } => *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskDraft, TaskTitle};
    use chrono::Utc;
    use rstest::rstest;

    #[rstest]
    fn every_event_names_its_owner() {
        let owner = UserId::random();
        let task = Task::create(
            owner,
            TaskDraft::new(TaskTitle::new("Sweep").expect("title")),
            Utc::now(),
        );
        let id = task.id;

        for event in [
            TaskEvent::Created(task.clone()),
            TaskEvent::Updated(task),
            TaskEvent::Deleted { id, owner },
        ] {
            assert_eq!(event.owner(), owner);
            assert_eq!(event.task_id(), id);
        }
    }
}
