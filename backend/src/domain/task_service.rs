//! Task use-cases: owner-scoped create, list, update, status change, delete.
//!
//! The service implements both driving ports. Every call carries the owner
//! established by the authorization gate and passes it down to the
//! repository, so a foreign task id behaves exactly like a missing one.
//! Committed mutations are announced on the configured [`TaskEventSink`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, info, warn};

use super::ports::{
    DiscardTaskEvents, TaskCommand, TaskEventSink, TaskQuery, TaskRepository, TaskRepositoryError,
};
use super::{Error, Task, TaskChanges, TaskDraft, TaskEvent, TaskId, TaskStatus, UserId};

const TASK_NOT_FOUND: &str = "task not found";

/// Task service over a [`TaskRepository`].
#[derive(Clone)]
pub struct TaskService {
    repository: Arc<dyn TaskRepository>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn TaskEventSink>,
}

impl TaskService {
    /// Create a service using `repository` and timestamps from `clock`.
    ///
    /// Events are discarded until a sink is attached with
    /// [`TaskService::with_events`].
    pub fn new(repository: Arc<dyn TaskRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            clock,
            events: Arc::new(DiscardTaskEvents),
        }
    }

    /// Announce committed mutations on `events`.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn TaskEventSink>) -> Self {
        self.events = events;
        self
    }
}

fn map_repository_error(failure: TaskRepositoryError) -> Error {
    if failure.is_transient() {
        warn!(error = %failure, "task repository unavailable");
        Error::service_unavailable("task store unavailable")
    } else {
        error!(error = %failure, "task repository failed");
        Error::internal(failure.to_string())
    }
}

#[async_trait]
impl TaskCommand for TaskService {
    async fn create(&self, owner: &UserId, draft: TaskDraft) -> Result<Task, Error> {
        let task = Task::create(*owner, draft, self.clock.utc());
        self.repository
            .insert(&task)
            .await
            .map_err(map_repository_error)?;
        info!(task_id = %task.id, user_id = %owner, "task created");
        self.events.publish(TaskEvent::Created(task.clone()));
        Ok(task)
    }

    async fn update(
        &self,
        owner: &UserId,
        id: &TaskId,
        changes: TaskChanges,
    ) -> Result<Task, Error> {
        let mut task = self
            .repository
            .find_for_owner(owner, id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(TASK_NOT_FOUND))?;

        task.apply(changes, self.clock.utc());

        // The row may have been deleted between the read and the write.
        let written = self
            .repository
            .update(&task)
            .await
            .map_err(map_repository_error)?;
        if !written {
            return Err(Error::not_found(TASK_NOT_FOUND));
        }
        info!(task_id = %task.id, user_id = %owner, "task updated");
        self.events.publish(TaskEvent::Updated(task.clone()));
        Ok(task)
    }

    async fn set_status(
        &self,
        owner: &UserId,
        id: &TaskId,
        status: TaskStatus,
    ) -> Result<Task, Error> {
        self.update(owner, id, TaskChanges::status(status)).await
    }

    async fn delete(&self, owner: &UserId, id: &TaskId) -> Result<(), Error> {
        let removed = self
            .repository
            .delete_for_owner(owner, id)
            .await
            .map_err(map_repository_error)?;
        if !removed {
            return Err(Error::not_found(TASK_NOT_FOUND));
        }
        info!(task_id = %id, user_id = %owner, "task deleted");
        self.events.publish(TaskEvent::Deleted {
            id: *id,
            owner: *owner,
        });
        Ok(())
    }
}

#[async_trait]
impl TaskQuery for TaskService {
    async fn list(&self, owner: &UserId) -> Result<Vec<Task>, Error> {
        self.repository
            .list_for_owner(owner)
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
mod tests;
