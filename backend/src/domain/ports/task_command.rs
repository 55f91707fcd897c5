//! Driving port for task mutations.

use async_trait::async_trait;

use crate::domain::{Error, Task, TaskChanges, TaskDraft, TaskId, TaskStatus, UserId};

/// Task mutations performed on behalf of an authenticated owner.
///
/// Identifiers that do not exist, or exist but belong to someone else, are
/// reported as [`crate::domain::ErrorCode::NotFound`] alike.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskCommand: Send + Sync {
    /// Create a task owned by `owner`.
    async fn create(&self, owner: &UserId, draft: TaskDraft) -> Result<Task, Error>;

    /// Apply a partial update and return the stored record.
    async fn update(
        &self,
        owner: &UserId,
        id: &TaskId,
        changes: TaskChanges,
    ) -> Result<Task, Error>;

    /// Set only the status and return the stored record.
    async fn set_status(
        &self,
        owner: &UserId,
        id: &TaskId,
        status: TaskStatus,
    ) -> Result<Task, Error>;

    /// Delete a task.
    async fn delete(&self, owner: &UserId, id: &TaskId) -> Result<(), Error>;
}
