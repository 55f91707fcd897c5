//! Driven port for task persistence.
//!
//! Every operation takes the owner explicitly. Adapters must filter on it so a
//! caller can never observe or touch another user's rows.

use async_trait::async_trait;

use crate::domain::{Task, TaskId, UserId};

use super::define_port_error;

define_port_error! {
    /// Failures raised by task repository adapters.
    pub enum TaskRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => transient "task repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => permanent "task repository query failed: {message}",
    }
}

/// Owner-scoped task storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Persist a new task.
    async fn insert(&self, task: &Task) -> Result<(), TaskRepositoryError>;

    /// All tasks owned by `owner`, in storage order.
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Task>, TaskRepositoryError>;

    /// The task `id` if it exists and belongs to `owner`.
    async fn find_for_owner(
        &self,
        owner: &UserId,
        id: &TaskId,
    ) -> Result<Option<Task>, TaskRepositoryError>;

    /// Overwrite the stored row matching `task.id` and `task.user_id`.
    ///
    /// Returns `false` when no such row exists.
    async fn update(&self, task: &Task) -> Result<bool, TaskRepositoryError>;

    /// Remove the task `id` owned by `owner`. Returns `false` when absent.
    async fn delete_for_owner(
        &self,
        owner: &UserId,
        id: &TaskId,
    ) -> Result<bool, TaskRepositoryError>;
}
