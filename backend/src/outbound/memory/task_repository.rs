//! In-memory `TaskRepository` preserving insertion order.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{TaskRepository, TaskRepositoryError};
use crate::domain::{Task, TaskId, UserId};

/// Vector-backed task store.
#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    tasks: Mutex<Vec<Task>>,
}

impl InMemoryTaskRepository {
    fn lock(&self) -> Result<MutexGuard<'_, Vec<Task>>, TaskRepositoryError> {
        self.tasks
            .lock()
            .map_err(|_| TaskRepositoryError::query("task store lock poisoned"))
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn insert(&self, task: &Task) -> Result<(), TaskRepositoryError> {
        let mut tasks = self.lock()?;
        if tasks.iter().any(|existing| existing.id == task.id) {
            return Err(TaskRepositoryError::query("duplicate task id"));
        }
        tasks.push(task.clone());
        Ok(())
    }

    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Task>, TaskRepositoryError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|task| task.is_owned_by(owner))
            .cloned()
            .collect())
    }

    async fn find_for_owner(
        &self,
        owner: &UserId,
        id: &TaskId,
    ) -> Result<Option<Task>, TaskRepositoryError> {
        Ok(self
            .lock()?
            .iter()
            .find(|task| task.id == *id && task.is_owned_by(owner))
            .cloned())
    }

    async fn update(&self, task: &Task) -> Result<bool, TaskRepositoryError> {
        let mut tasks = self.lock()?;
        let Some(slot) = tasks
            .iter_mut()
            .find(|stored| stored.id == task.id && stored.is_owned_by(&task.user_id))
        else {
            return Ok(false);
        };
        *slot = task.clone();
        Ok(true)
    }

    async fn delete_for_owner(
        &self,
        owner: &UserId,
        id: &TaskId,
    ) -> Result<bool, TaskRepositoryError> {
        let mut tasks = self.lock()?;
        let before = tasks.len();
        tasks.retain(|task| !(task.id == *id && task.is_owned_by(owner)));
        Ok(tasks.len() < before)
    }
}
