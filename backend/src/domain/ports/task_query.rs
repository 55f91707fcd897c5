//! Driving port for reading tasks.

use async_trait::async_trait;

use crate::domain::{Error, Task, UserId};

/// Read side of the task API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskQuery: Send + Sync {
    /// Every task owned by `owner`.
    async fn list(&self, owner: &UserId) -> Result<Vec<Task>, Error>;
}
