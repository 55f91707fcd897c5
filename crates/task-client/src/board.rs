//! Board state: the authoritative task list plus everything needed to draw it.
//!
//! Mutations go through [`TaskApi`] and the list is patched from the record
//! the server returns, never from the local request. A 404 on a mutation
//! means the task is gone server-side, so the stale entry is dropped. Every
//! failure lands in a single banner message; the error is still returned so
//! callers can branch on it. A rejected or missing token also raises
//! [`TaskBoard::needs_login`] until the next successful refresh.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::TaskApi;
use crate::error::ClientError;
use crate::model::{NewTask, Task, TaskStatus, TaskUpdate, cycle_status};
use crate::render::BoardView;
use crate::suggestion::SuggestionDraft;
use crate::view::{TaskStatistics, ViewOptions};

/// Client-side task board.
pub struct TaskBoard<A> {
    api: A,
    tasks: Vec<Task>,
    options: ViewOptions,
    loading: bool,
    banner: Option<String>,
    needs_login: bool,
}

impl<A: TaskApi> TaskBoard<A> {
    /// Empty board over `api`; call [`TaskBoard::refresh`] to load it.
    pub fn new(api: A) -> Self {
        Self {
            api,
            tasks: Vec::new(),
            options: ViewOptions::default(),
            loading: false,
            banner: None,
            needs_login: false,
        }
    }

    /// Underlying API handle.
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Stored tasks in list order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Current view options.
    pub const fn options(&self) -> &ViewOptions {
        &self.options
    }

    /// Mutable view options; changes apply on the next projection.
    pub const fn options_mut(&mut self) -> &mut ViewOptions {
        &mut self.options
    }

    /// True while a refresh is in flight.
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Current error banner.
    pub fn error(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// True once the server has rejected the session.
    pub const fn needs_login(&self) -> bool {
        self.needs_login
    }

    /// Clear the error banner.
    pub fn dismiss_error(&mut self) {
        self.banner = None;
    }

    /// Filtered and sorted tasks.
    pub fn visible(&self) -> Vec<&Task> {
        self.options.project(&self.tasks)
    }

    /// Counters over every stored task.
    pub fn statistics(&self) -> TaskStatistics {
        TaskStatistics::from_tasks(&self.tasks)
    }

    /// Render the board as of `now`.
    pub fn render(&self, now: DateTime<Utc>) -> BoardView {
        BoardView::build(&self.tasks, &self.options, now)
    }

    /// Replace the list with the server's.
    ///
    /// # Errors
    /// Any [`ClientError`]; the stored list is kept and the banner set.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        self.loading = true;
        let result = self.api.list_tasks().await;
        self.loading = false;
        match result {
            Ok(tasks) => {
                debug!(count = tasks.len(), "task list refreshed");
                self.tasks = tasks;
                self.banner = None;
                self.needs_login = false;
                Ok(())
            }
            Err(err) => Err(self.fail("Failed to load tasks", err)),
        }
    }

    /// Create a task and insert the stored record.
    ///
    /// # Errors
    /// Any [`ClientError`]; the banner is set.
    pub async fn create(&mut self, task: NewTask) -> Result<Task, ClientError> {
        match self.api.create_task(&task).await {
            Ok(created) => {
                self.reconcile(created.clone());
                Ok(created)
            }
            Err(err) => Err(self.fail("Failed to create task", err)),
        }
    }

    /// Apply a partial update.
    ///
    /// # Errors
    /// Any [`ClientError`]; on 404 the task is also removed from the board.
    pub async fn update(&mut self, id: Uuid, update: TaskUpdate) -> Result<Task, ClientError> {
        let result = self.api.update_task(id, &update).await;
        self.settle_mutation(id, result, "Failed to update task")
    }

    /// Set the status of a task.
    ///
    /// # Errors
    /// Any [`ClientError`]; on 404 the task is also removed from the board.
    pub async fn set_status(&mut self, id: Uuid, status: TaskStatus) -> Result<Task, ClientError> {
        let result = self.api.set_status(id, status).await;
        self.settle_mutation(id, result, "Failed to update task status")
    }

    /// Advance a task one step through the status cycle.
    ///
    /// # Errors
    /// [`ClientError::UnknownTask`] when `id` is not on the board, otherwise
    /// as [`TaskBoard::set_status`].
    pub async fn cycle_status(&mut self, id: Uuid) -> Result<Task, ClientError> {
        let current = self
            .tasks
            .iter()
            .find(|task| task.id == id)
            .map(|task| task.status);
        let Some(status) = current else {
            return Err(self.fail(
                "Failed to update task status",
                ClientError::UnknownTask { id },
            ));
        };
        self.set_status(id, cycle_status(status)).await
    }

    /// Delete a task, removing it once the server confirms.
    ///
    /// # Errors
    /// Any [`ClientError`]; on 404 the task is also removed from the board.
    pub async fn delete(&mut self, id: Uuid) -> Result<(), ClientError> {
        match self.api.delete_task(id).await {
            Ok(()) => {
                self.forget(id);
                Ok(())
            }
            Err(err) => {
                if err.is_not_found() {
                    self.forget(id);
                }
                Err(self.fail("Failed to delete task", err))
            }
        }
    }

    /// Ask for a suggestion and clean it up for review.
    ///
    /// # Errors
    /// Any [`ClientError`]; the banner is set.
    pub async fn suggest(&mut self, description: &str) -> Result<SuggestionDraft, ClientError> {
        match self.api.suggest(description).await {
            Ok(raw) => Ok(SuggestionDraft::new(&raw)),
            Err(err) => Err(self.fail("Failed to get AI suggestion", err)),
        }
    }

    /// Create the task a suggestion describes.
    ///
    /// # Errors
    /// As [`TaskBoard::create`].
    pub async fn accept_suggestion(
        &mut self,
        draft: SuggestionDraft,
        now: DateTime<Utc>,
    ) -> Result<Task, ClientError> {
        self.create(draft.into_new_task(now)).await
    }

    fn settle_mutation(
        &mut self,
        id: Uuid,
        result: Result<Task, ClientError>,
        action: &str,
    ) -> Result<Task, ClientError> {
        match result {
            Ok(task) => {
                self.reconcile(task.clone());
                Ok(task)
            }
            Err(err) => {
                if err.is_not_found() {
                    self.forget(id);
                }
                Err(self.fail(action, err))
            }
        }
    }

    fn reconcile(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|stored| stored.id == task.id) {
            Some(stored) => *stored = task,
            None => self.tasks.push(task),
        }
    }

    fn forget(&mut self, id: Uuid) {
        self.tasks.retain(|task| task.id != id);
    }

    fn fail(&mut self, action: &str, err: ClientError) -> ClientError {
        warn!(error = %err, action, "task board operation failed");
        self.banner = Some(format!("{action}: {err}"));
        if err.is_unauthorized() {
            self.needs_login = true;
        }
        err
    }
}
