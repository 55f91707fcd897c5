//! PostgreSQL-backed `TaskRepository` implementation using Diesel ORM.
//!
//! Every statement filters on both the task id and the owner column, so rows
//! belonging to other users are invisible to callers.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{TaskRepository, TaskRepositoryError};
use crate::domain::{Task, TaskId, TaskPriority, TaskStatus, TaskTitle, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewTaskRow, TaskRow, TaskUpdate};
use super::pool::DbPool;
use super::schema::tasks;

/// Diesel-backed implementation of the task repository port.
#[derive(Clone)]
pub struct DieselTaskRepository {
    pool: DbPool,
}

impl DieselTaskRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: super::pool::PoolError) -> TaskRepositoryError {
    map_pool_error(error, TaskRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> TaskRepositoryError {
    map_diesel_error(
        error,
        TaskRepositoryError::query,
        TaskRepositoryError::connection,
    )
}

fn row_to_task(row: TaskRow) -> Result<Task, TaskRepositoryError> {
    let TaskRow {
        id,
        user_id,
        title,
        description,
        status,
        priority,
        due_date,
        created_at,
        updated_at,
    } = row;

    let title = TaskTitle::new(&title)
        .map_err(|err| TaskRepositoryError::query(format!("stored task {id}: {err}")))?;
    let status = TaskStatus::parse(&status).ok_or_else(|| {
        TaskRepositoryError::query(format!("stored task {id}: unknown status {status}"))
    })?;
    let priority = TaskPriority::parse(&priority).ok_or_else(|| {
        TaskRepositoryError::query(format!("stored task {id}: unknown priority {priority}"))
    })?;

    Ok(Task {
        id: TaskId::from_uuid(id),
        title,
        description,
        status,
        priority,
        due_date,
        user_id: UserId::from_uuid(user_id),
        created_at,
        updated_at,
    })
}

fn to_new_row(task: &Task) -> NewTaskRow<'_> {
    NewTaskRow {
        id: *task.id.as_uuid(),
        user_id: *task.user_id.as_uuid(),
        title: task.title.as_str(),
        description: task.description.as_deref(),
        status: task.status.as_str(),
        priority: task.priority.as_str(),
        due_date: task.due_date,
        created_at: task.created_at,
        updated_at: task.updated_at,
    }
}

fn to_changeset(task: &Task) -> TaskUpdate<'_> {
    TaskUpdate {
        title: task.title.as_str(),
        description: task.description.as_deref(),
        status: task.status.as_str(),
        priority: task.priority.as_str(),
        due_date: task.due_date,
        updated_at: task.updated_at,
    }
}

#[async_trait]
impl TaskRepository for DieselTaskRepository {
    async fn insert(&self, task: &Task) -> Result<(), TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        diesel::insert_into(tasks::table)
            .values(&to_new_row(task))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Task>, TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let rows: Vec<TaskRow> = tasks::table
            .filter(tasks::user_id.eq(owner.as_uuid()))
            .order((tasks::created_at.asc(), tasks::id.asc()))
            .select(TaskRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;

        rows.into_iter().map(row_to_task).collect()
    }

    async fn find_for_owner(
        &self,
        owner: &UserId,
        id: &TaskId,
    ) -> Result<Option<Task>, TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row: Option<TaskRow> = tasks::table
            .filter(tasks::id.eq(id.as_uuid()))
            .filter(tasks::user_id.eq(owner.as_uuid()))
            .select(TaskRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map(row_to_task).transpose()
    }

    async fn update(&self, task: &Task) -> Result<bool, TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let affected = diesel::update(
            tasks::table
                .filter(tasks::id.eq(task.id.as_uuid()))
                .filter(tasks::user_id.eq(task.user_id.as_uuid())),
        )
        .set(&to_changeset(task))
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;

        Ok(affected > 0)
    }

    async fn delete_for_owner(
        &self,
        owner: &UserId,
        id: &TaskId,
    ) -> Result<bool, TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let affected = diesel::delete(
            tasks::table
                .filter(tasks::id.eq(id.as_uuid()))
                .filter(tasks::user_id.eq(owner.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;

        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    #[fixture]
    fn row() -> TaskRow {
        let at = Utc
            .with_ymd_and_hms(2025, 2, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        TaskRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Renew passport".to_owned(),
            description: None,
            status: "in-progress".to_owned(),
            priority: "high".to_owned(),
            due_date: Some(at),
            created_at: at,
            updated_at: at,
        }
    }

    #[rstest]
    fn rows_convert_to_tasks(row: TaskRow) {
        let owner = row.user_id;
        let task = row_to_task(row).expect("valid row");
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.user_id.as_uuid(), &owner);
    }

    #[rstest]
    #[case::status("status")]
    #[case::priority("priority")]
    #[case::title("title")]
    fn corrupt_rows_are_query_errors(mut row: TaskRow, #[case] column: &str) {
        match column {
            "status" => row.status = "archived".to_owned(),
            "priority" => row.priority = "urgent".to_owned(),
            _ => row.title = "   ".to_owned(),
        }
        let err = row_to_task(row).expect_err("corrupt row");
        assert!(matches!(err, TaskRepositoryError::Query { .. }));
    }

    #[rstest]
    fn changeset_mirrors_task_fields(row: TaskRow) {
        let mut task = row_to_task(row).expect("valid row");
        task.description = Some("bring photos".to_owned());
        task.due_date = None;

        let update = to_changeset(&task);
        assert_eq!(update.description, Some("bring photos"));
        assert_eq!(update.due_date, None);
        assert_eq!(update.status, "in-progress");
    }
}
