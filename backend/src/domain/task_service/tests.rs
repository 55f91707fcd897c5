//! Unit coverage for `TaskService` using a mocked repository.

use chrono::{DateTime, Local, TimeZone, Utc};
use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockTaskEventSink, MockTaskRepository};
use crate::domain::{ErrorCode, TaskPriority, TaskTitle};

struct FixtureClock(DateTime<Utc>);

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 2, 8, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn owner() -> UserId {
    UserId::new("11111111-1111-4111-8111-111111111111").expect("owner id")
}

fn service(repo: MockTaskRepository, now: DateTime<Utc>) -> TaskService {
    TaskService::new(Arc::new(repo), Arc::new(FixtureClock(now)))
}

fn stored_task(owner: UserId, now: DateTime<Utc>) -> Task {
    Task::create(
        owner,
        TaskDraft::new(TaskTitle::new("Water plants").expect("title")),
        now - chrono::Duration::days(1),
    )
}

#[rstest]
#[tokio::test]
async fn create_binds_owner_and_persists(owner: UserId, now: DateTime<Utc>) {
    let mut repo = MockTaskRepository::new();
    repo.expect_insert()
        .withf(move |task| task.user_id == owner && task.title.as_str() == "Buy milk")
        .times(1)
        .returning(|_| Ok(()));

    let mut draft = TaskDraft::new(TaskTitle::new("Buy milk").expect("title"));
    draft.status = TaskStatus::Pending;
    let task = service(repo, now)
        .create(&owner, draft)
        .await
        .expect("create succeeds");

    assert_eq!(task.user_id, owner);
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.priority, TaskPriority::Medium);
    assert_eq!(task.created_at, now);
}

#[rstest]
#[tokio::test]
async fn update_applies_changes_and_bumps_timestamp(owner: UserId, now: DateTime<Utc>) {
    let existing = stored_task(owner, now);
    let id = existing.id;
    let mut repo = MockTaskRepository::new();
    repo.expect_find_for_owner()
        .with(eq(owner), eq(id))
        .times(1)
        .return_once(move |_, _| Ok(Some(existing)));
    repo.expect_update()
        .withf(move |task| task.status == TaskStatus::Completed && task.updated_at == now)
        .times(1)
        .returning(|_| Ok(true));

    let task = service(repo, now)
        .set_status(&owner, &id, TaskStatus::Completed)
        .await
        .expect("update succeeds");

    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.title.as_str(), "Water plants");
    assert_eq!(task.updated_at, now);
}

#[rstest]
#[tokio::test]
async fn update_of_unknown_or_foreign_task_is_not_found(owner: UserId, now: DateTime<Utc>) {
    let mut repo = MockTaskRepository::new();
    repo.expect_find_for_owner()
        .times(1)
        .returning(|_, _| Ok(None));
    repo.expect_update().times(0);

    let err = service(repo, now)
        .update(&owner, &TaskId::random(), TaskChanges::default())
        .await
        .expect_err("missing task");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn update_racing_a_delete_is_not_found(owner: UserId, now: DateTime<Utc>) {
    let existing = stored_task(owner, now);
    let id = existing.id;
    let mut repo = MockTaskRepository::new();
    repo.expect_find_for_owner()
        .return_once(move |_, _| Ok(Some(existing)));
    repo.expect_update().returning(|_| Ok(false));

    let err = service(repo, now)
        .set_status(&owner, &id, TaskStatus::InProgress)
        .await
        .expect_err("row vanished");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[case(true, None)]
#[case(false, Some(ErrorCode::NotFound))]
#[tokio::test]
async fn delete_reports_missing_rows(
    owner: UserId,
    now: DateTime<Utc>,
    #[case] removed: bool,
    #[case] expected: Option<ErrorCode>,
) {
    let id = TaskId::random();
    let mut repo = MockTaskRepository::new();
    repo.expect_delete_for_owner()
        .with(eq(owner), eq(id))
        .times(1)
        .returning(move |_, _| Ok(removed));

    let result = service(repo, now).delete(&owner, &id).await;
    assert_eq!(result.err().map(|err| err.code()), expected);
}

#[rstest]
#[case(TaskRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(TaskRepositoryError::query("relation missing"), ErrorCode::InternalError)]
#[tokio::test]
async fn list_maps_repository_failures(
    owner: UserId,
    now: DateTime<Utc>,
    #[case] failure: TaskRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockTaskRepository::new();
    repo.expect_list_for_owner()
        .return_once(move |_| Err(failure));

    let err = service(repo, now)
        .list(&owner)
        .await
        .expect_err("failure propagates");
    assert_eq!(err.code(), expected);
}

#[rstest]
#[tokio::test]
async fn list_is_scoped_to_owner(owner: UserId, now: DateTime<Utc>) {
    let task = stored_task(owner, now);
    let expected = vec![task.clone()];
    let mut repo = MockTaskRepository::new();
    repo.expect_list_for_owner()
        .with(eq(owner))
        .times(1)
        .return_once(move |_| Ok(vec![task]));

    let tasks = service(repo, now).list(&owner).await.expect("list");
    assert_eq!(tasks, expected);
}

fn with_sink(repo: MockTaskRepository, sink: MockTaskEventSink, now: DateTime<Utc>) -> TaskService {
    service(repo, now).with_events(Arc::new(sink))
}

#[rstest]
#[tokio::test]
async fn committed_mutations_are_announced(owner: UserId, now: DateTime<Utc>) {
    let existing = stored_task(owner, now);
    let id = existing.id;
    let mut repo = MockTaskRepository::new();
    repo.expect_insert().returning(|_| Ok(()));
    repo.expect_find_for_owner()
        .return_once(move |_, _| Ok(Some(existing)));
    repo.expect_update().returning(|_| Ok(true));
    repo.expect_delete_for_owner().returning(|_, _| Ok(true));

    let mut sink = MockTaskEventSink::new();
    let mut sequence = mockall::Sequence::new();
    sink.expect_publish()
        .withf(move |event| matches!(event, TaskEvent::Created(task) if task.user_id == owner))
        .times(1)
        .in_sequence(&mut sequence)
        .return_const(());
    sink.expect_publish()
        .withf(move |event| {
            matches!(event, TaskEvent::Updated(task)
                if task.id == id && task.status == TaskStatus::Completed)
        })
        .times(1)
        .in_sequence(&mut sequence)
        .return_const(());
    sink.expect_publish()
        .with(eq(TaskEvent::Deleted { id, owner }))
        .times(1)
        .in_sequence(&mut sequence)
        .return_const(());

    let service = with_sink(repo, sink, now);
    service
        .create(&owner, TaskDraft::new(TaskTitle::new("Buy milk").expect("title")))
        .await
        .expect("create");
    service
        .set_status(&owner, &id, TaskStatus::Completed)
        .await
        .expect("update");
    service.delete(&owner, &id).await.expect("delete");
}

#[rstest]
#[tokio::test]
async fn failed_mutations_stay_silent(owner: UserId, now: DateTime<Utc>) {
    let mut repo = MockTaskRepository::new();
    repo.expect_insert()
        .returning(|_| Err(TaskRepositoryError::connection("refused")));
    repo.expect_find_for_owner().returning(|_, _| Ok(None));
    repo.expect_delete_for_owner().returning(|_, _| Ok(false));

    let mut sink = MockTaskEventSink::new();
    sink.expect_publish().times(0);

    let service = with_sink(repo, sink, now);
    let id = TaskId::random();
    assert!(
        service
            .create(&owner, TaskDraft::new(TaskTitle::new("Buy milk").expect("title")))
            .await
            .is_err()
    );
    assert!(
        service
            .update(&owner, &id, TaskChanges::default())
            .await
            .is_err()
    );
    assert!(service.delete(&owner, &id).await.is_err());
}
