//! Integration tests for taskboard
//!
//! Services, the board and the app shell are driven end to end against the
//! in-memory record store.

use std::sync::Arc;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

use taskboard::app::{App, AppEvent};
use taskboard::error::RecordError;
use taskboard::notify::Toasts;
use taskboard::projects::{ProjectDeletePolicy, ProjectInput, ProjectStatus, PROJECT_TABLE};
use taskboard::record::memory::{Failure, Op};
use taskboard::record::{
    ByIdParams, DeletePayload, FetchParams, MemoryTransport, Record, RecordClient, RecordId,
    RecordResponse, RecordTransport, RecordsPayload,
};
use taskboard::services::Services;
use taskboard::tasks::{TaskInput, TaskStatus, TASK_TABLE};
use taskboard::team::{TeamMemberInput, TEAM_TABLE};

/// Helper to wire services to an in-memory store
fn harness(memory: MemoryTransport, policy: ProjectDeletePolicy) -> (Arc<MemoryTransport>, Toasts, Services) {
    let memory = Arc::new(memory);
    let toasts = Toasts::default();
    let client = RecordClient::new(memory.clone(), Arc::new(toasts.clone()));
    (memory, toasts, Services::new(client, policy))
}

/// Helper to seed two projects, three tasks and one member
fn seeded() -> MemoryTransport {
    MemoryTransport::new()
        .require(PROJECT_TABLE.name, &["Name_c"])
        .require(TASK_TABLE.name, &["Title_c", "project_c"])
        .seed(
            PROJECT_TABLE.name,
            vec![
                json!({"Name_c": "Website", "Status_c": "active"}),
                json!({"Name_c": "App", "Status_c": "planning"}),
            ],
        )
        .seed(
            TASK_TABLE.name,
            vec![
                json!({"Title_c": "Sitemap", "Status_c": "todo", "project_c": {"Id": 1, "Name": "Website"}}),
                json!({"Title_c": "Landing", "Status_c": "in-progress", "project_c": 1, "Assigned_To_c": 1}),
                json!({"Title_c": "Wireframes", "Status_c": "todo", "project_c": 2}),
            ],
        )
        .seed(
            TEAM_TABLE.name,
            vec![json!({"Name_c": "Ada Lovelace", "Email_c": "ada@example.com", "Role_c": "Engineer"})],
        )
}

fn without_system_fields(mut record: Record) -> Record {
    for key in ["Id", "CreatedOn", "ModifiedOn"] {
        record.remove(key);
    }
    record
}

/// How much of an accepted record the service echoes back
#[derive(Clone, Copy)]
enum Echo {
    Nothing,
    IdAndStatus,
}

/// Record service that stores like the in-memory one but answers
/// create/update batches with a trimmed `data` payload
struct TrimmedReplies {
    inner: Arc<MemoryTransport>,
    echo: Echo,
}

impl TrimmedReplies {
    fn trim(&self, mut response: RecordResponse) -> RecordResponse {
        for result in response.results.iter_mut().flatten() {
            result.data = match self.echo {
                Echo::Nothing => None,
                Echo::IdAndStatus => result.data.take().map(|data| {
                    let kept: Record = data
                        .as_object()
                        .into_iter()
                        .flatten()
                        .filter(|(k, _)| matches!(k.as_str(), "Id" | "Status_c"))
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect();
                    Value::Object(kept)
                }),
            };
        }
        response
    }
}

#[async_trait]
impl RecordTransport for TrimmedReplies {
    async fn fetch_records(&self, table: &str, params: &FetchParams) -> Result<RecordResponse, RecordError> {
        self.inner.fetch_records(table, params).await
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: RecordId,
        params: &ByIdParams,
    ) -> Result<RecordResponse, RecordError> {
        self.inner.get_record_by_id(table, id, params).await
    }

    async fn create_record(&self, table: &str, payload: &RecordsPayload) -> Result<RecordResponse, RecordError> {
        Ok(self.trim(self.inner.create_record(table, payload).await?))
    }

    async fn update_record(&self, table: &str, payload: &RecordsPayload) -> Result<RecordResponse, RecordError> {
        Ok(self.trim(self.inner.update_record(table, payload).await?))
    }

    async fn delete_record(&self, table: &str, payload: &DeletePayload) -> Result<RecordResponse, RecordError> {
        self.inner.delete_record(table, payload).await
    }
}

/// Helper to wire services to a store whose replies echo back `echo`
fn trimmed_harness(echo: Echo) -> (Arc<MemoryTransport>, Toasts, Services) {
    let memory = Arc::new(seeded());
    let transport = Arc::new(TrimmedReplies {
        inner: memory.clone(),
        echo,
    });
    let toasts = Toasts::default();
    let client = RecordClient::new(transport, Arc::new(toasts.clone()));
    (memory, toasts, Services::new(client, ProjectDeletePolicy::KeepTasks))
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

// =============================================================================
// Entity services
// =============================================================================

mod services {
    use super::*;

    #[tokio::test]
    async fn test_legacy_and_canonical_names_store_the_same_task() {
        let (memory, _, services) = harness(MemoryTransport::new(), ProjectDeletePolicy::KeepTasks);
        let legacy = TaskInput::from_json(&json!({
            "title": "Ship it", "description": "All of it", "status": "in-progress",
            "priority": "high", "projectId": 1, "assigneeId": "2", "dueDate": "2024-05-01"
        }))
        .unwrap();
        let canonical = TaskInput::from_json(&json!({
            "Title_c": "Ship it", "Description_c": "All of it", "Status_c": "in-progress",
            "Priority_c": "high", "project_c": 1, "Assigned_To_c": 2, "Due_Date_c": "2024-05-01"
        }))
        .unwrap();

        let a = services.tasks.create(&legacy).await.unwrap();
        let b = services.tasks.create(&canonical).await.unwrap();

        let stored_a = memory.record(TASK_TABLE.name, a.id).unwrap();
        let stored_b = memory.record(TASK_TABLE.name, b.id).unwrap();
        assert_eq!(without_system_fields(stored_a), without_system_fields(stored_b));
        assert_eq!(a.assignee, Some(RecordId(2)));
    }

    #[tokio::test]
    async fn test_canonical_name_wins_over_legacy() {
        let (_, _, services) = harness(MemoryTransport::new(), ProjectDeletePolicy::KeepTasks);
        let input = TaskInput::from_json(&json!({
            "title": "old", "Title_c": "new", "Status_c": "todo", "project_c": 1
        }))
        .unwrap();
        let task = services.tasks.create(&input).await.unwrap();
        assert_eq!(task.title, "new");
    }

    #[tokio::test]
    async fn test_partial_batch_returns_first_accepted_and_reports_each_failure() {
        let (memory, toasts, services) = harness(seeded(), ProjectDeletePolicy::KeepTasks);
        let missing_title = TaskInput {
            project: RecordId(1).into(),
            ..TaskInput::default()
        };
        let ok = |title: &str| {
            TaskInput::from_json(&json!({"Title_c": title, "Status_c": "todo", "project_c": 1})).unwrap()
        };

        let created = services
            .tasks
            .create_batch(&[missing_title, ok("B"), ok("C")])
            .await
            .unwrap();

        assert_eq!(created.title, "B");
        assert_eq!(toasts.errors(), vec!["Title_c: is required".to_string()]);
        assert_eq!(memory.rows(TASK_TABLE.name).len(), 5);
    }

    #[tokio::test]
    async fn test_batch_without_success_returns_none() {
        let (_, toasts, services) = harness(seeded(), ProjectDeletePolicy::KeepTasks);
        let empty = TaskInput::default();
        assert!(services.tasks.create_batch(&[empty.clone(), empty]).await.is_none());
        assert_eq!(toasts.errors().len(), 4);
    }

    #[tokio::test]
    async fn test_get_by_project_id_filters_remotely() {
        let (memory, _, services) = harness(seeded(), ProjectDeletePolicy::KeepTasks);
        let tasks = services.tasks.get_by_project_id(RecordId(1)).await;
        let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Sitemap", "Landing"]);
        assert_eq!(memory.call_count(Op::Fetch), 1);
    }

    #[tokio::test]
    async fn test_update_status_only_touches_status() {
        let (memory, _, services) = harness(seeded(), ProjectDeletePolicy::KeepTasks);
        assert!(services.tasks.update_status(RecordId(2), TaskStatus::Done).await);
        let stored = memory.record(TASK_TABLE.name, RecordId(2)).unwrap();
        assert_eq!(stored["Title_c"], json!("Landing"));
        assert_eq!(stored["Assigned_To_c"], json!(1));
        assert_eq!(stored["Status_c"], json!("done"));
    }

    #[tokio::test]
    async fn test_update_reads_back_when_reply_is_partial() {
        let (_, toasts, services) = trimmed_harness(Echo::IdAndStatus);
        let input = TaskInput::from_json(&json!({"title": "Landing v2"})).unwrap();
        let task = services.tasks.update(RecordId(2), &input).await.unwrap();
        assert_eq!(task.title, "Landing v2");
        assert_eq!(task.status, TaskStatus::InProgress);
        assert!(toasts.errors().is_empty());
    }

    #[tokio::test]
    async fn test_update_reads_back_when_reply_has_no_data() {
        let (_, toasts, services) = trimmed_harness(Echo::Nothing);
        let input = TaskInput::from_json(&json!({"title": "Landing v2"})).unwrap();
        let task = services.tasks.update(RecordId(2), &input).await.unwrap();
        assert_eq!(task.title, "Landing v2");
        assert!(toasts.errors().is_empty());
    }

    #[tokio::test]
    async fn test_create_reads_back_when_reply_is_partial() {
        let (memory, toasts, services) = trimmed_harness(Echo::IdAndStatus);
        let input = TaskInput::from_json(&json!({"title": "Footer", "projectId": 2})).unwrap();
        let task = services.tasks.create(&input).await.unwrap();
        assert_eq!(task.id, RecordId(4));
        assert_eq!(task.title, "Footer");
        assert!(toasts.errors().is_empty());
        assert_eq!(memory.rows(TASK_TABLE.name).len(), 4);
    }

    #[tokio::test]
    async fn test_explicit_null_unassigns() {
        let (memory, _, services) = harness(seeded(), ProjectDeletePolicy::KeepTasks);
        let input = TaskInput::from_json(&json!({"assigneeId": null})).unwrap();
        let task = services.tasks.update(RecordId(2), &input).await.unwrap();
        assert_eq!(task.assignee, None);
        let stored = memory.record(TASK_TABLE.name, RecordId(2)).unwrap();
        assert_eq!(stored["Assigned_To_c"], Value::Null);
    }

    #[tokio::test]
    async fn test_remote_failure_yields_empty_list_and_one_toast() {
        let (memory, toasts, services) = harness(seeded(), ProjectDeletePolicy::KeepTasks);
        memory.fail(Op::Fetch, Failure::Remote("Service unavailable".to_string()));
        assert!(services.projects.get_all().await.is_empty());
        assert_eq!(toasts.errors(), vec!["Service unavailable".to_string()]);
    }

    #[tokio::test]
    async fn test_transport_failure_on_create() {
        let (memory, toasts, services) = harness(seeded(), ProjectDeletePolicy::KeepTasks);
        memory.fail(Op::Create, Failure::Transport("connection reset".to_string()));
        let input = TaskInput::from_json(&json!({"title": "x", "projectId": 1})).unwrap();
        assert!(services.tasks.create(&input).await.is_none());
        assert_eq!(
            toasts.errors(),
            vec!["Transport failure: connection reset".to_string()]
        );
    }

    #[tokio::test]
    async fn test_missing_record_is_none_without_toast() {
        let (_, toasts, services) = harness(seeded(), ProjectDeletePolicy::KeepTasks);
        assert!(services.projects.get_by_id(RecordId(42)).await.is_none());
        assert!(toasts.errors().is_empty());
    }

    #[tokio::test]
    async fn test_rows_with_unknown_status_are_skipped() {
        let memory = MemoryTransport::new().seed(
            TASK_TABLE.name,
            vec![
                json!({"Title_c": "ok", "Status_c": "done", "project_c": 1}),
                json!({"Title_c": "odd", "Status_c": "blocked", "project_c": 1}),
            ],
        );
        let (_, _, services) = harness(memory, ProjectDeletePolicy::KeepTasks);
        let tasks = services.tasks.get_all().await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "ok");
    }

    #[tokio::test]
    async fn test_get_by_assignee() {
        let (_, _, services) = harness(seeded(), ProjectDeletePolicy::KeepTasks);
        let tasks = services.tasks.get_by_assignee(RecordId(1)).await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Landing");
    }

    #[tokio::test]
    async fn test_project_update_keeps_unsent_fields() {
        let (memory, _, services) = harness(seeded(), ProjectDeletePolicy::KeepTasks);
        let input = ProjectInput::from_json(&json!({"status": "completed"})).unwrap();
        let project = services.projects.update(RecordId(1), &input).await.unwrap();
        assert_eq!(project.status, ProjectStatus::Completed);
        assert_eq!(project.name, "Website");
        let stored = memory.record(PROJECT_TABLE.name, RecordId(1)).unwrap();
        assert_eq!(stored["Status_c"], json!("completed"));
    }

    #[tokio::test]
    async fn test_update_of_missing_record_reports_message() {
        let (_, toasts, services) = harness(seeded(), ProjectDeletePolicy::KeepTasks);
        let input = ProjectInput::from_json(&json!({"name": "Ghost"})).unwrap();
        assert!(services.projects.update(RecordId(77), &input).await.is_none());
        assert_eq!(toasts.errors(), vec!["Record 77 not found".to_string()]);
    }

    #[tokio::test]
    async fn test_team_member_lifecycle() {
        let (memory, _, services) = harness(seeded(), ProjectDeletePolicy::KeepTasks);
        let input = TeamMemberInput::from_json(&json!({
            "name": "Grace Hopper", "email": "grace@example.com", "role": "Lead"
        }))
        .unwrap();
        let member = services.team.create(&input).await.unwrap();
        assert_eq!(member.initials(), "GH");

        let change = TeamMemberInput::from_json(&json!({"Role_c": "Admiral"})).unwrap();
        let updated = services.team.update(member.id, &change).await.unwrap();
        assert_eq!(updated.role, "Admiral");
        assert_eq!(updated.email, "grace@example.com");

        assert!(services.team.delete(member.id).await);
        assert!(services.team.get_by_id(member.id).await.is_none());
        assert_eq!(memory.rows(TEAM_TABLE.name).len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_task_fails() {
        let (_, toasts, services) = harness(seeded(), ProjectDeletePolicy::KeepTasks);
        assert!(services.tasks.delete(RecordId(3)).await);
        assert!(!services.tasks.delete(RecordId(3)).await);
        assert_eq!(toasts.errors(), vec!["Record 3 not found".to_string()]);
    }

    #[tokio::test]
    async fn test_cascade_policy_deletes_project_tasks() {
        let (memory, _, services) = harness(seeded(), ProjectDeletePolicy::CascadeTasks);
        assert!(services.projects.delete(RecordId(1)).await);
        assert!(memory.record(PROJECT_TABLE.name, RecordId(1)).is_none());
        let remaining: Vec<Record> = memory.rows(TASK_TABLE.name);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0]["Title_c"], json!("Wireframes"));
    }

    #[tokio::test]
    async fn test_keep_policy_leaves_tasks() {
        let (memory, _, services) = harness(seeded(), ProjectDeletePolicy::KeepTasks);
        assert!(services.projects.delete(RecordId(1)).await);
        assert_eq!(memory.rows(TASK_TABLE.name).len(), 3);
    }

    #[tokio::test]
    async fn test_cascade_failure_keeps_project() {
        let (memory, _, services) = harness(seeded(), ProjectDeletePolicy::CascadeTasks);
        memory.fail(Op::Delete, Failure::Remote("locked".to_string()));
        assert!(!services.projects.delete(RecordId(1)).await);
        memory.recover();
        assert!(memory.record(PROJECT_TABLE.name, RecordId(1)).is_some());
    }

    #[tokio::test]
    async fn test_cascade_keeps_project_when_tasks_cannot_be_listed() {
        let (memory, toasts, services) = harness(seeded(), ProjectDeletePolicy::CascadeTasks);
        memory.fail(Op::Fetch, Failure::Transport("timeout".to_string()));
        assert!(!services.projects.delete(RecordId(1)).await);
        memory.recover();

        assert_eq!(memory.call_count(Op::Delete), 0);
        assert!(memory.record(PROJECT_TABLE.name, RecordId(1)).is_some());
        assert_eq!(memory.rows(TASK_TABLE.name).len(), 3);
        assert_eq!(toasts.errors(), vec!["Transport failure: timeout".to_string()]);
    }
}

// =============================================================================
// Board synchronizer
// =============================================================================

mod board_sync {
    use super::*;
    use taskboard::kanban_board::{CardPhase, DropOutcome, KanbanBoard};

    async fn board(services: &Services) -> KanbanBoard {
        let tasks = services.tasks.get_by_project_id(RecordId(1)).await;
        let team = services.team.get_all().await;
        KanbanBoard::with_tasks(tasks, team)
    }

    #[tokio::test]
    async fn test_drop_on_other_column_moves_after_confirmation() {
        let (memory, toasts, services) = harness(seeded(), ProjectDeletePolicy::KeepTasks);
        let mut board = board(&services).await;

        assert!(board.drag_start(RecordId(1)));
        let outcome = board.drop_on(TaskStatus::Done, &services.tasks).await;
        board.drag_end();

        assert_eq!(outcome, DropOutcome::Moved);
        assert_eq!(board.task(RecordId(1)).unwrap().status, TaskStatus::Done);
        assert_eq!(
            memory.record(TASK_TABLE.name, RecordId(1)).unwrap()["Status_c"],
            json!("done")
        );
        assert_eq!(toasts.successes(), vec!["Task status updated!".to_string()]);
        assert!(board.dragged().is_none());
    }

    #[tokio::test]
    async fn test_failed_drop_keeps_previous_status() {
        let (memory, toasts, services) = harness(seeded(), ProjectDeletePolicy::KeepTasks);
        let mut board = board(&services).await;
        memory.fail(Op::Update, Failure::Remote("Record is locked".to_string()));

        board.drag_start(RecordId(1));
        let outcome = board.drop_on(TaskStatus::Done, &services.tasks).await;
        board.drag_end();

        assert_eq!(outcome, DropOutcome::Rejected);
        assert_eq!(board.task(RecordId(1)).unwrap().status, TaskStatus::Todo);
        assert_eq!(board.phase(RecordId(1)), CardPhase::Reverted);
        assert_eq!(
            toasts.errors(),
            vec![
                "Record is locked".to_string(),
                "Failed to update task status".to_string()
            ]
        );
        assert_eq!(
            memory.record(TASK_TABLE.name, RecordId(1)).unwrap()["Status_c"],
            json!("todo")
        );
    }

    #[tokio::test]
    async fn test_drop_accepted_without_echoed_record_moves_card() {
        for echo in [Echo::Nothing, Echo::IdAndStatus] {
            let (memory, toasts, services) = trimmed_harness(echo);
            let mut board = board(&services).await;

            board.drag_start(RecordId(1));
            let outcome = board.drop_on(TaskStatus::Done, &services.tasks).await;
            board.drag_end();

            assert_eq!(outcome, DropOutcome::Moved);
            assert_eq!(board.task(RecordId(1)).unwrap().status, TaskStatus::Done);
            assert_eq!(board.phase(RecordId(1)), CardPhase::Resting);
            assert!(toasts.errors().is_empty());
            assert_eq!(toasts.successes(), vec!["Task status updated!".to_string()]);
            assert_eq!(
                memory.record(TASK_TABLE.name, RecordId(1)).unwrap()["Status_c"],
                json!("done")
            );
        }
    }

    #[tokio::test]
    async fn test_same_column_drop_makes_no_call() {
        let (memory, toasts, services) = harness(seeded(), ProjectDeletePolicy::KeepTasks);
        let mut board = board(&services).await;
        let before = board.tasks.clone();

        board.drag_start(RecordId(2));
        let outcome = board.drop_on(TaskStatus::InProgress, &services.tasks).await;
        board.drag_end();

        assert_eq!(outcome, DropOutcome::NoOp);
        assert_eq!(board.tasks, before);
        assert_eq!(memory.call_count(Op::Update), 0);
        assert!(toasts.messages().is_empty());
        assert!(board.dragged().is_none());
    }

    #[tokio::test]
    async fn test_drop_without_subject_makes_no_call() {
        let (memory, _, services) = harness(seeded(), ProjectDeletePolicy::KeepTasks);
        let mut board = board(&services).await;
        let outcome = board.drop_on(TaskStatus::Done, &services.tasks).await;
        assert_eq!(outcome, DropOutcome::NoSubject);
        assert_eq!(memory.call_count(Op::Update), 0);
    }

    #[tokio::test]
    async fn test_assignee_lookup() {
        let (_, _, services) = harness(seeded(), ProjectDeletePolicy::KeepTasks);
        let board = board(&services).await;
        let landing = board.task(RecordId(2)).unwrap();
        assert_eq!(board.assignee(landing).map(|m| m.initials()), Some("AL".to_string()));
        let sitemap = board.task(RecordId(1)).unwrap();
        assert!(board.assignee(sitemap).is_none());
    }
}

// =============================================================================
// App shell
// =============================================================================

mod app_flow {
    use super::*;
    use taskboard::pages::LoadPhase;
    use taskboard::routes::Route;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn app(memory: MemoryTransport) -> (Arc<MemoryTransport>, App, UnboundedReceiver<AppEvent>) {
        let (memory, toasts, services) = harness(memory, ProjectDeletePolicy::KeepTasks);
        let (tx, rx) = mpsc::unbounded_channel();
        (memory, App::new(services, toasts, tx), rx)
    }

    async fn pump(app: &mut App, rx: &mut UnboundedReceiver<AppEvent>) {
        let event = rx.recv().await.unwrap();
        app.handle_event(event);
    }

    #[tokio::test]
    async fn test_board_loads_first_project_lanes() {
        let (_, mut app, mut rx) = app(seeded());
        app.navigate(Route::Board);
        pump(&mut app, &mut rx).await;
        assert_eq!(app.board.selected_project_id(), Some(RecordId(1)));
        pump(&mut app, &mut rx).await;
        assert_eq!(app.board.board.tasks.len(), 2);
        assert_eq!(app.board.board.team.len(), 1);
    }

    #[tokio::test]
    async fn test_keyboard_drag_and_drop() {
        let (memory, mut app, mut rx) = app(seeded());
        app.navigate(Route::Board);
        pump(&mut app, &mut rx).await;
        pump(&mut app, &mut rx).await;

        app.handle_key(key(KeyCode::Char(' ')));
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Enter));
        assert!(!app.board.board.is_dragging());
        assert_eq!(app.board.board.phase(RecordId(1)), taskboard::kanban_board::CardPhase::DropPending);

        pump(&mut app, &mut rx).await;
        assert_eq!(app.board.board.task(RecordId(1)).unwrap().status, TaskStatus::Done);
        assert_eq!(memory.call_count(Op::Update), 1);
        assert!(app.toasts.successes().contains(&"Task status updated!".to_string()));
    }

    #[tokio::test]
    async fn test_switching_project_reloads_lanes() {
        let (_, mut app, mut rx) = app(seeded());
        app.navigate(Route::Board);
        pump(&mut app, &mut rx).await;
        pump(&mut app, &mut rx).await;

        app.handle_key(key(KeyCode::Char(']')));
        assert!(app.board.board.tasks.is_empty());
        pump(&mut app, &mut rx).await;
        let titles: Vec<&str> = app.board.board.tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Wireframes"]);
    }

    #[tokio::test]
    async fn test_navigating_away_drops_stale_load() {
        let (_, mut app, mut rx) = app(seeded());
        app.navigate(Route::Dashboard);
        app.navigate(Route::Team);
        pump(&mut app, &mut rx).await;
        pump(&mut app, &mut rx).await;

        assert_eq!(app.dashboard.phase(), &LoadPhase::Idle);
        assert!(app.dashboard.data().is_none());
        assert_eq!(app.team.phase(), &LoadPhase::Ready);
        assert_eq!(app.team.data().unwrap().members.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_project_fails_page_until_retry() {
        let (_, mut app, mut rx) = app(seeded());
        app.navigate(Route::ProjectDetail(RecordId(99)));
        pump(&mut app, &mut rx).await;
        assert_eq!(app.project_detail.failure(), Some("Project not found"));

        app.load_current();
        assert!(!app.project_detail.is_loading());

        app.handle_key(key(KeyCode::Char('r')));
        assert!(app.project_detail.is_loading());
        pump(&mut app, &mut rx).await;
        assert_eq!(app.project_detail.failure(), Some("Project not found"));
    }

    #[tokio::test]
    async fn test_project_detail_groups_tasks() {
        let (_, mut app, mut rx) = app(seeded());
        app.navigate(Route::ProjectDetail(RecordId(1)));
        pump(&mut app, &mut rx).await;
        let detail = app.project_detail.data().unwrap();
        assert_eq!(detail.project.name, "Website");
        let columns = detail.columns();
        assert_eq!(columns[0].1.len(), 1);
        assert_eq!(columns[1].1.len(), 1);
        assert!(columns[2].1.is_empty());
    }

    #[tokio::test]
    async fn test_create_project_form() {
        let (memory, mut app, mut rx) = app(seeded());
        app.navigate(Route::Projects);
        pump(&mut app, &mut rx).await;

        app.handle_key(key(KeyCode::Char('n')));
        for c in "Docs".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));
        assert!(app.form.is_none());

        pump(&mut app, &mut rx).await;
        assert_eq!(
            app.toasts.successes(),
            vec!["Project created successfully!".to_string()]
        );
        pump(&mut app, &mut rx).await;
        let names: Vec<String> = app
            .projects
            .filtered()
            .iter()
            .map(|(p, _)| p.name.clone())
            .collect();
        assert_eq!(names, vec!["Website", "App", "Docs"]);
        let stored = memory.record(PROJECT_TABLE.name, RecordId(3)).unwrap();
        assert_eq!(stored["Status_c"], json!("planning"));
    }

    #[tokio::test]
    async fn test_invalid_form_stays_open() {
        let (memory, mut app, _rx) = app(seeded());
        app.navigate(Route::Projects);
        app.handle_key(key(KeyCode::Char('n')));
        app.handle_key(key(KeyCode::Enter));
        let form = app.form.as_ref().unwrap();
        assert_eq!(form.error.as_deref(), Some("Name is required"));
        assert_eq!(memory.call_count(Op::Create), 0);
    }

    #[tokio::test]
    async fn test_rejected_create_shows_failure_toast() {
        let (memory, mut app, mut rx) = app(seeded());
        memory.fail(Op::Create, Failure::Remote("Quota exceeded".to_string()));
        app.navigate(Route::ProjectDetail(RecordId(1)));
        pump(&mut app, &mut rx).await;

        app.handle_key(key(KeyCode::Char('n')));
        for c in "Fix bug".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));
        pump(&mut app, &mut rx).await;

        assert_eq!(
            app.toasts.errors(),
            vec!["Quota exceeded".to_string(), "Failed to create task".to_string()]
        );
    }
}

// =============================================================================
// Binary
// =============================================================================

mod cli {
    use super::*;

    /// Helper to create a taskboard Command with no inherited configuration
    fn taskboard(dir: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("taskboard");
        cmd.current_dir(dir.path())
            .env_remove("TASKBOARD_PROJECT_ID")
            .env_remove("TASKBOARD_PUBLIC_KEY")
            .env_remove("TASKBOARD_CASCADE_DELETE")
            .env("TASKBOARD_LOG_DIR", dir.path().join("logs"));
        cmd
    }

    #[test]
    fn test_help() {
        let dir = TempDir::new().unwrap();
        taskboard(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("--demo"));
    }

    #[test]
    fn test_unknown_route_is_rejected() {
        let dir = TempDir::new().unwrap();
        taskboard(&dir)
            .args(["--route", "/settings"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown route"));
    }

    #[test]
    fn test_missing_credentials_fail_before_the_ui_starts() {
        let dir = TempDir::new().unwrap();
        taskboard(&dir)
            .assert()
            .failure()
            .stderr(predicate::str::contains("TASKBOARD_PROJECT_ID"));
    }
}
