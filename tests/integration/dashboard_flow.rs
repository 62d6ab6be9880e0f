//! End-to-end dashboard flows: session, permissions, task mutations and
//! summaries driven through the `Dashboard` service and the shell.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};

use taskflow::clock::FixedClock;
use taskflow::config::{AppConfig, SessionConfig, ViewConfig};
use taskflow::dashboard::{Dashboard, DashboardError};
use taskflow::session::SessionStore;
use taskflow::shell::{Flow, Shell};
use taskflow::storage::MemoryStore;
use taskflow::tasks::form::{FormError, TaskForm};
use taskflow::tasks::store::TaskStore;
use taskflow::tasks::views::TaskFilter;
use taskflow_proto::task::{TaskId, TaskPriority, TaskStatus};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn make_clock() -> Arc<FixedClock> {
    FixedClock::shared(Utc.with_ymd_and_hms(2024, 12, 27, 12, 0, 0).unwrap())
}

fn make_dashboard(slot: Arc<MemoryStore>) -> Dashboard<Arc<MemoryStore>> {
    let config = AppConfig {
        session: SessionConfig {
            login_delay: Duration::ZERO,
            ..SessionConfig::default()
        },
        ..AppConfig::default()
    };
    Dashboard::from_config(slot, make_clock(), &config)
}

fn form(title: &str, assignee: &str, due: &str) -> TaskForm {
    TaskForm {
        title: title.to_string(),
        assigned_to: assignee.to_string(),
        due_date: due.to_string(),
        ..TaskForm::default()
    }
}

// ===========================================================================
// Dashboard service
// ===========================================================================

#[tokio::test]
async fn manager_creates_task_for_user_who_then_completes_it() {
    let slot = Arc::new(MemoryStore::new());
    let mut dash = make_dashboard(slot.clone());

    assert!(dash.login("manager@taskflow.com", "password").await);
    let id = dash
        .create_task(&TaskForm {
            priority: TaskPriority::Critical,
            tags: "ops, , urgent".to_string(),
            ..form("Rotate keys", "3", "2024-12-29")
        })
        .unwrap();
    dash.logout();

    assert!(dash.login("user@taskflow.com", "password").await);
    let mine: Vec<TaskId> = dash
        .visible_tasks(&TaskFilter::default())
        .unwrap()
        .into_iter()
        .map(|t| t.id.clone())
        .collect();
    assert_eq!(mine, vec![TaskId::new("3"), id.clone()]);

    dash.set_status(&id, TaskStatus::Complete).unwrap();
    let task = dash.task(&id).unwrap();
    assert_eq!(task.status, TaskStatus::Complete);
    assert_eq!(task.tags, vec!["ops", "urgent"]);
    assert_eq!(task.created_by_name, "Manager User");

    let profile = dash.profile().unwrap();
    assert_eq!(profile.stats.total, 2);
    assert_eq!(profile.stats.completed, 1);
    assert_eq!(profile.recent[0].id, id);
}

#[tokio::test]
async fn admin_can_edit_any_task() {
    let mut dash = make_dashboard(Arc::new(MemoryStore::new()));
    dash.login("admin@taskflow.com", "password").await;

    let mut edit = TaskForm::from_task(dash.task(&TaskId::new("3")).unwrap());
    edit.assigned_to = "2".to_string();
    edit.status = TaskStatus::InProgress;
    dash.edit_task(&TaskId::new("3"), &edit).unwrap();

    let task = dash.task(&TaskId::new("3")).unwrap();
    assert_eq!(task.assigned_to_name, "Manager User");
    assert_eq!(task.status, TaskStatus::InProgress);
    assert!(task.updated_at > task.created_at);
}

#[tokio::test]
async fn edit_with_unknown_assignee_uses_placeholder_name() {
    let mut dash = make_dashboard(Arc::new(MemoryStore::new()));
    dash.login("admin@taskflow.com", "password").await;
    let id = dash.create_task(&form("Orphan", "42", "2025-01-02")).unwrap();
    assert_eq!(dash.task(&id).unwrap().assigned_to_name, "Unknown");
}

#[tokio::test]
async fn invalid_due_date_reaches_caller() {
    let mut dash = make_dashboard(Arc::new(MemoryStore::new()));
    dash.login("admin@taskflow.com", "password").await;
    let err = dash.create_task(&form("Bad", "1", "tomorrow")).unwrap_err();
    assert_eq!(
        err,
        DashboardError::Form(FormError::InvalidDueDate("tomorrow".to_string()))
    );
}

#[tokio::test]
async fn restart_keeps_session_but_reseeds_tasks() {
    let slot = Arc::new(MemoryStore::new());
    {
        let mut dash = make_dashboard(slot.clone());
        dash.login("admin@taskflow.com", "password").await;
        dash.remove_task(&TaskId::new("1")).unwrap();
        assert_eq!(dash.tasks().len(), 3);
    }

    let dash = make_dashboard(slot);
    assert_eq!(dash.current_user().unwrap().email, "admin@taskflow.com");
    assert_eq!(dash.tasks().len(), 4);
}

#[tokio::test]
async fn view_windows_come_from_config() {
    let session = SessionStore::restore(
        MemoryStore::new(),
        &SessionConfig {
            login_delay: Duration::ZERO,
            ..SessionConfig::default()
        },
    );
    let views = ViewConfig {
        due_soon_days: 1,
        upcoming_days: 2,
        recent_limit: 1,
    };
    let dash = Dashboard::new(session, TaskStore::seeded(make_clock()), views);
    dash.login("admin@taskflow.com", "password").await;

    let overview = dash.overview().unwrap();
    assert_eq!(overview.recent.len(), 1);
    // Only task 2 (due 12-28) falls inside a two-day window.
    let upcoming: Vec<&str> = overview.upcoming.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(upcoming, vec!["2"]);
    assert!(dash.is_due_soon(dash.tasks().get(&TaskId::new("2")).unwrap()));
}

// ===========================================================================
// Shell
// ===========================================================================

#[tokio::test]
async fn scripted_shell_session() {
    let dash = make_dashboard(Arc::new(MemoryStore::new()));
    let mut shell = Shell::new(dash, Vec::new());

    let script = [
        "login user@taskflow.com password",
        r#"add --title "Write changelog" --assignee 3 --due 2025-01-03 --priority low"#,
        "list --priority low",
        "status 1 complete",
        "logout",
        "whoami",
    ];
    for line in script {
        assert_eq!(shell.execute_line(line).await.unwrap(), Flow::Continue);
    }
    assert_eq!(shell.execute_line("quit").await.unwrap(), Flow::Quit);

    let output = String::from_utf8(shell.into_output()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[0], "Welcome, Regular User");
    assert!(lines[1].starts_with("Created task "));
    assert!(lines[2].contains("Write changelog | To Do | Low | due 2025-01-03"));
    assert_eq!(lines[3], "error: not allowed to modify task 1");
    assert_eq!(lines[4], "Logged out");
    assert_eq!(lines[5], "not logged in");
}
