//! Fixed sample task set loaded at startup for demonstration.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use taskflow_proto::identity::UserId;
use taskflow_proto::task::{Task, TaskId, TaskPriority, TaskStatus};

/// Returns the four sample tasks, in display order.
#[must_use]
pub fn sample_tasks() -> Vec<Task> {
    vec![
        sample(
            "1",
            "Setup Project Architecture",
            "Initialize the project structure with proper folder organization",
            ("1", "Admin User"),
            ("2", "Manager User"),
            TaskPriority::High,
            TaskStatus::Complete,
            (2024, 12, 25),
            &["setup", "architecture"],
            (2024, 12, 20),
            (2024, 12, 23),
        ),
        sample(
            "2",
            "Implement User Authentication",
            "Add JWT-based authentication system with role management",
            ("2", "Manager User"),
            ("1", "Admin User"),
            TaskPriority::Critical,
            TaskStatus::InProgress,
            (2024, 12, 28),
            &["auth", "security"],
            (2024, 12, 21),
            (2024, 12, 29),
        ),
        sample(
            "3",
            "Design Task Dashboard",
            "Create responsive dashboard with charts and task overview",
            ("3", "Regular User"),
            ("2", "Manager User"),
            TaskPriority::Medium,
            TaskStatus::ToDo,
            (2024, 12, 31),
            &["ui", "dashboard"],
            (2024, 12, 22),
            (2024, 12, 22),
        ),
        sample(
            "4",
            "API Integration Testing",
            "Test all API endpoints and ensure proper error handling",
            ("1", "Admin User"),
            ("1", "Admin User"),
            TaskPriority::High,
            TaskStatus::ToDo,
            (2024, 12, 26),
            &["testing", "api"],
            (2024, 12, 23),
            (2024, 12, 23),
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn sample(
    id: &str,
    title: &str,
    description: &str,
    assignee: (&str, &str),
    creator: (&str, &str),
    priority: TaskPriority,
    status: TaskStatus,
    due: (i32, u32, u32),
    tags: &[&str],
    created: (i32, u32, u32),
    updated: (i32, u32, u32),
) -> Task {
    Task {
        id: TaskId::new(id),
        title: title.to_string(),
        description: description.to_string(),
        assigned_to: UserId::new(assignee.0),
        assigned_to_name: assignee.1.to_string(),
        created_by: UserId::new(creator.0),
        created_by_name: creator.1.to_string(),
        priority,
        status,
        due_date: date(due),
        tags: tags.iter().map(ToString::to_string).collect(),
        created_at: midnight(created),
        updated_at: midnight(updated),
    }
}

fn date((y, m, d): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn midnight(ymd: (i32, u32, u32)) -> DateTime<Utc> {
    date(ymd).and_time(NaiveTime::MIN).and_utc()
}
