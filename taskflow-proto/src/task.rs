//! Task model types.
//!
//! Defines the [`Task`] record, its enums, the creation payload
//! ([`NewTask`]), the partial-update payload ([`TaskPatch`]) and the
//! aggregate statistics value types derived from a task collection.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::{ParseEnumError, UserId};

/// Date format used for due dates (`YYYY-MM-DD`).
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Unique identifier for a task, immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generates a fresh time-ordered identifier (UUID v7).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Wraps an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this task ID.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Task priority, ordered from least to most urgent.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum TaskPriority {
    /// Can wait.
    Low,
    /// Default priority for new tasks.
    #[default]
    Medium,
    /// Should be picked up soon.
    High,
    /// Blocks other work.
    Critical,
}

impl TaskPriority {
    /// Every priority, most urgent first (dashboard breakdown order).
    pub const ALL: [Self; 4] = [Self::Critical, Self::High, Self::Medium, Self::Low];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskPriority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(ParseEnumError {
                kind: "priority",
                value: s.to_string(),
            }),
        }
    }
}

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Not started.
    #[default]
    #[serde(rename = "To Do")]
    ToDo,
    /// Actively being worked on.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Done. Complete tasks are never overdue.
    Complete,
}

impl TaskStatus {
    /// Every status, in workflow order.
    pub const ALL: [Self; 3] = [Self::ToDo, Self::InProgress, Self::Complete];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ToDo => "To Do",
            Self::InProgress => "In Progress",
            Self::Complete => "Complete",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "todo" => Ok(Self::ToDo),
            "inprogress" => Ok(Self::InProgress),
            "complete" | "completed" | "done" => Ok(Self::Complete),
            _ => Err(ParseEnumError {
                kind: "status",
                value: s.to_string(),
            }),
        }
    }
}

/// A unit of trackable work.
///
/// `assigned_to_name` and `created_by_name` are display copies taken when
/// the task was written; they are not kept in sync with the identity table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique, immutable identifier.
    pub id: TaskId,
    /// Short summary.
    pub title: String,
    /// Free-form details.
    pub description: String,
    /// Assignee reference (lookup only, not enforced).
    pub assigned_to: UserId,
    /// Assignee display name at write time.
    pub assigned_to_name: String,
    /// Creator reference (lookup only, not enforced).
    pub created_by: UserId,
    /// Creator display name at write time.
    pub created_by_name: String,
    /// Urgency.
    pub priority: TaskPriority,
    /// Workflow status.
    pub status: TaskStatus,
    /// Calendar due date.
    pub due_date: NaiveDate,
    /// Ordered labels, duplicates allowed.
    pub tags: Vec<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time, never earlier than `created_at`.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Builds a task from a creation payload.
    #[must_use]
    pub fn from_new(id: TaskId, new: NewTask, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title,
            description: new.description,
            assigned_to: new.assigned_to,
            assigned_to_name: new.assigned_to_name,
            created_by: new.created_by,
            created_by_name: new.created_by_name,
            priority: new.priority,
            status: new.status,
            due_date: new.due_date,
            tags: new.tags,
            created_at: now,
            updated_at: now,
        }
    }

    /// The moment the task falls due: midnight UTC at the start of `due_date`.
    #[must_use]
    pub fn due_instant(&self) -> DateTime<Utc> {
        self.due_date.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    /// Whether the task is complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == TaskStatus::Complete
    }

    /// Whether the task is past due and not complete at `now`.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_complete() && self.due_instant() < now
    }

    /// Whether `user` is the assignee or the creator.
    #[must_use]
    pub fn involves(&self, user: &UserId) -> bool {
        &self.assigned_to == user || &self.created_by == user
    }

    /// Merges every field present in `patch` into this task.
    ///
    /// Does not touch `id`, `created_at` or `updated_at`; the caller owns
    /// timestamp bookkeeping.
    pub fn apply_patch(&mut self, patch: TaskPatch) {
        let TaskPatch {
            title,
            description,
            assigned_to,
            assigned_to_name,
            created_by,
            created_by_name,
            priority,
            status,
            due_date,
            tags,
        } = patch;

        if let Some(v) = title {
            self.title = v;
        }
        if let Some(v) = description {
            self.description = v;
        }
        if let Some(v) = assigned_to {
            self.assigned_to = v;
        }
        if let Some(v) = assigned_to_name {
            self.assigned_to_name = v;
        }
        if let Some(v) = created_by {
            self.created_by = v;
        }
        if let Some(v) = created_by_name {
            self.created_by_name = v;
        }
        if let Some(v) = priority {
            self.priority = v;
        }
        if let Some(v) = status {
            self.status = v;
        }
        if let Some(v) = due_date {
            self.due_date = v;
        }
        if let Some(v) = tags {
            self.tags = v;
        }
    }
}

/// Creation payload: every [`Task`] field except those the store assigns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    /// Short summary.
    pub title: String,
    /// Free-form details.
    pub description: String,
    /// Assignee reference.
    pub assigned_to: UserId,
    /// Assignee display name.
    pub assigned_to_name: String,
    /// Creator reference.
    pub created_by: UserId,
    /// Creator display name.
    pub created_by_name: String,
    /// Urgency.
    pub priority: TaskPriority,
    /// Initial status.
    pub status: TaskStatus,
    /// Calendar due date.
    pub due_date: NaiveDate,
    /// Ordered labels.
    pub tags: Vec<String>,
}

/// Partial update. `None` leaves the field unchanged.
///
/// There are deliberately no `id`, `created_at` or `updated_at` members.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<UserId>,
    pub assigned_to_name: Option<String>,
    pub created_by: Option<UserId>,
    pub created_by_name: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<NaiveDate>,
    pub tags: Option<Vec<String>>,
}

impl TaskPatch {
    /// A patch that only changes the status.
    #[must_use]
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Aggregate counts over a task collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    /// Not complete and past due.
    pub overdue: usize,
}

impl TaskStats {
    /// Counts tasks in [`TaskStatus::ToDo`].
    #[must_use]
    pub const fn to_do(&self) -> usize {
        self.total
            .saturating_sub(self.completed)
            .saturating_sub(self.in_progress)
    }

    /// Completion ratio in percent, rounded down. Zero for an empty set.
    #[must_use]
    pub const fn completion_percent(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.completed * 100 / self.total
        }
    }
}

/// Task counts per priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityBreakdown {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl PriorityBreakdown {
    /// Count for a single priority.
    #[must_use]
    pub const fn get(&self, priority: TaskPriority) -> usize {
        match priority {
            TaskPriority::Critical => self.critical,
            TaskPriority::High => self.high,
            TaskPriority::Medium => self.medium,
            TaskPriority::Low => self.low,
        }
    }
}

/// Task counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBreakdown {
    pub to_do: usize,
    pub in_progress: usize,
    pub complete: usize,
}

impl From<TaskStats> for StatusBreakdown {
    fn from(stats: TaskStats) -> Self {
        Self {
            to_do: stats.to_do(),
            in_progress: stats.in_progress,
            complete: stats.completed,
        }
    }
}
