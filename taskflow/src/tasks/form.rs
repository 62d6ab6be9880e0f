//! Caller-side task form validation.
//!
//! The task store performs no validation. Raw form input is checked here
//! and turned into a [`NewTask`] or [`TaskPatch`]; on failure the store is
//! never invoked.

use chrono::NaiveDate;

use taskflow_proto::identity::{Identity, UserId};
use taskflow_proto::task::{DUE_DATE_FORMAT, NewTask, Task, TaskPatch, TaskPriority, TaskStatus};

use crate::session::Directory;

/// Reasons a task form is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// A required field is blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    /// The due date is not a `YYYY-MM-DD` calendar date.
    #[error("invalid due date {0:?} (expected YYYY-MM-DD)")]
    InvalidDueDate(String),
}

/// Raw task input as entered by a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    /// Assignee user ID.
    pub assigned_to: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    /// Due date as typed, `YYYY-MM-DD`.
    pub due_date: String,
    /// Comma-separated tags.
    pub tags: String,
}

impl TaskForm {
    /// Pre-fills a form from an existing task for editing.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            assigned_to: task.assigned_to.to_string(),
            priority: task.priority,
            status: task.status,
            due_date: task.due_date.format(DUE_DATE_FORMAT).to_string(),
            tags: task.tags.join(", "),
        }
    }

    /// Validates the form and builds a creation payload authored by `author`.
    ///
    /// Title, assignee and due date are required. The assignee's display
    /// name is resolved through `directory` (`"Unknown"` on a miss).
    ///
    /// # Errors
    ///
    /// Returns [`FormError`] if a required field is blank or the due date
    /// does not parse.
    pub fn validate(&self, author: &Identity, directory: &Directory) -> Result<NewTask, FormError> {
        let (assigned_to, due_date) = self.check_required()?;
        let assigned_to_name = directory.display_name(&assigned_to).to_string();

        Ok(NewTask {
            title: self.title.clone(),
            description: self.description.clone(),
            assigned_to,
            assigned_to_name,
            created_by: author.id.clone(),
            created_by_name: author.name.clone(),
            priority: self.priority,
            status: self.status,
            due_date,
            tags: parse_tags(&self.tags),
        })
    }

    /// Validates the form and builds an edit patch authored by `author`.
    ///
    /// The patch carries every form field, like a full re-submit of the edit
    /// form, including the editor as `created_by`.
    ///
    /// # Errors
    ///
    /// Same as [`validate`](Self::validate).
    pub fn to_patch(&self, author: &Identity, directory: &Directory) -> Result<TaskPatch, FormError> {
        let new = self.validate(author, directory)?;
        Ok(TaskPatch {
            title: Some(new.title),
            description: Some(new.description),
            assigned_to: Some(new.assigned_to),
            assigned_to_name: Some(new.assigned_to_name),
            created_by: Some(new.created_by),
            created_by_name: Some(new.created_by_name),
            priority: Some(new.priority),
            status: Some(new.status),
            due_date: Some(new.due_date),
            tags: Some(new.tags),
        })
    }

    fn check_required(&self) -> Result<(UserId, NaiveDate), FormError> {
        if self.title.trim().is_empty() {
            return Err(FormError::MissingField("title"));
        }
        let assignee = self.assigned_to.trim();
        if assignee.is_empty() {
            return Err(FormError::MissingField("assigned_to"));
        }
        let due = self.due_date.trim();
        if due.is_empty() {
            return Err(FormError::MissingField("due_date"));
        }
        let due_date = NaiveDate::parse_from_str(due, DUE_DATE_FORMAT)
            .map_err(|_| FormError::InvalidDueDate(due.to_string()))?;
        Ok((UserId::new(assignee), due_date))
    }
}

/// Splits a comma-separated tag list, trimming and dropping empty entries.
/// Order and duplicates are preserved.
#[must_use]
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .collect()
}
