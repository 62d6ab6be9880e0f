//! Derived read-views over a task collection.
//!
//! Pure functions: they take tasks plus an explicit `now` and never touch
//! store state, so callers decide which clock applies.

use chrono::{DateTime, Duration, Utc};

use taskflow_proto::identity::Identity;
use taskflow_proto::task::{PriorityBreakdown, Task, TaskPriority, TaskStats, TaskStatus};

/// Default width of the "due soon" warning window.
pub const DUE_SOON_DAYS: i64 = 3;

/// Default width of the "upcoming deadlines" window.
pub const UPCOMING_DAYS: i64 = 7;

/// Default length of recent-activity listings.
pub const RECENT_LIMIT: usize = 5;

/// Whether `identity` may see `task`: admins see everything, everyone else
/// sees tasks they are assigned to or created.
#[must_use]
pub fn can_view(task: &Task, identity: &Identity) -> bool {
    identity.is_admin() || task.involves(&identity.id)
}

/// Whether `identity` may edit or delete `task`. Same actor set as
/// [`can_view`].
#[must_use]
pub fn can_edit(task: &Task, identity: &Identity) -> bool {
    identity.is_admin() || task.created_by == identity.id || task.assigned_to == identity.id
}

/// Tasks visible to `identity`, in collection order.
pub fn visible_to<'a>(tasks: &'a [Task], identity: &Identity) -> Vec<&'a Task> {
    tasks.iter().filter(|t| can_view(t, identity)).collect()
}

/// Not complete and past its due instant.
#[must_use]
pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    task.is_overdue(now)
}

/// Not complete, and due strictly inside `(now, now + days)`.
///
/// A window end past the representable range is clamped to it.
#[must_use]
pub fn is_due_within(task: &Task, now: DateTime<Utc>, days: i64) -> bool {
    let due = task.due_instant();
    !task.is_complete() && due > now && due < window_end(now, days)
}

fn window_end(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    Duration::try_days(days)
        .and_then(|width| now.checked_add_signed(width))
        .unwrap_or(if days > 0 {
            DateTime::<Utc>::MAX_UTC
        } else {
            DateTime::<Utc>::MIN_UTC
        })
}

/// Due within the next three days and not complete.
#[must_use]
pub fn is_due_soon(task: &Task, now: DateTime<Utc>) -> bool {
    is_due_within(task, now, DUE_SOON_DAYS)
}

/// Due within the next seven days and not complete.
#[must_use]
pub fn is_upcoming(task: &Task, now: DateTime<Utc>) -> bool {
    is_due_within(task, now, UPCOMING_DAYS)
}

/// Search and filter criteria of the task list. `None` means "All".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Case-insensitive substring matched against title or description.
    pub search: String,
    /// Only tasks in this status.
    pub status: Option<TaskStatus>,
    /// Only tasks with this priority.
    pub priority: Option<TaskPriority>,
}

impl TaskFilter {
    /// Whether `task` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = needle.is_empty()
            || task.title.to_lowercase().contains(&needle)
            || task.description.to_lowercase().contains(&needle);

        matches_search
            && self.status.is_none_or(|s| task.status == s)
            && self.priority.is_none_or(|p| task.priority == p)
    }
}

/// Tasks that match `filter` and are visible to `identity`.
pub fn filter_tasks<'a>(
    tasks: &'a [Task],
    identity: &Identity,
    filter: &TaskFilter,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| filter.matches(t) && can_view(t, identity))
        .collect()
}

/// The `limit` most recently updated tasks, newest first.
pub fn recent_tasks<'a, I>(tasks: I, limit: usize) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut sorted: Vec<&Task> = tasks.into_iter().collect();
    sorted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    sorted.truncate(limit);
    sorted
}

/// Incomplete tasks due within `days`, soonest first.
pub fn upcoming_deadlines<'a, I>(tasks: I, now: DateTime<Utc>, days: i64) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut upcoming: Vec<&Task> = tasks
        .into_iter()
        .filter(|t| is_due_within(t, now, days))
        .collect();
    upcoming.sort_by_key(|t| t.due_date);
    upcoming
}

/// Aggregate counts over any subset of tasks.
pub fn stats_for<'a, I>(tasks: I, now: DateTime<Utc>) -> TaskStats
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .fold(TaskStats::default(), |mut stats, task| {
            stats.total += 1;
            match task.status {
                TaskStatus::Complete => stats.completed += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::ToDo => {}
            }
            if is_overdue(task, now) {
                stats.overdue += 1;
            }
            stats
        })
}

/// Task counts per priority.
pub fn priority_breakdown<'a, I>(tasks: I) -> PriorityBreakdown
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .fold(PriorityBreakdown::default(), |mut acc, task| {
            match task.priority {
                TaskPriority::Critical => acc.critical += 1,
                TaskPriority::High => acc.high += 1,
                TaskPriority::Medium => acc.medium += 1,
                TaskPriority::Low => acc.low += 1,
            }
            acc
        })
}
