//! Task store: the owning container of the task collection.
//!
//! `TaskStore` is the only writer of the collection. Every effective
//! mutation bumps a revision number published on a `watch` channel so
//! consumers know when to re-read.

use chrono::{DateTime, Duration, Utc};
use tokio::sync::watch;

use taskflow_proto::identity::UserId;
use taskflow_proto::task::{NewTask, Task, TaskId, TaskPatch, TaskStats};

use super::seed::sample_tasks;
use super::views::stats_for;
use crate::clock::SharedClock;

/// Owns the task collection, in insertion order.
pub struct TaskStore {
    tasks: Vec<Task>,
    clock: SharedClock,
    revision: watch::Sender<u64>,
}

impl TaskStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(clock: SharedClock) -> Self {
        Self::with_tasks(clock, Vec::new())
    }

    /// Creates a store populated with the sample task set.
    #[must_use]
    pub fn seeded(clock: SharedClock) -> Self {
        Self::with_tasks(clock, sample_tasks())
    }

    /// Creates a store over an existing collection.
    #[must_use]
    pub fn with_tasks(clock: SharedClock, tasks: Vec<Task>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            tasks,
            clock,
            revision,
        }
    }

    /// Appends a new task and returns its freshly assigned ID.
    ///
    /// `created_at` and `updated_at` are both set to the current time. The
    /// payload is not validated.
    pub fn add_task(&mut self, new: NewTask) -> TaskId {
        let id = self.unused_id();
        let now = self.clock.now();
        let task = Task::from_new(id.clone(), new, now);
        tracing::debug!(task = %id, title = %task.title, "task added");
        self.tasks.push(task);
        self.bump();
        id
    }

    /// Merges `patch` into the task with `id` and refreshes `updated_at`.
    ///
    /// Unknown IDs are ignored. Returns whether a task was updated.
    pub fn update_task(&mut self, id: &TaskId, patch: TaskPatch) -> bool {
        let now = self.clock.now();
        let Some(task) = self.tasks.iter_mut().find(|t| &t.id == id) else {
            tracing::debug!(task = %id, "update ignored: unknown task");
            return false;
        };

        task.apply_patch(patch);
        task.updated_at = next_update_time(task.updated_at, now);
        tracing::debug!(task = %id, status = %task.status, "task updated");
        self.bump();
        true
    }

    /// Permanently removes the task with `id`.
    ///
    /// Unknown IDs are ignored. Returns whether a task was removed.
    pub fn delete_task(&mut self, id: &TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| &t.id != id);
        let removed = self.tasks.len() != before;
        if removed {
            tracing::debug!(task = %id, "task deleted");
            self.bump();
        } else {
            tracing::debug!(task = %id, "delete ignored: unknown task");
        }
        removed
    }

    /// Tasks assigned to `user`, in collection order.
    #[must_use]
    pub fn get_tasks_by_user(&self, user: &UserId) -> Vec<&Task> {
        self.tasks.iter().filter(|t| &t.assigned_to == user).collect()
    }

    /// Aggregate counts over the whole collection, computed fresh each call.
    #[must_use]
    pub fn get_tasks_stats(&self) -> TaskStats {
        stats_for(self.tasks.iter(), self.clock.now())
    }

    /// The full collection, in insertion order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Looks up a task by ID.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// The current time according to the store's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Current revision; increases by one per effective mutation.
    #[must_use]
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Subscribes to revision changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn unused_id(&self) -> TaskId {
        loop {
            let id = TaskId::generate();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn bump(&self) {
        self.revision.send_modify(|r| *r += 1);
    }
}

/// Picks the new `updated_at`: the clock reading, or one millisecond past
/// the previous value if the clock has not moved beyond it.
fn next_update_time(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}
