//! Dashboard service: the single owner of both stores.
//!
//! Created once at startup and handed to consumers explicitly. Adds the
//! permission and authentication checks the UI performed around raw store
//! calls, and assembles the read models shown on the dashboard and profile
//! screens.

use taskflow_proto::identity::Identity;
use taskflow_proto::task::{
    PriorityBreakdown, StatusBreakdown, Task, TaskId, TaskPatch, TaskStats, TaskStatus,
};

use crate::clock::SharedClock;
use crate::config::{AppConfig, ViewConfig};
use crate::session::{Directory, SessionStore};
use crate::storage::KeyValueStore;
use crate::tasks::form::{FormError, TaskForm};
use crate::tasks::store::TaskStore;
use crate::tasks::views::{self, TaskFilter};

/// Errors reported to dashboard consumers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DashboardError {
    /// No identity is logged in.
    #[error("not logged in")]
    NotAuthenticated,
    /// The current identity may not modify this task.
    #[error("not allowed to modify task {0}")]
    Forbidden(TaskId),
    /// No visible task has this ID.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    /// The task form was rejected.
    #[error(transparent)]
    Form(#[from] FormError),
}

/// Dashboard summary for the current identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overview {
    /// Counts over the whole collection.
    pub stats: TaskStats,
    /// Per-priority counts over the whole collection.
    pub priorities: PriorityBreakdown,
    /// Per-status counts over the whole collection.
    pub statuses: StatusBreakdown,
    /// Most recently updated visible tasks.
    pub recent: Vec<Task>,
    /// Visible tasks due within the upcoming window, soonest first.
    pub upcoming: Vec<Task>,
}

/// Profile summary: the identity plus statistics over tasks assigned to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub identity: Identity,
    pub stats: TaskStats,
    pub recent: Vec<Task>,
}

/// Owns the session and task stores.
pub struct Dashboard<S: KeyValueStore> {
    session: SessionStore<S>,
    tasks: TaskStore,
    directory: Directory,
    views: ViewConfig,
}

impl<S: KeyValueStore> Dashboard<S> {
    /// Builds the service from its parts.
    pub fn new(session: SessionStore<S>, tasks: TaskStore, views: ViewConfig) -> Self {
        let directory = Directory::from_identities(session.credentials().entries());
        Self {
            session,
            tasks,
            directory,
            views,
        }
    }

    /// Builds the service from resolved configuration.
    pub fn from_config(slot: S, clock: SharedClock, config: &AppConfig) -> Self {
        let session = SessionStore::restore(slot, &config.session);
        let tasks = if config.seed {
            TaskStore::seeded(clock)
        } else {
            TaskStore::new(clock)
        };
        Self::new(session, tasks, config.views)
    }

    /// The task store.
    #[must_use]
    pub const fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    /// Attempts to log in. See [`SessionStore::login`].
    pub async fn login(&self, email: &str, password: &str) -> bool {
        self.session.login(email, password).await
    }

    /// Logs out. See [`SessionStore::logout`].
    pub fn logout(&self) {
        self.session.logout();
    }

    /// The current identity, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<Identity> {
        self.session.current_user()
    }

    /// Tasks visible to the current identity that match `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NotAuthenticated`] when logged out.
    pub fn visible_tasks(&self, filter: &TaskFilter) -> Result<Vec<&Task>, DashboardError> {
        let user = self.require_user()?;
        Ok(views::filter_tasks(self.tasks.tasks(), &user, filter))
    }

    /// Looks up a task visible to the current identity.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NotAuthenticated`] when logged out, or
    /// [`DashboardError::TaskNotFound`] if the task does not exist or is not
    /// visible.
    pub fn task(&self, id: &TaskId) -> Result<&Task, DashboardError> {
        let user = self.require_user()?;
        self.tasks
            .get(id)
            .filter(|t| views::can_view(t, &user))
            .ok_or_else(|| DashboardError::TaskNotFound(id.clone()))
    }

    /// Validates `form` and creates a task authored by the current identity.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NotAuthenticated`] when logged out, or
    /// [`DashboardError::Form`] if validation fails (the store is untouched).
    pub fn create_task(&mut self, form: &TaskForm) -> Result<TaskId, DashboardError> {
        let user = self.require_user()?;
        let new = form.validate(&user, &self.directory)?;
        Ok(self.tasks.add_task(new))
    }

    /// Replaces the editable fields of a task from `form`.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError`] if logged out, the task is unknown, the
    /// identity may not edit it, or the form is invalid.
    pub fn edit_task(&mut self, id: &TaskId, form: &TaskForm) -> Result<(), DashboardError> {
        let user = self.require_editable(id)?;
        let patch = form.to_patch(&user, &self.directory)?;
        self.tasks.update_task(id, patch);
        Ok(())
    }

    /// Changes only the status of a task.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError`] if logged out, the task is unknown, or the
    /// identity may not edit it.
    pub fn set_status(&mut self, id: &TaskId, status: TaskStatus) -> Result<(), DashboardError> {
        self.require_editable(id)?;
        self.tasks.update_task(id, TaskPatch::status(status));
        Ok(())
    }

    /// Permanently deletes a task.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError`] if logged out, the task is unknown, or the
    /// identity may not edit it.
    pub fn remove_task(&mut self, id: &TaskId) -> Result<(), DashboardError> {
        self.require_editable(id)?;
        self.tasks.delete_task(id);
        Ok(())
    }

    /// Aggregate statistics over the whole collection.
    #[must_use]
    pub fn stats(&self) -> TaskStats {
        self.tasks.get_tasks_stats()
    }

    /// Dashboard summary for the current identity.
    ///
    /// Statistics and breakdowns cover the whole collection; the recent and
    /// upcoming lists are limited to tasks the identity can see.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NotAuthenticated`] when logged out.
    pub fn overview(&self) -> Result<Overview, DashboardError> {
        let user = self.require_user()?;
        let now = self.tasks.now();
        let all = self.tasks.tasks();
        let visible = views::visible_to(all, &user);
        let stats = self.tasks.get_tasks_stats();

        Ok(Overview {
            stats,
            priorities: views::priority_breakdown(all),
            statuses: StatusBreakdown::from(stats),
            recent: views::recent_tasks(visible.iter().copied(), self.views.recent_limit)
                .into_iter()
                .cloned()
                .collect(),
            upcoming: views::upcoming_deadlines(visible, now, self.views.upcoming_days)
                .into_iter()
                .cloned()
                .collect(),
        })
    }

    /// Profile summary over tasks assigned to the current identity.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NotAuthenticated`] when logged out.
    pub fn profile(&self) -> Result<Profile, DashboardError> {
        let identity = self.require_user()?;
        let assigned = self.tasks.get_tasks_by_user(&identity.id);
        let stats = views::stats_for(assigned.iter().copied(), self.tasks.now());
        let recent = views::recent_tasks(assigned, self.views.recent_limit)
            .into_iter()
            .cloned()
            .collect();
        Ok(Profile {
            identity,
            stats,
            recent,
        })
    }

    /// Whether `task` is due inside the warning window at the store's time.
    #[must_use]
    pub fn is_due_soon(&self, task: &Task) -> bool {
        views::is_due_within(task, self.tasks.now(), self.views.due_soon_days)
    }

    /// Whether `task` is overdue at the store's time.
    #[must_use]
    pub fn is_overdue(&self, task: &Task) -> bool {
        task.is_overdue(self.tasks.now())
    }

    fn require_user(&self) -> Result<Identity, DashboardError> {
        self.session
            .current_user()
            .ok_or(DashboardError::NotAuthenticated)
    }

    fn require_editable(&self, id: &TaskId) -> Result<Identity, DashboardError> {
        let user = self.require_user()?;
        let task = self
            .tasks
            .get(id)
            .ok_or_else(|| DashboardError::TaskNotFound(id.clone()))?;
        if !views::can_edit(task, &user) {
            tracing::info!(user = %user.id, task = %id, "edit denied");
            return Err(DashboardError::Forbidden(id.clone()));
        }
        Ok(user)
    }
}
