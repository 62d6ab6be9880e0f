//! Line-oriented command shell over a [`Dashboard`].
//!
//! Each input line is tokenized (double or single quotes group words) and
//! parsed with clap into a [`ShellCommand`], then executed against the
//! dashboard. Output is plain text written to any [`Write`] sink. Command
//! errors are printed and never end the session.

use std::io::{self, Write};

use clap::{Args, Parser, Subcommand};

use taskflow_proto::task::{DUE_DATE_FORMAT, Task, TaskId, TaskPriority, TaskStats, TaskStatus};

use crate::dashboard::Dashboard;
use crate::storage::KeyValueStore;
use crate::tasks::form::TaskForm;
use crate::tasks::views::TaskFilter;

/// One parsed shell line.
#[derive(Parser, Debug)]
#[command(
    name = "taskflow",
    no_binary_name = true,
    disable_version_flag = true,
    help_template = "{subcommands}"
)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

/// Commands understood by the shell.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Log in with email and password.
    Login { email: String, password: String },
    /// Log out of the current session.
    Logout,
    /// Show the current identity.
    Whoami,
    /// List visible tasks.
    #[command(alias = "ls")]
    List {
        /// Case-insensitive text matched against title or description.
        #[arg(long, short)]
        search: Option<String>,
        /// Only tasks in this status.
        #[arg(long)]
        status: Option<TaskStatus>,
        /// Only tasks with this priority.
        #[arg(long)]
        priority: Option<TaskPriority>,
    },
    /// Show one task in detail.
    Show { id: String },
    /// Create a task.
    Add(TaskFields),
    /// Edit fields of an existing task.
    Edit {
        id: String,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Change the status of a task.
    Status { id: String, status: TaskStatus },
    /// Delete a task permanently.
    #[command(alias = "rm")]
    Delete { id: String },
    /// Statistics over all tasks.
    Stats,
    /// Dashboard overview.
    Dashboard,
    /// Profile of the current identity.
    Profile,
    /// Leave the shell.
    #[command(alias = "exit")]
    Quit,
}

impl ShellCommand {
    /// Copy safe to log: the login password is masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        match self {
            Self::Login { email, .. } => Self::Login {
                email: email.clone(),
                password: "***".to_string(),
            },
            other => other.clone(),
        }
    }
}

/// Task form fields. Unset fields keep their current value on edit and are
/// blank on create.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Assignee user ID.
    #[arg(long)]
    pub assignee: Option<String>,
    #[arg(long)]
    pub priority: Option<TaskPriority>,
    #[arg(long)]
    pub status: Option<TaskStatus>,
    /// Due date, YYYY-MM-DD.
    #[arg(long)]
    pub due: Option<String>,
    /// Comma-separated tags.
    #[arg(long)]
    pub tags: Option<String>,
}

impl TaskFields {
    /// Overlays the set fields onto `form`.
    fn apply_to(&self, mut form: TaskForm) -> TaskForm {
        if let Some(title) = &self.title {
            form.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            form.description.clone_from(description);
        }
        if let Some(assignee) = &self.assignee {
            form.assigned_to.clone_from(assignee);
        }
        if let Some(priority) = self.priority {
            form.priority = priority;
        }
        if let Some(status) = self.status {
            form.status = status;
        }
        if let Some(due) = &self.due {
            form.due_date.clone_from(due);
        }
        if let Some(tags) = &self.tags {
            form.tags.clone_from(tags);
        }
        form
    }
}

/// Whether the shell should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Interactive shell state: the dashboard plus an output sink.
pub struct Shell<S: KeyValueStore, W: Write> {
    dashboard: Dashboard<S>,
    out: W,
}

impl<S: KeyValueStore, W: Write> Shell<S, W> {
    /// Creates a shell writing to `out`.
    pub const fn new(dashboard: Dashboard<S>, out: W) -> Self {
        Self { dashboard, out }
    }

    /// The dashboard driven by this shell.
    pub const fn dashboard(&self) -> &Dashboard<S> {
        &self.dashboard
    }

    /// Consumes the shell, returning the output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Writes the input prompt.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the output sink fails.
    pub fn prompt(&mut self) -> io::Result<()> {
        let who = self
            .dashboard
            .current_user()
            .map_or_else(|| "guest".to_string(), |u| u.email);
        write!(self.out, "{who}> ")?;
        self.out.flush()
    }

    /// Parses and executes one input line.
    ///
    /// Blank lines are ignored. Parse and command errors are written to the
    /// output and do not end the session.
    ///
    /// # Errors
    ///
    /// Returns an I/O error only if the output sink fails.
    pub async fn execute_line(&mut self, line: &str) -> io::Result<Flow> {
        let words = match split_words(line) {
            Ok(words) => words,
            Err(e) => {
                writeln!(self.out, "error: {e}")?;
                return Ok(Flow::Continue);
            }
        };
        if words.is_empty() {
            return Ok(Flow::Continue);
        }

        match ShellLine::try_parse_from(words) {
            Ok(parsed) => self.execute(parsed.command).await,
            Err(e) => {
                write!(self.out, "{}", e.render())?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Executes a parsed command.
    ///
    /// # Errors
    ///
    /// Returns an I/O error only if the output sink fails.
    pub async fn execute(&mut self, command: ShellCommand) -> io::Result<Flow> {
        tracing::debug!(command = ?command.redacted(), "shell command");
        match command {
            ShellCommand::Login { email, password } => {
                if self.dashboard.login(&email, &password).await {
                    let name = self
                        .dashboard
                        .current_user()
                        .map(|u| u.name)
                        .unwrap_or_default();
                    writeln!(self.out, "Welcome, {name}")?;
                } else {
                    writeln!(self.out, "error: invalid email or password")?;
                }
            }
            ShellCommand::Logout => {
                self.dashboard.logout();
                writeln!(self.out, "Logged out")?;
            }
            ShellCommand::Whoami => match self.dashboard.current_user() {
                Some(user) => writeln!(
                    self.out,
                    "{} <{}> ({}) id {}",
                    user.name, user.email, user.role, user.id
                )?,
                None => writeln!(self.out, "not logged in")?,
            },
            ShellCommand::List {
                search,
                status,
                priority,
            } => {
                let filter = TaskFilter {
                    search: search.unwrap_or_default(),
                    status,
                    priority,
                };
                self.list(&filter)?;
            }
            ShellCommand::Show { id } => self.show(&TaskId::new(id))?,
            ShellCommand::Add(fields) => {
                let form = fields.apply_to(TaskForm::default());
                match self.dashboard.create_task(&form) {
                    Ok(id) => writeln!(self.out, "Created task {id}")?,
                    Err(e) => writeln!(self.out, "error: {e}")?,
                }
            }
            ShellCommand::Edit { id, fields } => self.edit(&TaskId::new(id), &fields)?,
            ShellCommand::Status { id, status } => {
                let id = TaskId::new(id);
                match self.dashboard.set_status(&id, status) {
                    Ok(()) => writeln!(self.out, "Task {id} is now {status}")?,
                    Err(e) => writeln!(self.out, "error: {e}")?,
                }
            }
            ShellCommand::Delete { id } => {
                let id = TaskId::new(id);
                match self.dashboard.remove_task(&id) {
                    Ok(()) => writeln!(self.out, "Deleted task {id}")?,
                    Err(e) => writeln!(self.out, "error: {e}")?,
                }
            }
            ShellCommand::Stats => {
                let stats = self.dashboard.stats();
                write_stats(&mut self.out, &stats)?;
            }
            ShellCommand::Dashboard => self.overview()?,
            ShellCommand::Profile => self.profile()?,
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn list(&mut self, filter: &TaskFilter) -> io::Result<()> {
        let lines: Vec<String> = match self.dashboard.visible_tasks(filter) {
            Ok(tasks) => tasks.into_iter().map(|t| self.summary(t)).collect(),
            Err(e) => return writeln!(self.out, "error: {e}"),
        };
        if lines.is_empty() {
            return writeln!(self.out, "No tasks found");
        }
        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }

    fn show(&mut self, id: &TaskId) -> io::Result<()> {
        let task = match self.dashboard.task(id) {
            Ok(task) => task.clone(),
            Err(e) => return writeln!(self.out, "error: {e}"),
        };
        let flag = self.deadline_flag(&task);
        let out = &mut self.out;
        writeln!(out, "[{}] {}", task.id, task.title)?;
        if !task.description.is_empty() {
            writeln!(out, "  {}", task.description)?;
        }
        writeln!(out, "  status:     {}", task.status)?;
        writeln!(out, "  priority:   {}", task.priority)?;
        writeln!(
            out,
            "  due:        {}{flag}",
            task.due_date.format(DUE_DATE_FORMAT)
        )?;
        writeln!(
            out,
            "  assignee:   {} ({})",
            task.assigned_to_name, task.assigned_to
        )?;
        writeln!(
            out,
            "  created by: {} ({})",
            task.created_by_name, task.created_by
        )?;
        if !task.tags.is_empty() {
            writeln!(out, "  tags:       {}", task.tags.join(", "))?;
        }
        writeln!(out, "  created:    {}", task.created_at.to_rfc3339())?;
        writeln!(out, "  updated:    {}", task.updated_at.to_rfc3339())
    }

    fn edit(&mut self, id: &TaskId, fields: &TaskFields) -> io::Result<()> {
        let current = match self.dashboard.task(id) {
            Ok(task) => TaskForm::from_task(task),
            Err(e) => return writeln!(self.out, "error: {e}"),
        };
        let form = fields.apply_to(current);
        match self.dashboard.edit_task(id, &form) {
            Ok(()) => writeln!(self.out, "Updated task {id}"),
            Err(e) => writeln!(self.out, "error: {e}"),
        }
    }

    fn overview(&mut self) -> io::Result<()> {
        let overview = match self.dashboard.overview() {
            Ok(o) => o,
            Err(e) => return writeln!(self.out, "error: {e}"),
        };
        write_stats(&mut self.out, &overview.stats)?;

        let priorities: Vec<String> = TaskPriority::ALL
            .iter()
            .map(|p| format!("{p} {}", overview.priorities.get(*p)))
            .collect();
        writeln!(self.out, "By priority: {}", priorities.join(", "))?;
        writeln!(
            self.out,
            "By status: {} {}, {} {}, {} {}",
            TaskStatus::ToDo,
            overview.statuses.to_do,
            TaskStatus::InProgress,
            overview.statuses.in_progress,
            TaskStatus::Complete,
            overview.statuses.complete
        )?;

        let recent: Vec<String> = overview.recent.iter().map(|t| self.summary(t)).collect();
        self.section("Recent tasks", &recent, "No tasks yet")?;
        let upcoming: Vec<String> = overview.upcoming.iter().map(|t| self.summary(t)).collect();
        self.section("Upcoming deadlines", &upcoming, "No upcoming deadlines")
    }

    fn profile(&mut self) -> io::Result<()> {
        let profile = match self.dashboard.profile() {
            Ok(p) => p,
            Err(e) => return writeln!(self.out, "error: {e}"),
        };
        let identity = &profile.identity;
        writeln!(
            self.out,
            "{} <{}> ({})",
            identity.name, identity.email, identity.role
        )?;
        write_stats(&mut self.out, &profile.stats)?;
        let recent: Vec<String> = profile.recent.iter().map(|t| self.summary(t)).collect();
        self.section("Recent assigned tasks", &recent, "No tasks assigned")
    }

    fn section(&mut self, title: &str, lines: &[String], empty: &str) -> io::Result<()> {
        writeln!(self.out, "{title}:")?;
        if lines.is_empty() {
            return writeln!(self.out, "  {empty}");
        }
        for line in lines {
            writeln!(self.out, "  {line}")?;
        }
        Ok(())
    }

    fn summary(&self, task: &Task) -> String {
        format!(
            "[{}] {} | {} | {} | due {}{} | {}",
            task.id,
            task.title,
            task.status,
            task.priority,
            task.due_date.format(DUE_DATE_FORMAT),
            self.deadline_flag(task),
            task.assigned_to_name
        )
    }

    fn deadline_flag(&self, task: &Task) -> &'static str {
        if self.dashboard.is_overdue(task) {
            " (overdue)"
        } else if self.dashboard.is_due_soon(task) {
            " (due soon)"
        } else {
            ""
        }
    }
}

fn write_stats(out: &mut impl Write, stats: &TaskStats) -> io::Result<()> {
    writeln!(
        out,
        "Total {} | To Do {} | In Progress {} | Completed {} | Overdue {} | {}% complete",
        stats.total,
        stats.to_do(),
        stats.in_progress,
        stats.completed,
        stats.overdue,
        stats.completion_percent()
    )
}

/// Errors from splitting a shell line into words.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SplitError {
    #[error("unterminated quote")]
    UnterminatedQuote,
}

/// Splits a line on whitespace. Single or double quotes group words; there
/// are no escapes.
///
/// # Errors
///
/// Returns [`SplitError::UnterminatedQuote`] if a quote is left open.
pub fn split_words(line: &str) -> Result<Vec<String>, SplitError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(SplitError::UnterminatedQuote);
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
