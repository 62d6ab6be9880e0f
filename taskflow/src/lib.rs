//! `TaskFlow` — task management dashboard core.
//!
//! A session store holding the authenticated identity, a task store owning
//! the task collection, and the derived views a dashboard shows over them.

pub mod clock;
pub mod config;
pub mod dashboard;
pub mod session;
pub mod shell;
pub mod storage;
pub mod tasks;
