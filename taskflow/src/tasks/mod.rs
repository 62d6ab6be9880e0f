//! Task collection management for `TaskFlow`.
//!
//! [`TaskStore`] owns the collection and its CRUD operations; [`views`]
//! holds the derived read-views (visibility, filtering, deadlines,
//! statistics); [`form`] validates raw caller input before it reaches the
//! store.

pub mod form;
pub mod seed;
pub mod store;
pub mod views;

pub use form::{FormError, TaskForm, parse_tags};
pub use store::TaskStore;
pub use views::{TaskFilter, can_edit, can_view, filter_tasks, stats_for};
