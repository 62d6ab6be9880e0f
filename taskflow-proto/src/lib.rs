//! Shared data model for `TaskFlow`.

pub mod codec;
pub mod identity;
pub mod task;
