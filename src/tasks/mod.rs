//! # Task abstractions.
//!
//! This module provides the core task-related types:
//! - [`AsyncTask`] - cancellable unit of async work with one terminal outcome
//! - [`TaskContext`] - handle given to task work (token + adoption of children)
//! - [`TaskState`] - `Pending`, `Resolved`, `Failed` or `Cancelled`
//! - [`TaskId`] - opaque per-invocation identity

mod runner;
mod state;
mod task;

pub use state::{TaskId, TaskState};
pub use task::{AsyncTask, Callback, TaskContext};
