//! # Task identity and terminal states.
//!
//! Every [`AsyncTask`](crate::AsyncTask) carries a [`TaskId`] and exactly one [`TaskState`].
//!
//! ## State machine
//! ```text
//!            ┌──► Resolved(value)
//! Pending ───┼──► Failed(error)
//!            └──► Cancelled
//! ```
//!
//! ## Rules
//! - The only legal transitions leave `Pending`.
//! - A terminal state never changes again.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use crate::error::TaskError;

/// Global counter for task identities.
static TASK_SEQ: AtomicU64 = AtomicU64::new(1);

/// Opaque, process-unique identity of one task invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    /// Allocates the next identity.
    pub(crate) fn next() -> Self {
        Self(TASK_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Returns the raw numeric value (for logs).
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// State of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState<T> {
    /// Work is still running (or has not observed cancellation yet).
    Pending,
    /// Work produced a value.
    Resolved(T),
    /// Work failed; carries the underlying error.
    Failed(TaskError),
    /// The task was cancelled before it produced an outcome.
    Cancelled,
}

impl<T> TaskState<T> {
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, TaskState::Pending)
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        matches!(self, TaskState::Resolved(_))
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TaskState::Cancelled)
    }

    /// Returns the resolved value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            TaskState::Resolved(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the failure, if any.
    pub fn error(&self) -> Option<&TaskError> {
        match self {
            TaskState::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Converts a terminal state into a `Result`.
    ///
    /// `Cancelled` (and `Pending`, which callers should not pass) map to
    /// [`TaskError::Canceled`], so `?` inside task work turns a cancelled
    /// constituent into a cancelled composite.
    pub fn into_result(self) -> Result<T, TaskError> {
        match self {
            TaskState::Resolved(v) => Ok(v),
            TaskState::Failed(e) => Err(e),
            TaskState::Pending | TaskState::Cancelled => Err(TaskError::Canceled),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::Resolved(_) => "resolved",
            TaskState::Failed(_) => "failed",
            TaskState::Cancelled => "cancelled",
        }
    }

    /// Builds the terminal state matching a work result.
    ///
    /// `Err(TaskError::Canceled)` is a cooperative exit and becomes `Cancelled`.
    pub(crate) fn from_result(res: Result<T, TaskError>) -> Self {
        match res {
            Ok(v) => TaskState::Resolved(v),
            Err(TaskError::Canceled) => TaskState::Cancelled,
            Err(e) => TaskState::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = TaskId::next();
        let b = TaskId::next();
        assert!(b > a);
        assert_eq!(a.to_string(), format!("task-{}", a.get()));
    }

    #[test]
    fn canceled_error_maps_to_cancelled_state() {
        let st: TaskState<u8> = TaskState::from_result(Err(TaskError::Canceled));
        assert!(st.is_cancelled());
        assert_eq!(st.into_result(), Err(TaskError::Canceled));
    }

    #[test]
    fn failure_keeps_the_error() {
        let st: TaskState<u8> = TaskState::from_result(Err(TaskError::transport("down")));
        assert_eq!(st.as_label(), "failed");
        assert_eq!(st.error(), Some(&TaskError::transport("down")));
    }
}
