//! Error types used by chainvisor tasks and slots.
//!
//! This module defines two main error enums:
//!
//! - [`TaskError`] - errors that end an [`AsyncTask`](crate::AsyncTask) in the `Failed` state
//!   (plus [`TaskError::Canceled`], which work may return to signal a cooperative exit).
//! - [`SlotError`] - errors raised by a [`Slot`](crate::Slot) when a chain cannot be installed.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by task execution.
///
/// A failed constituent fails every composed task above it (fail-fast).
/// `Canceled` is never delivered to a consumer: a task whose work returns it ends up
/// in the `Cancelled` state instead of `Failed`.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The data source could not complete the request.
    #[error("transport error: {error}")]
    Transport {
        /// The underlying error message.
        error: String,
    },

    /// A payload was present but could not be turned into a displayable value.
    #[error("decode error: {error}")]
    Decode {
        /// The underlying error message.
        error: String,
    },

    /// Task execution exceeded its timeout duration.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// A random pick was requested from an empty list.
    #[error("nothing to pick from: {what}")]
    Empty {
        /// What the list was supposed to contain (e.g. "tags").
        what: String,
    },

    /// A combined source finished without ever producing a value.
    #[error("source {source_index} completed without a value")]
    Incomplete {
        /// Position of the silent source.
        source_index: usize,
    },

    /// Work observed cancellation and stopped.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Shorthand for a [`TaskError::Transport`].
    pub fn transport(error: impl Into<String>) -> Self {
        TaskError::Transport {
            error: error.into(),
        }
    }

    /// Shorthand for a [`TaskError::Decode`].
    pub fn decode(error: impl Into<String>) -> Self {
        TaskError::Decode {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use chainvisor::TaskError;
    ///
    /// let err = TaskError::transport("connection reset");
    /// assert_eq!(err.as_label(), "task_transport");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Transport { .. } => "task_transport",
            TaskError::Decode { .. } => "task_decode",
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Empty { .. } => "task_empty",
            TaskError::Incomplete { .. } => "task_incomplete",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Transport { error } => format!("transport: {error}"),
            TaskError::Decode { error } => format!("decode: {error}"),
            TaskError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            TaskError::Empty { what } => format!("empty: {what}"),
            TaskError::Incomplete { source_index } => format!("incomplete: source {source_index}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }

    /// Indicates whether this error only reports cancellation.
    ///
    /// ```
    /// use chainvisor::TaskError;
    ///
    /// assert!(TaskError::Canceled.is_cancellation());
    /// assert!(!TaskError::decode("bad header").is_cancellation());
    /// ```
    pub fn is_cancellation(&self) -> bool {
        matches!(self, TaskError::Canceled)
    }
}

/// # Errors produced by a slot.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotError {
    /// The slot was deactivated; it no longer accepts chains.
    #[error("slot deactivated")]
    Closed,

    /// A chain is already running and the admission policy keeps it.
    #[error("slot busy")]
    Busy,
}

impl SlotError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SlotError::Closed => "slot_closed",
            SlotError::Busy => "slot_busy",
        }
    }
}
