use std::time::Instant;

use crate::tasks::{AsyncTask, TaskId};

/// Status of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    /// No chain installed.
    Idle,

    /// A chain is installed and has not delivered yet.
    Running {
        /// Root task of the chain.
        chain: TaskId,
        /// When the chain was installed.
        started_at: Instant,
    },

    /// Deactivated; no chain will be installed or delivered again.
    Closed,
}

/// The installed chain and the generation it was installed with.
pub(super) struct Active<T> {
    pub chain: AsyncTask<T>,
    pub generation: u64,
}

/// Mutable state of a slot (guarded by the slot mutex).
pub(super) struct SlotState<T> {
    pub status: SlotStatus,
    pub generation: u64,
    pub active: Option<Active<T>>,
}

impl<T> SlotState<T> {
    pub fn new() -> Self {
        Self {
            status: SlotStatus::Idle,
            generation: 0,
            active: None,
        }
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| a.generation == generation)
    }
}
