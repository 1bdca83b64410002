//! # Per-slot admission policy
//!
//! A slot holds at most **one** active chain. When a new chain arrives while
//! the previous one is still pending, the admission policy decides what happens.
//!
//! ## Variants
//! - `Replace`: **cancel** the running chain and install the new one (supersession).
//! - `DropIfRunning`: keep the running chain; the new one is cancelled and
//!   `activate` returns [`SlotError::Busy`](crate::SlotError::Busy).
//!
//! ## Invariants
//! - Two chains of the same slot never both deliver: only the chain installed
//!   last can reach the consumer.

/// Policy controlling how new chains are handled when a slot is busy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Admission {
    /// Cancel the current chain and install the new one.
    ///
    /// Use when the newest request invalidates older ones
    /// (e.g. "show a new random cat" pressed twice).
    #[default]
    Replace,

    /// Keep the current chain and refuse the new one.
    ///
    /// Use when redundant work should be avoided and the pending result is
    /// as good as a fresh one.
    DropIfRunning,
}
