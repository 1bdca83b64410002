//! # Runtime events emitted by slots and the engine.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Chain events**: lifecycle of a composed chain inside a slot
//!   (started, superseded, rejected, resolved, failed, cancelled)
//! - **Slot / engine events**: deactivation and shutdown
//! - **Subscriber events**: overflow and panic reports from the fan-out
//!
//! The [`Event`] struct carries additional metadata such as timestamps, slot name,
//! chain id, generation and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use chainvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ChainFailed)
//!     .with_slot("cat")
//!     .with_generation(3)
//!     .with_reason("transport error: 503");
//!
//! assert_eq!(ev.kind, EventKind::ChainFailed);
//! assert_eq!(ev.slot.as_deref(), Some("cat"));
//! assert_eq!(ev.reason.as_deref(), Some("transport error: 503"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::tasks::TaskId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `slot`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `slot`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Chain events ===
    /// A chain was installed into a slot.
    ///
    /// Sets:
    /// - `slot`: slot name
    /// - `chain`: id of the chain's root task
    /// - `generation`: slot generation of the chain
    ChainStarted,

    /// An active chain was cancelled because a newer one replaced it.
    ///
    /// Sets:
    /// - `slot`, `chain` (the old chain), `generation` (the old generation)
    ChainSuperseded,

    /// A new chain was refused because the slot is busy (`Admission::DropIfRunning`).
    ///
    /// Sets:
    /// - `slot`, `chain` (the refused chain)
    ChainRejected,

    /// The current chain resolved and its value was delivered.
    ///
    /// Sets:
    /// - `slot`, `chain`, `generation`
    ChainResolved,

    /// The current chain failed; the consumer received the error.
    ///
    /// Sets:
    /// - `slot`, `chain`, `generation`
    /// - `reason`: failure message
    ChainFailed,

    /// The current chain ended cancelled (never surfaced to the consumer).
    ///
    /// Sets:
    /// - `slot`, `chain`, `generation`
    ChainCancelled,

    // === Slot / engine events ===
    /// Slot was deactivated; its active chain (if any) was cancelled.
    ///
    /// Sets:
    /// - `slot`: slot name
    /// - `chain`: cancelled chain, if there was one
    SlotDeactivated,

    /// Engine shutdown requested; every bound chain is cancelled.
    ShutdownRequested,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the slot (or subscriber), if applicable.
    pub slot: Option<Arc<str>>,
    /// Root task of the chain, if applicable.
    pub chain: Option<TaskId>,
    /// Slot generation the chain was installed with.
    pub generation: Option<u64>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            slot: None,
            chain: None,
            generation: None,
            reason: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a slot name.
    #[inline]
    pub fn with_slot(mut self, slot: impl Into<Arc<str>>) -> Self {
        self.slot = Some(slot.into());
        self
    }

    /// Attaches the chain's root task id.
    #[inline]
    pub fn with_chain(mut self, chain: TaskId) -> Self {
        self.chain = Some(chain);
        self
    }

    /// Attaches the slot generation.
    #[inline]
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = Some(generation);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_slot(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_slot(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}
