//! # Subscription slots.
//!
//! A [`Slot`] is one logical "current request" owned by a consumer (for example
//! "the cat currently on screen"). It holds at most one composed chain and
//! guarantees that only the most recently installed chain can deliver.
//!
//! ```text
//!   activate(chain B)                         chain A resolves late
//!        │                                           │
//!        ▼                                           ▼
//!   lock ─ generation += 1 ─ active = B ─ unlock    lock ─ gen(A) != current ─ drop
//!        │
//!        └─► cancel(A) ─► A and everything it adopted settle as Cancelled
//! ```
//!
//! - Delivery and installation are serialized by the slot mutex.
//! - Cancellation is never delivered; failures reach [`Consumer::on_error`].
//! - [`Slot::deactivate`] (also run on `Drop`) cancels the active chain and closes the slot.
//! - [`Slot::activate_with`] decides admission before the chain is built, so a
//!   rejected request starts no work.

mod admission;
mod builder;
mod consumer;
mod core;
mod state;

pub use admission::Admission;
pub use builder::SlotBuilder;
pub use consumer::{Consumer, Display};
pub use self::core::Slot;
pub use state::SlotStatus;
