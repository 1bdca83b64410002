//! # Event subscribers.
//!
//! Slots and the engine publish [`Event`](crate::events::Event)s on the
//! [`Bus`](crate::events::Bus). The engine listener forwards each one to a
//! [`SubscriberSet`], which feeds every registered [`Subscribe`] implementation
//! through its own bounded queue.
//!
//! ```text
//!   Slot ── publish(Event) ──► Bus ──► engine listener ──► SubscriberSet::emit
//!                                                               │
//!                                                    ┌──────────┼──────────┐
//!                                                    ▼          ▼          ▼
//!                                                LogWriter   Metrics    Custom
//! ```
//!
//! `LogWriter` is only compiled with the `logging` feature.

#[cfg(feature = "logging")]
mod embedded;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
