//! # chainvisor
//!
//! **Chainvisor** composes cancellable async lookups into single request
//! chains and ties each chain's lifetime to the consumer that asked for it.
//!
//! It answers three questions:
//! - how several independent or dependent fetches merge into one derived request
//!   ([`compose`]);
//! - how only the most recent chain of a consumer is ever observed, with stale
//!   results suppressed rather than reordered ([`Slot`]);
//! - how teardown of the consumer cancels every stage still in flight
//!   (task adoption + [`Slot::deactivate`] / `Drop`).
//!
//! ## Architecture
//! ```text
//!   consumer ──► Engine::activate_*_composition(&slot)
//!                    │
//!                    ▼
//!   ┌──────────────────────────── chain (one AsyncTask) ───────────────────────────┐
//!   │  fetch_tags ──switch_map──► pick / join2(pick, pick) ──switch_map──► fetch   │
//!   │                                                         ──switch_map──► decode│
//!   └──────────────────────────────────────┬───────────────────────────────────────┘
//!                                          ▼
//!   Slot (generation-checked, mutex-serialized) ──► Consumer::on_value / on_error
//!     │
//!     └─ publish(Event) ──► Bus ──► engine listener ──► SubscriberSet ──► LogWriter, ...
//! ```
//!
//! ### Task lifecycle
//! ```text
//! Pending ──► Resolved(value)
//!        ├──► Failed(TaskError)
//!        └──► Cancelled            (terminal states never change; callback fires once)
//!
//! on terminal: cancel token ─► cancel every adopted child (depth-first)
//! ```
//!
//! ## Features
//! | Area              | Description                                               | Key types                                   |
//! |-------------------|-----------------------------------------------------------|---------------------------------------------|
//! | **Tasks**         | Cancellable single-shot async work with one callback.     | [`AsyncTask`], [`TaskState`], [`TaskContext`]|
//! | **Combinators**   | Sequential, join-all and combine-latest composition.      | [`switch_map`], [`join_all`], [`combine_latest`] |
//! | **Decoding**      | Binary payload to `data:` URL as a task.                  | [`Decode`], [`DataUrlDecoder`], [`DataUrl`] |
//! | **Slots**         | One active chain per consumer, supersession, teardown.    | [`Slot`], [`Admission`], [`Consumer`]       |
//! | **Engine**        | Stock compositions over a data source.                    | [`Engine`], [`EngineBuilder`], [`CatSource`]|
//! | **Events**        | Chain lifecycle events and subscribers.                   | [`Event`], [`Subscribe`], [`SubscriberSet`] |
//! | **Errors**        | Typed errors with stable labels.                          | [`TaskError`], [`SlotError`]                |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use chainvisor::{Display, Engine, FixedPicker, source::MemorySource};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let source = Arc::new(MemorySource::new(["funny", "cute"]));
//!     let engine = Engine::builder(source)
//!         .with_picker(Arc::new(FixedPicker(0)))
//!         .build();
//!
//!     let view = Arc::new(Display::<chainvisor::DataUrl>::new());
//!     let slot = engine.slot("cat", view.clone());
//!
//!     let chain = engine.default_chain();
//!     slot.activate(chain.clone()).unwrap();
//!     chain.outcome().await;
//!
//!     let shown = view.value().unwrap();
//!     assert!(shown.as_str().starts_with("data:image/png;base64,"));
//!
//!     engine.deactivate(&slot);
//!     engine.shutdown().await;
//! }
//! ```

pub mod compose;
mod core;
pub mod decode;
mod error;
mod events;
mod pick;
mod slot;
pub mod source;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use compose::{Latest, combine_latest, combine_latest_tasks, join2, join_all, map, switch_map, try_map};
pub use crate::core::{Config, DEFAULT_CAPTIONS, Engine, EngineBuilder, Fetcher};
pub use decode::{Blob, DataUrl, DataUrlDecoder, Decode};
pub use error::{SlotError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use pick::{FixedPicker, Picker, RandomPicker, pick};
pub use slot::{Admission, Consumer, Display, Slot, SlotBuilder, SlotStatus};
pub use source::{CatMeta, CatSource, MemorySource};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{AsyncTask, Callback, TaskContext, TaskId, TaskState};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
