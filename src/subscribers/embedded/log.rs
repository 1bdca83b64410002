//! # LogWriter: simple event printer
//!
//! A minimal subscriber that prints chain lifecycle [`Event`]s to stdout.
//! Use it for demos and debugging.
//!
//! ```text
//! [chain-started] slot="cat" chain=task-7 gen=1
//! [chain-superseded] slot="cat" chain=task-7 gen=1
//! [chain-resolved] slot="cat" chain=task-12 gen=2
//! [chain-failed] slot="cat" chain=task-15 gen=3 err="transport error: 503"
//! [slot-deactivated] slot="cat"
//! [shutdown-requested]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let slot = e.slot.as_deref().unwrap_or("-");
        let chain = e.chain.map(|c| c.to_string()).unwrap_or_else(|| "-".into());
        let generation = e.generation.unwrap_or_default();
        let reason = e.reason.as_deref().unwrap_or("unknown");

        match e.kind {
            EventKind::ChainStarted => {
                println!("[chain-started] slot={slot:?} chain={chain} gen={generation}");
            }
            EventKind::ChainSuperseded => {
                println!("[chain-superseded] slot={slot:?} chain={chain} gen={generation}");
            }
            EventKind::ChainRejected => {
                println!("[chain-rejected] slot={slot:?} chain={chain}");
            }
            EventKind::ChainResolved => {
                println!("[chain-resolved] slot={slot:?} chain={chain} gen={generation}");
            }
            EventKind::ChainFailed => {
                println!("[chain-failed] slot={slot:?} chain={chain} gen={generation} err={reason:?}");
            }
            EventKind::ChainCancelled => {
                println!("[chain-cancelled] slot={slot:?} chain={chain} gen={generation}");
            }
            EventKind::SlotDeactivated => {
                println!("[slot-deactivated] slot={slot:?}");
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested]");
            }
            EventKind::SubscriberOverflow => {
                println!("[subscriber-overflow] subscriber={slot} reason={reason}");
            }
            EventKind::SubscriberPanicked => {
                println!("[subscriber-panicked] subscriber={slot} info={reason}");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
