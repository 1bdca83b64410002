//! # Engine: composes cat chains and binds them to slots.
//!
//! The [`Engine`] owns the event bus, the data-source [`Fetcher`], the decoder
//! and the picker. It builds the three stock compositions and installs them
//! into [`Slot`]s handed out by [`Engine::slot`].
//!
//! ## Compositions
//! ```text
//! default:      fetch_tags ─► pick(tag) ─► fetch_cat_by_tag(tag) ─► decode
//!
//! independent:  fetch_tags ─► join2( pick(tag), pick(caption) )
//!                         ─► fetch_cat_by_tag_says(tag, caption) ─► decode
//!
//! plain:        fetch_cat ─► decode
//! ```
//! Each arrow is a [`switch_map`] step: the next stage starts only after the
//! previous one resolved, and the whole chain is one task, so cancelling it
//! cancels whichever stage is in flight.
//!
//! ## Event flow
//! ```text
//!   Slot ── publish(Event) ──► Bus ──► engine listener ──► SubscriberSet::emit(&Event)
//! ```
//!
//! ## Shutdown
//! [`Engine::shutdown`] publishes `ShutdownRequested`, cancels the runtime token
//! (every engine slot's chains are bound to a child of it), then drains the bus
//! into the subscribers and waits for their queues to empty. Dropping the engine
//! cancels the runtime token as well.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{builder::EngineBuilder, config::Config, fetch::Fetcher};
use crate::compose::{join2, switch_map, try_map};
use crate::decode::{DataUrl, Decode};
use crate::error::SlotError;
use crate::events::{Bus, Event, EventKind};
use crate::pick::{Picker, pick};
use crate::slot::{Consumer, Slot};
use crate::source::CatSource;
use crate::subscribers::SubscriberSet;
use crate::tasks::AsyncTask;

/// Composition engine for cat chains.
pub struct Engine {
    cfg: Config,
    bus: Bus,
    fetcher: Fetcher,
    decoder: Arc<dyn Decode>,
    picker: Arc<dyn Picker>,
    captions: Arc<[String]>,
    runtime_token: CancellationToken,
    listener_stop: CancellationToken,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl Engine {
    /// Shorthand for [`EngineBuilder::new`].
    pub fn builder(source: Arc<dyn CatSource>) -> EngineBuilder {
        EngineBuilder::new(source)
    }

    pub(super) fn new_internal(
        cfg: Config,
        bus: Bus,
        subs: SubscriberSet,
        fetcher: Fetcher,
        decoder: Arc<dyn Decode>,
        picker: Arc<dyn Picker>,
        runtime_token: CancellationToken,
    ) -> Self {
        let listener_stop = CancellationToken::new();
        let listener = tokio::spawn(subscriber_listener(
            bus.subscribe(),
            subs,
            listener_stop.clone(),
        ));
        let captions = cfg.captions.clone().into();

        Self {
            cfg,
            bus,
            fetcher,
            decoder,
            picker,
            captions,
            runtime_token,
            listener_stop,
            listener: Mutex::new(Some(listener)),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Event bus carrying chain lifecycle events.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Data-source calls as tasks, for building custom chains.
    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub fn decoder(&self) -> &Arc<dyn Decode> {
        &self.decoder
    }

    /// Creates a slot wired to this engine's bus, admission policy and runtime token.
    pub fn slot(
        &self,
        name: impl Into<Arc<str>>,
        consumer: Arc<dyn Consumer<DataUrl>>,
    ) -> Slot<DataUrl> {
        Slot::builder(name, consumer)
            .with_admission(self.cfg.admission)
            .with_bus(self.bus.clone())
            .bound_to(self.runtime_token.child_token())
            .build()
    }

    /// Tags → random tag → cat with that tag → decoded image.
    pub fn default_chain(&self) -> AsyncTask<DataUrl> {
        let picker = Arc::clone(&self.picker);
        let tag = try_map("pick_tag", self.fetcher.tags(), move |tags| {
            pick(picker.as_ref(), &tags, "tags")
        });

        let fetcher = self.fetcher.clone();
        let blob = switch_map("cat_by_tag", tag, move |tag| fetcher.cat_by_tag(tag));

        let decoder = Arc::clone(&self.decoder);
        switch_map("default_composition", blob, move |blob| {
            decoder.decode(Some(blob))
        })
    }

    /// Tags → (random tag, random caption) picked independently → cat with
    /// that tag saying that caption → decoded image.
    pub fn independent_chain(&self) -> AsyncTask<DataUrl> {
        let picker = Arc::clone(&self.picker);
        let captions = Arc::clone(&self.captions);
        let pair = switch_map("pick_tag_and_caption", self.fetcher.tags(), move |tags| {
            let tag_picker = Arc::clone(&picker);
            let tag = AsyncTask::start("pick_tag", move |_ctx| async move {
                pick(tag_picker.as_ref(), &tags, "tags")
            });
            let caption = AsyncTask::start("pick_caption", move |_ctx| async move {
                pick(picker.as_ref(), &captions, "captions")
            });
            join2("tag_and_caption", tag, caption)
        });

        let fetcher = self.fetcher.clone();
        let blob = switch_map("cat_by_tag_says", pair, move |(tag, text)| {
            fetcher.cat_by_tag_says(tag, text)
        });

        let decoder = Arc::clone(&self.decoder);
        switch_map("independent_composition", blob, move |blob| {
            decoder.decode(Some(blob))
        })
    }

    /// Random cat → decoded image.
    pub fn plain_chain(&self) -> AsyncTask<DataUrl> {
        let decoder = Arc::clone(&self.decoder);
        switch_map("plain_composition", self.fetcher.cat(), move |blob| {
            decoder.decode(Some(blob))
        })
    }

    /// Installs [`default_chain`](Self::default_chain) into `slot`.
    ///
    /// Nothing is fetched when the slot refuses the request.
    pub fn activate_default_composition(&self, slot: &Slot<DataUrl>) -> Result<(), SlotError> {
        slot.activate_with(|| self.default_chain())
    }

    /// Installs [`independent_chain`](Self::independent_chain) into `slot`.
    pub fn activate_independent_composition(
        &self,
        slot: &Slot<DataUrl>,
    ) -> Result<(), SlotError> {
        slot.activate_with(|| self.independent_chain())
    }

    /// Installs [`plain_chain`](Self::plain_chain) into `slot`.
    pub fn activate_plain(&self, slot: &Slot<DataUrl>) -> Result<(), SlotError> {
        slot.activate_with(|| self.plain_chain())
    }

    /// Cancels the slot's active chain and closes it.
    pub fn deactivate(&self, slot: &Slot<DataUrl>) {
        slot.deactivate();
    }

    /// Cancels every engine-bound chain and flushes pending events to subscribers.
    ///
    /// Engine slots are closed afterwards: further activations fail with
    /// [`SlotError::Closed`].
    pub async fn shutdown(&self) {
        self.bus.publish(Event::new(EventKind::ShutdownRequested));
        self.runtime_token.cancel();
        // Let bound chains settle so their events are flushed too.
        tokio::task::yield_now().await;
        self.listener_stop.cancel();

        let handle = self.listener.lock().take();
        if let Some(h) = handle {
            let _ = h.await;
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.runtime_token.cancel();
        self.listener_stop.cancel();
    }
}

/// Forwards bus events to the subscriber set until `stop`, then drains what is
/// already queued and shuts the set down.
async fn subscriber_listener(
    mut rx: broadcast::Receiver<Event>,
    set: SubscriberSet,
    stop: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            ev = rx.recv() => match ev {
                Ok(ev) => set.emit(&ev),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            },
            _ = stop.cancelled() => {
                while let Ok(ev) = rx.try_recv() {
                    set.emit(&ev);
                }
                break;
            }
        }
    }
    set.shutdown().await;
}
