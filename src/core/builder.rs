use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{config::Config, engine::Engine, fetch::Fetcher};
use crate::{
    decode::{DataUrlDecoder, Decode},
    events::Bus,
    pick::{Picker, RandomPicker},
    source::CatSource,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for an [`Engine`].
pub struct EngineBuilder {
    cfg: Config,
    source: Arc<dyn CatSource>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    decoder: Arc<dyn Decode>,
    picker: Arc<dyn Picker>,
}

impl EngineBuilder {
    /// Starts a builder around `source` with the default configuration,
    /// [`DataUrlDecoder`] and [`RandomPicker`].
    pub fn new(source: Arc<dyn CatSource>) -> Self {
        Self {
            cfg: Config::default(),
            source,
            subscribers: Vec::new(),
            decoder: Arc::new(DataUrlDecoder::new()),
            picker: Arc::new(RandomPicker),
        }
    }

    pub fn with_config(mut self, cfg: Config) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive chain lifecycle events through dedicated workers
    /// with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Replaces the index picker (e.g. [`FixedPicker`](crate::FixedPicker) in tests).
    pub fn with_picker(mut self, picker: Arc<dyn Picker>) -> Self {
        self.picker = picker;
        self
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn Decode>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Builds the engine and starts its subscriber workers.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn build(self) -> Engine {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());
        let fetcher = Fetcher::new(self.source, self.cfg.request_timeout());

        Engine::new_internal(
            self.cfg,
            bus,
            subs,
            fetcher,
            self.decoder,
            self.picker,
            CancellationToken::new(),
        )
    }
}
