//! Engine core: configuration, data-source calls and the stock compositions.
//!
//! - [`Config`]: engine settings with sentinel-aware accessors;
//! - [`EngineBuilder`]: wires source, decoder, picker and subscribers;
//! - [`Engine`]: builds chains and installs them into slots;
//! - [`Fetcher`]: data-source calls started as tasks.

mod builder;
mod config;
mod engine;
mod fetch;

pub use builder::EngineBuilder;
pub use config::{Config, DEFAULT_CAPTIONS};
pub use engine::Engine;
pub use fetch::Fetcher;
