//! # Example: Cat Feed
//!
//! Runs the stock compositions against an in-memory source with some latency,
//! printing chain lifecycle events through `LogWriter`.
//!
//! Shows:
//! - default and independent compositions delivering into a slot
//! - a rapid second request superseding a slow first one
//! - a failing lookup leaving the previous cat on display
//! - slot teardown cancelling a chain that is still in flight
//!
//! Run with:
//! ```bash
//! cargo run --example cat_feed --features logging
//! ```

use std::{sync::Arc, time::Duration};

use chainvisor::{
    Config, DataUrl, Display, Engine, LogWriter, Subscribe, TaskError,
    source::{Endpoint, MemorySource},
};

fn show(label: &str, view: &Display<DataUrl>) {
    let value = view.value().unwrap_or_default();
    let preview: String = value.as_str().chars().take(48).collect();
    match view.error() {
        Some(err) => println!("[{label}] showing {preview:?}… (last error: {})", err.as_message()),
        None => println!("[{label}] showing {preview:?}…"),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let source = Arc::new(
        MemorySource::new(["funny", "cute", "sleepy", "orange"])
            .with_latency(Endpoint::Tags, Duration::from_millis(80))
            .with_latency(Endpoint::CatByTag, Duration::from_millis(300))
            .with_latency(Endpoint::CatByTagSays, Duration::from_millis(150)),
    );

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let cfg = Config {
        fetch_timeout: Duration::from_secs(2),
        ..Config::default()
    };
    let engine = Engine::builder(source.clone())
        .with_config(cfg)
        .with_subscribers(subs)
        .build();

    let view = Arc::new(Display::<DataUrl>::new());
    let slot = engine.slot("cat", view.clone());

    // 1. Two requests back to back: only the second one is displayed.
    engine.activate_default_composition(&slot)?;
    tokio::time::sleep(Duration::from_millis(120)).await;
    engine.activate_independent_composition(&slot)?;
    tokio::time::sleep(Duration::from_millis(600)).await;
    show("supersede", &view);
    println!("[supersede] fetched with {:?}", source.tag_says_calls());

    // 2. A failing lookup keeps the last cat and raises the error indicator.
    source.fail(Endpoint::Tags, TaskError::transport("503 Service Unavailable"));
    engine.activate_default_composition(&slot)?;
    tokio::time::sleep(Duration::from_millis(200)).await;
    show("failure", &view);
    source.heal(Endpoint::Tags);

    // 3. Teardown while a chain is still running.
    engine.activate_default_composition(&slot)?;
    tokio::time::sleep(Duration::from_millis(150)).await;
    engine.deactivate(&slot);
    tokio::time::sleep(Duration::from_millis(400)).await;
    println!("[teardown] deliveries so far: {}", view.deliveries());

    engine.shutdown().await;
    Ok(())
}
