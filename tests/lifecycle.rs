use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chainvisor::source::{Endpoint, MemorySource};
use chainvisor::{
    Admission, AsyncTask, Blob, Config, DataUrl, Display, Engine, Event, EventKind, Picker, Slot,
    SlotError, SlotStatus, Subscribe, join2,
};
use parking_lot::Mutex;
use tokio::time::sleep;

/// Cycles through indices: 0, 1, 2, ...
#[derive(Default)]
struct Cycle(AtomicUsize);

impl Picker for Cycle {
    fn pick_index(&self, len: usize) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) % len
    }
}

#[derive(Default)]
struct Journal(Mutex<Vec<EventKind>>);

#[async_trait]
impl Subscribe for Journal {
    async fn on_event(&self, ev: &Event) {
        self.0.lock().push(ev.kind);
    }

    fn name(&self) -> &'static str {
        "journal"
    }
}

fn png(tag: &str) -> Blob {
    Blob::new(Bytes::from(format!("png-of-{tag}").into_bytes())).with_content_type("image/png")
}

#[tokio::test(start_paused = true)]
async fn slower_superseded_chain_never_overwrites_the_newer_one() {
    let source = Arc::new(
        MemorySource::new(["funny", "cute"])
            .with_tag_image("funny", png("funny"))
            .with_tag_image("cute", png("cute"))
            .with_latency(Endpoint::CatByTag, Duration::from_millis(100)),
    );
    let engine = Engine::builder(source.clone())
        .with_picker(Arc::new(Cycle::default()))
        .build();
    let view = Arc::new(Display::<DataUrl>::new());
    let slot = engine.slot("cat", view.clone());

    let a = engine.default_chain();
    slot.activate(a.clone()).unwrap();
    sleep(Duration::from_millis(20)).await;
    assert_eq!(source.tag_calls(), vec!["funny".to_string()]);

    source.set_latency(Endpoint::CatByTag, Duration::from_millis(10));
    let b = engine.default_chain();
    slot.activate(b.clone()).unwrap();
    assert!(a.state().is_cancelled());

    b.outcome().await;
    sleep(Duration::from_millis(300)).await;

    let cute = chainvisor::decode::encode(&png("cute")).unwrap();
    assert_eq!(view.value(), Some(cute));
    assert_eq!(view.deliveries(), 1);
    assert_eq!(source.tag_calls(), vec!["funny".to_string(), "cute".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn deactivating_during_a_join_cancels_the_pending_half() {
    let view = Arc::new(Display::<(u32, u32)>::new());
    let slot = Slot::new("pair", view.clone());

    let fast = AsyncTask::start("fast", |_ctx| async {
        sleep(Duration::from_millis(10)).await;
        Ok(1u32)
    });
    let slow = AsyncTask::start("slow", |_ctx| async {
        sleep(Duration::from_secs(10)).await;
        Ok(2u32)
    });
    let joined = join2("both", fast.clone(), slow.clone());
    slot.activate(joined.clone()).unwrap();

    sleep(Duration::from_millis(50)).await;
    assert!(fast.state().is_resolved());
    assert!(slow.state().is_pending());

    slot.deactivate();

    assert!(slow.state().is_cancelled());
    assert!(joined.state().is_cancelled());
    assert!(fast.state().is_resolved());

    sleep(Duration::from_secs(20)).await;
    assert_eq!(view.deliveries(), 0);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_slot_cancels_every_stage() {
    let source = Arc::new(
        MemorySource::new(["funny"]).with_latency(Endpoint::CatByTag, Duration::from_secs(5)),
    );
    let engine = Engine::builder(source.clone()).build();
    let view = Arc::new(Display::<DataUrl>::new());

    let chain = engine.default_chain();
    {
        let slot = engine.slot("cat", view.clone());
        slot.activate(chain.clone()).unwrap();
        sleep(Duration::from_millis(10)).await;
        assert_eq!(source.calls(Endpoint::CatByTag), 1);
    }

    assert!(chain.state().is_cancelled());
    sleep(Duration::from_secs(10)).await;
    assert_eq!(view.deliveries(), 0);
    assert_eq!(source.calls(Endpoint::CatByTag), 1);
}

#[tokio::test(start_paused = true)]
async fn drop_if_running_keeps_the_first_chain() {
    let source = Arc::new(
        MemorySource::new(["funny"]).with_latency(Endpoint::Tags, Duration::from_millis(50)),
    );
    let cfg = Config {
        admission: Admission::DropIfRunning,
        ..Config::default()
    };
    let engine = Engine::builder(source.clone()).with_config(cfg).build();
    let view = Arc::new(Display::<DataUrl>::new());
    let slot = engine.slot("cat", view.clone());

    let first = engine.default_chain();
    slot.activate(first.clone()).unwrap();
    assert_eq!(
        engine.activate_default_composition(&slot),
        Err(SlotError::Busy)
    );

    first.outcome().await;
    assert!(first.state().is_resolved());
    assert_eq!(view.deliveries(), 1);
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_bound_chains_and_flushes_events() {
    let source = Arc::new(
        MemorySource::new(["funny"]).with_latency(Endpoint::Tags, Duration::from_secs(60)),
    );
    let journal = Arc::new(Journal::default());
    let subs: Vec<Arc<dyn Subscribe>> = vec![journal.clone()];
    let engine = Engine::builder(source.clone())
        .with_subscribers(subs)
        .build();
    let view = Arc::new(Display::<DataUrl>::new());
    let slot = engine.slot("cat", view.clone());

    let chain = engine.default_chain();
    slot.activate(chain.clone()).unwrap();
    tokio::task::yield_now().await;

    engine.shutdown().await;

    assert!(chain.outcome().await.is_cancelled());
    assert_eq!(view.deliveries(), 0);

    let seen = journal.0.lock().clone();
    assert!(seen.contains(&EventKind::ChainStarted));
    assert!(seen.contains(&EventKind::ShutdownRequested));

    assert_eq!(slot.current(), None);
    assert!(slot.is_closed());
    let tags_before = source.calls(Endpoint::Tags);
    assert_eq!(
        engine.activate_default_composition(&slot),
        Err(SlotError::Closed)
    );
    assert_eq!(source.calls(Endpoint::Tags), tags_before);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn closed_slot_issues_no_fetches() {
    let source = Arc::new(MemorySource::new(["funny", "cute"]));
    let engine = Engine::builder(source.clone()).build();
    let view = Arc::new(Display::<DataUrl>::new());
    let slot = engine.slot("cat", view.clone());
    engine.deactivate(&slot);

    for _ in 0..200 {
        assert_eq!(
            engine.activate_default_composition(&slot),
            Err(SlotError::Closed)
        );
        assert_eq!(
            engine.activate_independent_composition(&slot),
            Err(SlotError::Closed)
        );
        assert_eq!(engine.activate_plain(&slot), Err(SlotError::Closed));
    }
    sleep(Duration::from_millis(50)).await;

    assert_eq!(source.calls(Endpoint::Tags), 0);
    assert_eq!(source.calls(Endpoint::Cat), 0);
    assert_eq!(view.deliveries(), 0);
}

#[tokio::test(start_paused = true)]
async fn busy_slot_does_not_fetch_for_the_rejected_request() {
    let source = Arc::new(
        MemorySource::new(["funny"]).with_latency(Endpoint::Tags, Duration::from_millis(50)),
    );
    let cfg = Config {
        admission: Admission::DropIfRunning,
        ..Config::default()
    };
    let engine = Engine::builder(source.clone()).with_config(cfg).build();
    let view = Arc::new(Display::<DataUrl>::new());
    let slot = engine.slot("cat", view.clone());

    engine.activate_default_composition(&slot).unwrap();
    for _ in 0..5 {
        assert_eq!(
            engine.activate_default_composition(&slot),
            Err(SlotError::Busy)
        );
    }
    sleep(Duration::from_millis(200)).await;

    assert_eq!(source.calls(Endpoint::Tags), 1);
    assert_eq!(view.deliveries(), 1);
}

#[tokio::test(start_paused = true)]
async fn externally_cancelled_chain_leaves_the_slot_idle() {
    let source = Arc::new(
        MemorySource::new(["funny"]).with_latency(Endpoint::CatByTag, Duration::from_secs(5)),
    );
    let engine = Engine::builder(source).build();
    let view = Arc::new(Display::<DataUrl>::new());
    let slot = engine.slot("cat", view.clone());

    let chain = engine.default_chain();
    slot.activate(chain.clone()).unwrap();
    sleep(Duration::from_millis(10)).await;
    chain.cancel();

    assert_eq!(slot.status(), SlotStatus::Idle);
    assert_eq!(slot.current(), None);
    assert_eq!(view.deliveries(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn only_the_last_of_many_rapid_activations_delivers() {
    let view = Arc::new(Display::<usize>::new());
    let slot = Slot::new("burst", view.clone());

    let mut chains = Vec::new();
    for i in 0..32usize {
        let chain = AsyncTask::start(format!("chain-{i}"), move |_ctx| async move {
            sleep(Duration::from_millis(50)).await;
            Ok(i)
        });
        slot.activate(chain.clone()).unwrap();
        chains.push(chain);
    }

    let last = chains.last().cloned().unwrap();
    assert!(last.outcome().await.is_resolved());
    tokio::time::timeout(Duration::from_secs(5), async {
        while view.deliveries() == 0 {
            sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .unwrap();

    assert_eq!(view.value(), Some(31));
    assert_eq!(view.deliveries(), 1);
    assert!(chains[..31].iter().all(|c| c.state().is_cancelled()));
}
