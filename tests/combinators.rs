use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chainvisor::{
    AsyncTask, TaskError, TaskState, combine_latest, combine_latest_tasks, join_all, map,
    switch_map,
};
use futures::StreamExt;
use futures::channel::mpsc;
use tokio::time::sleep;

fn after(ms: u64, value: u32) -> AsyncTask<u32> {
    AsyncTask::start(format!("after-{ms}"), move |_ctx| async move {
        sleep(Duration::from_millis(ms)).await;
        Ok(value)
    })
}

#[tokio::test(start_paused = true)]
async fn join_keeps_source_order_whatever_finishes_first() {
    for delays in [[10, 20, 30], [30, 20, 10], [20, 30, 10]] {
        let sources = delays.iter().zip([1, 2, 3]).map(|(&ms, v)| after(ms, v)).collect();
        let joined = join_all("three", sources);
        assert_eq!(joined.outcome().await, TaskState::Resolved(vec![1, 2, 3]));
    }
}

#[tokio::test(start_paused = true)]
async fn dependent_stage_is_never_started_after_a_failure() {
    let started = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&started);

    let first: AsyncTask<u32> = AsyncTask::start("first", |_ctx| async {
        sleep(Duration::from_millis(5)).await;
        Err(TaskError::transport("unreachable host"))
    });
    let chain = switch_map("chain", first, move |v| {
        counter.fetch_add(1, Ordering::SeqCst);
        after(1, v + 1)
    });

    let state = chain.outcome().await;
    assert_eq!(state.error().map(TaskError::as_label), Some("task_transport"));
    assert_eq!(started.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn cancelling_a_chain_midway_stops_the_second_stage() {
    let second_slot: Arc<parking_lot::Mutex<Option<AsyncTask<u32>>>> = Arc::default();
    let keep = Arc::clone(&second_slot);

    let chain = switch_map("chain", after(5, 1), move |v| {
        let next = after(1_000, v + 1);
        *keep.lock() = Some(next.clone());
        next
    });
    let doubled = map("doubled", chain.clone(), |v| v * 2);

    sleep(Duration::from_millis(50)).await;
    doubled.cancel();

    assert!(chain.state().is_cancelled());
    let second = second_slot.lock().clone().unwrap();
    assert!(second.outcome().await.is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn combine_latest_over_single_shot_tasks() {
    let latest = combine_latest_tasks("pair", vec![after(30, 1), after(10, 2)], |vals| {
        vals.iter().sum::<u32>()
    });
    let mut updates = latest.updates();

    assert_eq!(latest.task().outcome().await, TaskState::Resolved(3));
    updates.changed().await.ok();
    assert_eq!(*updates.borrow(), Some(3));
}

#[tokio::test(start_paused = true)]
async fn combine_latest_reemits_on_every_change() {
    let (tx_a, rx_a) = mpsc::unbounded::<Result<u32, TaskError>>();
    let (tx_b, rx_b) = mpsc::unbounded::<Result<u32, TaskError>>();
    let latest = combine_latest("sum", vec![rx_a.boxed(), rx_b.boxed()], |v| v.to_vec());
    let mut updates = latest.updates();

    tx_a.unbounded_send(Ok(1)).unwrap();
    sleep(Duration::from_millis(1)).await;
    assert_eq!(*updates.borrow(), None);

    tx_b.unbounded_send(Ok(10)).unwrap();
    updates.changed().await.unwrap();
    assert_eq!(*updates.borrow_and_update(), Some(vec![1, 10]));

    tx_a.unbounded_send(Ok(2)).unwrap();
    updates.changed().await.unwrap();
    assert_eq!(*updates.borrow_and_update(), Some(vec![2, 10]));

    drop(tx_a);
    drop(tx_b);
    assert_eq!(
        latest.into_task().outcome().await,
        TaskState::Resolved(vec![2, 10])
    );
}

#[tokio::test(start_paused = true)]
async fn combine_latest_fails_on_first_source_error() {
    let (tx, rx) = mpsc::unbounded::<Result<u32, TaskError>>();
    let latest = combine_latest(
        "failing",
        vec![rx.boxed(), after(100, 7).into_stream()],
        |v| v.len(),
    );

    tx.unbounded_send(Err(TaskError::decode("garbled"))).unwrap();
    let state = latest.task().outcome().await;
    assert_eq!(state, TaskState::Failed(TaskError::decode("garbled")));
}
