//! # Parallel-Independent-All composition (fork-join).
//!
//! [`join_all`] and [`join2`] wait for every independent source and resolve once,
//! with the values in source order.
//!
//! ## Flow
//! ```text
//! join_all([t0, t1, ... tn]):
//!   adopt(all)
//!   FuturesUnordered(outcome of each)
//!     ├─ Resolved(v_i) ─► slot[i] = v_i   (completion order does not matter)
//!     ├─ Failed(e)     ─► cancel the rest ─► Failed(e)
//!     └─ Cancelled     ─► cancel the rest ─► Cancelled
//!   all slots filled   ─► Resolved([v0, v1, ... vn])
//! ```
//!
//! ## Rules
//! - Resolution never fires before every source is terminal.
//! - Values are assembled inside the composite's own future; no staging state is
//!   shared between sources.

use std::borrow::Cow;

use futures::stream::{FuturesUnordered, StreamExt};

use crate::error::TaskError;
use crate::tasks::{AsyncTask, TaskContext, TaskState};

/// Joins any number of same-typed tasks.
pub fn join_all<T>(name: impl Into<Cow<'static, str>>, tasks: Vec<AsyncTask<T>>) -> AsyncTask<Vec<T>>
where
    T: Clone + Send + Sync + 'static,
{
    let sources = tasks.clone();
    let composite = AsyncTask::start(name, move |_ctx: TaskContext| async move {
        let mut slots: Vec<Option<T>> = (0..tasks.len()).map(|_| None).collect();
        let mut pending: FuturesUnordered<_> = tasks
            .iter()
            .enumerate()
            .map(|(i, t)| async move { (i, t.outcome().await) })
            .collect();

        while let Some((i, state)) = pending.next().await {
            match state {
                TaskState::Resolved(v) => slots[i] = Some(v),
                other => {
                    drop(pending);
                    cancel_all(&tasks);
                    return Err(other.into_result().err().unwrap_or(TaskError::Canceled));
                }
            }
        }

        Ok(slots.into_iter().flatten().collect())
    });
    for t in &sources {
        composite.adopt(t);
    }
    composite
}

/// Joins two tasks of different types into a tuple.
///
/// ## Example
/// ```rust
/// use chainvisor::{AsyncTask, TaskState, compose};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let tag = AsyncTask::resolved("tag", "cute".to_string());
/// let text = AsyncTask::resolved("text", "Yolo");
/// let both = compose::join2("tag+text", tag, text);
/// assert_eq!(both.outcome().await, TaskState::Resolved(("cute".to_string(), "Yolo")));
/// # }
/// ```
pub fn join2<A, B>(name: impl Into<Cow<'static, str>>, a: AsyncTask<A>, b: AsyncTask<B>) -> AsyncTask<(A, B)>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
{
    let (left, right) = (a.clone(), b.clone());
    let composite = AsyncTask::start(name, move |_ctx: TaskContext| async move {
        let fail = |e: TaskError| {
            a.cancel();
            b.cancel();
            e
        };

        let res = futures::future::try_join(
            async { a.outcome().await.into_result() },
            async { b.outcome().await.into_result() },
        )
        .await;

        res.map_err(fail)
    });
    composite.adopt(&left);
    composite.adopt(&right);
    composite
}

fn cancel_all<T>(tasks: &[AsyncTask<T>])
where
    T: Clone + Send + Sync + 'static,
{
    for t in tasks {
        t.cancel();
    }
}
