//! # Parallel-Independent-Latest composition (combine-latest).
//!
//! [`combine_latest`] listens to several independent sources that may each emit
//! more than once. As soon as every source has emitted at least once, each new
//! emission publishes a fresh projection of the latest value of every source.
//!
//! ## Flow
//! ```text
//! source 0 ──(i=0, v)──┐
//! source 1 ──(i=1, v)──┼──► select_all ──► latest[i] = v
//! source N ──(i=N, v)──┘                     │
//!                                            └─ all seen? ─► project(&latest) ─► updates (watch)
//!
//! every source ended   ─► Resolved(last projection)
//! any source Err(e)    ─► Failed(e)
//! source ended silent  ─► Failed(Incomplete)
//! ```
//!
//! ## Rules
//! - No projection is published before every source has emitted.
//! - The [`Latest::task`] resolves once, after all sources end.
//! - Dropping the composite's work drops every source stream.

use std::borrow::Cow;

use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::watch;

use crate::error::TaskError;
use crate::tasks::{AsyncTask, TaskContext};

/// Handle to a running combine-latest composition.
pub struct Latest<R> {
    task: AsyncTask<R>,
    updates: watch::Receiver<Option<R>>,
}

impl<R> Latest<R>
where
    R: Clone + Send + Sync + 'static,
{
    /// Composite task: resolves with the last projection once every source ended.
    pub fn task(&self) -> &AsyncTask<R> {
        &self.task
    }

    /// Receiver of projections; `None` until every source emitted once.
    pub fn updates(&self) -> watch::Receiver<Option<R>> {
        self.updates.clone()
    }

    pub fn into_task(self) -> AsyncTask<R> {
        self.task
    }

    pub fn cancel(&self) {
        self.task.cancel();
    }
}

/// Combines re-emitting sources; see the module docs.
///
/// With no sources the composite resolves with `project(&[])`.
pub fn combine_latest<T, R, F>(
    name: impl Into<Cow<'static, str>>,
    sources: Vec<BoxStream<'static, Result<T, TaskError>>>,
    project: F,
) -> Latest<R>
where
    T: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    F: Fn(&[T]) -> R + Send + 'static,
{
    let (tx, updates) = watch::channel(None);
    let n = sources.len();

    let task = AsyncTask::start(name, move |_ctx: TaskContext| async move {
        if n == 0 {
            return Ok(project(&[]));
        }

        let tagged = sources.into_iter().enumerate().map(|(i, s)| {
            s.map(move |item| (i, Some(item)))
                .chain(stream::once(future::ready((i, None))))
                .boxed()
        });
        let mut merged = stream::select_all(tagged);

        let mut latest: Vec<Option<T>> = (0..n).map(|_| None).collect();
        let mut current: Option<R> = None;
        let mut ended = 0usize;

        while let Some((i, item)) = merged.next().await {
            match item {
                Some(Ok(v)) => {
                    latest[i] = Some(v);
                    if latest.iter().all(Option::is_some) {
                        let values: Vec<T> = latest.iter().flatten().cloned().collect();
                        let r = project(&values);
                        tx.send_replace(Some(r.clone()));
                        current = Some(r);
                    }
                }
                Some(Err(e)) => return Err(e),
                None => {
                    if latest[i].is_none() {
                        return Err(TaskError::Incomplete { source_index: i });
                    }
                    ended += 1;
                    if ended == n {
                        break;
                    }
                }
            }
        }

        current.ok_or(TaskError::Incomplete { source_index: 0 })
    });

    Latest { task, updates }
}

/// Combines single-shot tasks; the tasks are adopted by the composite.
pub fn combine_latest_tasks<T, R, F>(
    name: impl Into<Cow<'static, str>>,
    tasks: Vec<AsyncTask<T>>,
    project: F,
) -> Latest<R>
where
    T: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    F: Fn(&[T]) -> R + Send + 'static,
{
    let sources = tasks.iter().cloned().map(AsyncTask::into_stream).collect();
    let latest = combine_latest(name, sources, project);
    for t in &tasks {
        latest.task.adopt(t);
    }
    latest
}
