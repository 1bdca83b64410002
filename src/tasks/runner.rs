//! # Run the work of a single task.
//!
//! Executes the work future of an [`AsyncTask`](crate::AsyncTask) with optional
//! timeout and settles the task's state.
//!
//! ## Flow
//! ```text
//! Success:
//!   work(ctx) → Ok(v)            → settle(Resolved(v))
//!
//! Cancellation:
//!   token cancelled              → drop work future → settle(Cancelled)
//!   work(ctx) → Err(Canceled)    → settle(Cancelled)
//!
//! Failure:
//!   work(ctx) → Err(e)           → settle(Failed(e))
//!
//! Timeout:
//!   timeout exceeded             → drop work future → settle(Failed(Timeout))
//! ```
//!
//! ## Rules
//! - The token branch is polled first, so a cancelled task never resolves.
//! - Dropping the work future aborts any transport call it was awaiting.
//! - `settle` is a no-op when `cancel()` already won the race.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time;

use crate::error::TaskError;
use crate::tasks::state::TaskState;
use crate::tasks::task::{Shared, TaskContext};

/// Runs `work` to completion (or cancellation) and settles `shared`.
pub(crate) async fn run_once<T, F, Fut>(
    shared: Arc<Shared<T>>,
    ctx: TaskContext,
    timeout: Option<Duration>,
    work: F,
) where
    T: Clone + Send + Sync + 'static,
    F: FnOnce(TaskContext) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
{
    let token = ctx.token().clone();
    let fut = with_timeout(work(ctx), timeout);

    let res = tokio::select! {
        biased;
        _ = token.cancelled() => Err(TaskError::Canceled),
        r = fut => r,
    };

    shared.settle(TaskState::from_result(res));
}

/// Wraps `fut` in `tokio::time::timeout` when `timeout` is set and non-zero.
async fn with_timeout<T, Fut>(fut: Fut, timeout: Option<Duration>) -> Result<T, TaskError>
where
    Fut: Future<Output = Result<T, TaskError>>,
{
    match timeout.filter(|d| *d > Duration::ZERO) {
        Some(dur) => match time::timeout(dur, fut).await {
            Ok(r) => r,
            Err(_elapsed) => Err(TaskError::Timeout { timeout: dur }),
        },
        None => fut.await,
    }
}
