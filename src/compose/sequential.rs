//! # Sequential-Dependent composition.
//!
//! [`switch_map`] runs a second task whose input is the resolved value of a first one.
//! [`map`] and [`try_map`] are the synchronous special cases.
//!
//! ## Flow
//! ```text
//! switch_map(first, next):
//!   adopt(first) ─► first.outcome()
//!                    ├─ Resolved(a) ─► second = next(a) ─► adopt(second) ─► second.outcome()
//!                    ├─ Failed(e)   ─► Failed(e)     (next is never called)
//!                    └─ Cancelled   ─► Cancelled     (next is never called)
//! ```
//!
//! ## Rules
//! - The second task never starts before the first resolves.
//! - Both tasks are adopted: cancelling the composite cancels whichever is pending,
//!   so a superseded chain can never deliver its second result.

use std::borrow::Cow;

use crate::error::TaskError;
use crate::tasks::{AsyncTask, TaskContext};

/// Chains `next` onto `first`.
///
/// ## Example
/// ```rust
/// use chainvisor::{AsyncTask, TaskState, compose};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let tags = AsyncTask::resolved("tags", vec!["funny".to_string(), "cute".to_string()]);
/// let len = compose::switch_map("first-tag-len", tags, |tags| {
///     AsyncTask::resolved("len", tags[0].len())
/// });
/// assert_eq!(len.outcome().await, TaskState::Resolved(5));
/// # }
/// ```
pub fn switch_map<A, B, F>(name: impl Into<Cow<'static, str>>, first: AsyncTask<A>, next: F) -> AsyncTask<B>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    F: FnOnce(A) -> AsyncTask<B> + Send + 'static,
{
    let upstream = first.clone();
    let composite = AsyncTask::start(name, move |ctx: TaskContext| async move {
        let a = first.outcome().await.into_result()?;
        if ctx.is_cancelled() {
            return Err(TaskError::Canceled);
        }

        let second = next(a);
        ctx.adopt(&second);
        second.outcome().await.into_result()
    });
    composite.adopt(&upstream);
    composite
}

/// Transforms the resolved value of `task` with `f`.
pub fn map<A, B, F>(name: impl Into<Cow<'static, str>>, task: AsyncTask<A>, f: F) -> AsyncTask<B>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    F: FnOnce(A) -> B + Send + 'static,
{
    try_map(name, task, move |a| Ok(f(a)))
}

/// Like [`map`], but `f` may fail the composite.
pub fn try_map<A, B, F>(name: impl Into<Cow<'static, str>>, task: AsyncTask<A>, f: F) -> AsyncTask<B>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    F: FnOnce(A) -> Result<B, TaskError> + Send + 'static,
{
    let upstream = task.clone();
    let composite = AsyncTask::start(name, move |_ctx: TaskContext| async move {
        let a = task.outcome().await.into_result()?;
        f(a)
    });
    composite.adopt(&upstream);
    composite
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskState;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn second_starts_with_first_value() {
        let first = AsyncTask::resolved("a", 20u32);
        let both = switch_map("a+b", first, |a| AsyncTask::resolved("b", a + 1));
        assert_eq!(both.outcome().await, TaskState::Resolved(21));
    }

    #[tokio::test]
    async fn failed_first_never_starts_second() {
        let calls = Arc::new(AtomicUsize::new(0));
        let first: AsyncTask<u32> = AsyncTask::failed("a", TaskError::transport("no tags"));

        let c = Arc::clone(&calls);
        let both = switch_map("a+b", first, move |a| {
            c.fetch_add(1, Ordering::SeqCst);
            AsyncTask::resolved("b", a)
        });

        assert_eq!(
            both.outcome().await,
            TaskState::Failed(TaskError::transport("no tags"))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancelled_first_cancels_composite() {
        let first: AsyncTask<u32> = AsyncTask::start("a", |ctx| async move {
            ctx.cancelled().await;
            Err(TaskError::Canceled)
        });
        first.cancel();
        let both = switch_map("a+b", first, |a| AsyncTask::resolved("b", a));
        assert_eq!(both.outcome().await, TaskState::Cancelled);
    }

    #[tokio::test]
    async fn cancelling_composite_cancels_pending_second() {
        let (started_tx, started_rx) = oneshot::channel::<AsyncTask<u32>>();
        let first = AsyncTask::resolved("a", 1u32);
        let both = switch_map("a+b", first, move |_| {
            let second: AsyncTask<u32> = AsyncTask::start("b", |ctx| async move {
                ctx.cancelled().await;
                Ok(99)
            });
            let _ = started_tx.send(second.clone());
            second
        });

        let second = started_rx.await.unwrap();
        both.cancel();

        assert_eq!(both.state(), TaskState::Cancelled);
        assert_eq!(second.outcome().await, TaskState::Cancelled);
    }

    #[tokio::test]
    async fn try_map_can_fail() {
        let t = try_map("pick", AsyncTask::resolved("list", Vec::<u8>::new()), |v| {
            v.first().copied().ok_or(TaskError::Empty { what: "bytes".into() })
        });
        assert_eq!(
            t.outcome().await,
            TaskState::Failed(TaskError::Empty { what: "bytes".into() })
        );
    }
}
