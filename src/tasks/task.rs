//! # AsyncTask: a cancellable unit producing exactly one outcome.
//!
//! [`AsyncTask`] is a cheap, cloneable handle to one invocation of async work.
//! The work runs on tokio and receives a [`TaskContext`] carrying the task's
//! [`CancellationToken`].
//!
//! ## Architecture
//! ```text
//! AsyncTask::start(name, work)
//!     │
//!     ├─► Shared { id, token, state: watch<TaskState>, callback, children }
//!     └─► tokio::spawn(run_once(shared, ctx, work))
//!             │
//!             ├─ token cancelled  → settle(Cancelled)
//!             ├─ Ok(value)        → settle(Resolved)
//!             ├─ Err(Canceled)    → settle(Cancelled)
//!             └─ Err(e)           → settle(Failed)
//!
//! settle(next):
//!   ├─ Pending? no  → ignored (first transition wins)
//!   ├─ cancel token + every adopted child (depth-first)
//!   └─ fire the completion callback (at most once)
//! ```
//!
//! ## Rules
//! - `cancel()` is synchronous and idempotent.
//! - A result arriving after cancellation is dropped on the floor.
//! - Children adopted through [`TaskContext::adopt`] are owned by the parent:
//!   they are cancelled when the parent reaches any terminal state.
//! - `start` must be called from within a tokio runtime.

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::runner::run_once;
use crate::tasks::state::{TaskId, TaskState};

/// Completion callback, invoked once with the terminal state.
pub type Callback<T> = Box<dyn FnOnce(&TaskState<T>) + Send + 'static>;

/// Anything that can be cancelled as part of a parent chain.
pub(crate) trait Cancel: Send + Sync {
    fn cancel(&self);
}

/// Tasks adopted by a running parent.
///
/// `None` once the parent is terminal: late adoptions are cancelled on the spot.
pub(crate) struct Children {
    inner: Mutex<Option<Vec<Arc<dyn Cancel>>>>,
}

impl Children {
    fn new() -> Self {
        Self {
            inner: Mutex::new(Some(Vec::new())),
        }
    }

    fn adopt(&self, child: Arc<dyn Cancel>) {
        let mut guard = self.inner.lock();
        match guard.as_mut() {
            Some(list) => list.push(child),
            None => {
                drop(guard);
                child.cancel();
            }
        }
    }

    fn close(&self) {
        let taken = self.inner.lock().take();
        for child in taken.into_iter().flatten() {
            child.cancel();
        }
    }
}

enum CallbackSlot<T> {
    Empty,
    Waiting(Callback<T>),
    Used,
}

/// State shared between handles, the runner, and parents.
pub(crate) struct Shared<T> {
    id: TaskId,
    name: Cow<'static, str>,
    token: CancellationToken,
    state: watch::Sender<TaskState<T>>,
    callback: Mutex<CallbackSlot<T>>,
    children: Arc<Children>,
}

impl<T> Shared<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn new(name: Cow<'static, str>) -> Self {
        let (state, _rx) = watch::channel(TaskState::Pending);
        Self {
            id: TaskId::next(),
            name,
            token: CancellationToken::new(),
            state,
            callback: Mutex::new(CallbackSlot::Empty),
            children: Arc::new(Children::new()),
        }
    }

    /// Moves the task out of `Pending`. Returns `false` if another transition won.
    pub(crate) fn settle(&self, next: TaskState<T>) -> bool {
        let mut slot = self.callback.lock();
        let mut next = Some(next);
        let changed = self.state.send_if_modified(|cur| {
            if !cur.is_pending() {
                return false;
            }
            match next.take() {
                Some(n) if n.is_terminal() => {
                    *cur = n;
                    true
                }
                _ => false,
            }
        });
        if !changed {
            return false;
        }

        let callback = match std::mem::replace(&mut *slot, CallbackSlot::Used) {
            CallbackSlot::Waiting(f) => Some(f),
            CallbackSlot::Empty => {
                *slot = CallbackSlot::Empty;
                None
            }
            CallbackSlot::Used => None,
        };
        drop(slot);

        self.token.cancel();
        self.children.close();

        if let Some(f) = callback {
            let terminal = self.state.borrow().clone();
            f(&terminal);
        }
        true
    }
}

impl<T> Cancel for Shared<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn cancel(&self) {
        self.settle(TaskState::Cancelled);
    }
}

/// Handle passed to task work.
///
/// Gives access to the cancellation token and lets composed work adopt the
/// tasks it starts, so cancelling the parent cancels them too.
#[derive(Clone)]
pub struct TaskContext {
    token: CancellationToken,
    children: Arc<Children>,
}

impl TaskContext {
    /// Returns the task's cancellation token.
    ///
    /// Pass it (or a child token) to transport calls that support aborting.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes when the owning task is cancelled or otherwise terminal.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Makes `task` a child of the running task.
    ///
    /// If the parent is already terminal, `task` is cancelled immediately.
    pub fn adopt<U>(&self, task: &AsyncTask<U>)
    where
        U: Clone + Send + Sync + 'static,
    {
        self.children.adopt(task.shared.clone());
    }
}

/// Cancellable unit of asynchronous work with exactly one terminal outcome.
pub struct AsyncTask<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for AsyncTask<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> AsyncTask<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Starts `work` on the current tokio runtime.
    ///
    /// ## Example
    /// ```rust
    /// use chainvisor::{AsyncTask, TaskContext, TaskError};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let t = AsyncTask::start("answer", |_ctx: TaskContext| async { Ok::<_, TaskError>(42) });
    /// assert_eq!(t.outcome().await.into_result(), Ok(42));
    /// # }
    /// ```
    pub fn start<F, Fut>(name: impl Into<Cow<'static, str>>, work: F) -> Self
    where
        F: FnOnce(TaskContext) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        Self::start_with_timeout(name, None, work)
    }

    /// Starts `work` with an optional timeout (`None` or zero = no timeout).
    ///
    /// Expiry fails the task with [`TaskError::Timeout`] and cancels its children.
    pub fn start_with_timeout<F, Fut>(
        name: impl Into<Cow<'static, str>>,
        timeout: Option<Duration>,
        work: F,
    ) -> Self
    where
        F: FnOnce(TaskContext) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        let task = Self::pending(name);
        let ctx = task.context();
        tokio::spawn(run_once(Arc::clone(&task.shared), ctx, timeout, work));
        task
    }

    /// Builds a task that is already resolved with `value`.
    pub fn resolved(name: impl Into<Cow<'static, str>>, value: T) -> Self {
        let task = Self::pending(name);
        task.shared.settle(TaskState::Resolved(value));
        task
    }

    /// Builds a task that has already failed with `error`.
    pub fn failed(name: impl Into<Cow<'static, str>>, error: TaskError) -> Self {
        let task = Self::pending(name);
        task.shared.settle(TaskState::from_result(Err(error)));
        task
    }

    fn pending(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            shared: Arc::new(Shared::new(name.into())),
        }
    }

    fn context(&self) -> TaskContext {
        TaskContext {
            token: self.shared.token.clone(),
            children: Arc::clone(&self.shared.children),
        }
    }

    /// Makes `child` owned by this task (see [`TaskContext::adopt`]).
    pub(crate) fn adopt<U>(&self, child: &AsyncTask<U>)
    where
        U: Clone + Send + Sync + 'static,
    {
        self.shared.children.adopt(child.shared.clone());
    }

    pub fn id(&self) -> TaskId {
        self.shared.id
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> TaskState<T> {
        self.shared.state.borrow().clone()
    }

    pub fn is_terminal(&self) -> bool {
        self.shared.state.borrow().is_terminal()
    }

    /// Cancels the task and, depth-first, every task it adopted.
    ///
    /// No-op when the task is already terminal.
    pub fn cancel(&self) {
        self.shared.cancel();
    }

    /// Registers the completion callback.
    ///
    /// Runs `f` right away if the task is already terminal. Only one callback
    /// may be registered; later registrations return `false` and are dropped.
    pub fn on_complete<F>(&self, f: F) -> bool
    where
        F: FnOnce(&TaskState<T>) + Send + 'static,
    {
        let mut slot = self.shared.callback.lock();
        if !matches!(*slot, CallbackSlot::Empty) {
            return false;
        }
        if !self.is_terminal() {
            *slot = CallbackSlot::Waiting(Box::new(f));
            return true;
        }
        *slot = CallbackSlot::Used;
        drop(slot);
        let terminal = self.state();
        f(&terminal);
        true
    }

    /// Waits for the terminal state.
    pub async fn outcome(&self) -> TaskState<T> {
        let mut rx = self.shared.state.subscribe();
        match rx.wait_for(|s| s.is_terminal()).await {
            Ok(state) => state.clone(),
            Err(_closed) => TaskState::Cancelled,
        }
    }

    /// Cancels this task when `token` is cancelled.
    ///
    /// The watcher exits on its own once the task is terminal.
    pub fn bind(&self, token: &CancellationToken) {
        let task = self.clone();
        let token = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => task.cancel(),
                _ = task.outcome() => {}
            }
        });
    }

    /// Adapts the task into a one-item stream (for [`combine_latest`](crate::compose::combine_latest)).
    pub fn into_stream(self) -> BoxStream<'static, Result<T, TaskError>> {
        stream::once(async move { self.outcome().await.into_result() }).boxed()
    }
}

impl<T> fmt::Debug for AsyncTask<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncTask")
            .field("id", &self.shared.id)
            .field("name", &self.shared.name)
            .field("state", &self.shared.state.borrow().as_label())
            .finish()
    }
}
