use std::sync::{Arc, Weak};
use std::time::Instant;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::admission::Admission;
use super::builder::SlotBuilder;
use super::consumer::Consumer;
use super::state::{Active, SlotState, SlotStatus};
use crate::error::SlotError;
use crate::events::{Bus, Event, EventKind};
use crate::tasks::{AsyncTask, TaskId, TaskState};

/// Binds composed chains to a consumer's lifetime.
///
/// At most one chain is active. Installing a new chain supersedes the old one
/// (per [`Admission`]); only the chain installed last can deliver. Dropping
/// the slot deactivates it, cancelling whatever is still in flight.
///
/// ```
/// use std::sync::Arc;
/// use chainvisor::{AsyncTask, Display, Slot};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let view = Arc::new(Display::<&str>::new());
/// let slot = Slot::new("greeting", view.clone());
///
/// let chain = AsyncTask::start("hello", |_ctx| async { Ok("hello") });
/// slot.activate(chain.clone()).unwrap();
/// chain.outcome().await;
///
/// assert_eq!(view.value(), Some("hello"));
/// # }
/// ```
pub struct Slot<T>
where
    T: Clone + Send + Sync + 'static,
{
    inner: Arc<Inner<T>>,
}

pub(super) struct Inner<T> {
    pub(super) name: Arc<str>,
    pub(super) admission: Admission,
    pub(super) bus: Option<Bus>,
    pub(super) token: Option<CancellationToken>,
    pub(super) consumer: Arc<dyn Consumer<T>>,
    pub(super) state: Mutex<SlotState<T>>,
}

impl<T> Slot<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates an idle slot delivering to `consumer` with default settings.
    pub fn new(name: impl Into<Arc<str>>, consumer: Arc<dyn Consumer<T>>) -> Self {
        SlotBuilder::new(name, consumer).build()
    }

    /// Starts configuring a slot (admission, bus, cancellation token).
    pub fn builder(name: impl Into<Arc<str>>, consumer: Arc<dyn Consumer<T>>) -> SlotBuilder<T> {
        SlotBuilder::new(name, consumer)
    }

    pub(super) fn from_inner(inner: Inner<T>) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn admission(&self) -> Admission {
        self.inner.admission
    }

    /// Current status; a slot whose bound token fired reports `Closed`.
    pub fn status(&self) -> SlotStatus {
        let status = self.inner.state.lock().status;
        if self.inner.unbound() {
            SlotStatus::Closed
        } else {
            status
        }
    }

    /// Number of chains installed so far.
    pub fn generation(&self) -> u64 {
        self.inner.state.lock().generation
    }

    /// Root task id of the chain that can still deliver, if any.
    pub fn current(&self) -> Option<TaskId> {
        self.inner
            .state
            .lock()
            .active
            .as_ref()
            .map(|a| a.chain.id())
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.status(), SlotStatus::Closed)
    }

    /// Installs `chain`, applying the slot's admission policy.
    ///
    /// # Errors
    /// - [`SlotError::Closed`] if the slot was deactivated or its token fired.
    /// - [`SlotError::Busy`] under [`Admission::DropIfRunning`] while a chain is pending.
    ///
    /// In both cases `chain` is cancelled.
    pub fn activate(&self, chain: AsyncTask<T>) -> Result<(), SlotError> {
        self.install(chain, self.inner.admission)
    }

    /// Builds a chain only if the slot admits one, then installs it.
    ///
    /// Admission and `build` run under the slot lock, so a rejected request
    /// never starts any work. `build` must not call back into this slot.
    ///
    /// # Errors
    /// Same as [`activate`](Self::activate).
    pub fn activate_with<F>(&self, build: F) -> Result<(), SlotError>
    where
        F: FnOnce() -> AsyncTask<T>,
    {
        self.install_with(self.inner.admission, None, build)
    }

    /// Installs `chain`, cancelling the current one regardless of policy.
    pub fn supersede(&self, chain: AsyncTask<T>) -> Result<(), SlotError> {
        self.install(chain, Admission::Replace)
    }

    /// Cancels the active chain and closes the slot.
    ///
    /// Idempotent. After it returns no result reaches the consumer.
    pub fn deactivate(&self) {
        self.inner.deactivate();
    }

    fn install(&self, chain: AsyncTask<T>, admission: Admission) -> Result<(), SlotError> {
        let offered = chain.clone();
        self.install_with(admission, Some(chain.id()), move || chain)
            .inspect_err(|_| offered.cancel())
    }

    fn install_with<F>(
        &self,
        admission: Admission,
        offered: Option<TaskId>,
        build: F,
    ) -> Result<(), SlotError>
    where
        F: FnOnce() -> AsyncTask<T>,
    {
        let inner = &self.inner;
        let (chain, generation, previous) = {
            let mut st = inner.state.lock();
            if matches!(st.status, SlotStatus::Closed) || inner.unbound() {
                return Err(SlotError::Closed);
            }
            let busy = st.active.as_ref().is_some_and(|a| !a.chain.is_terminal());
            if busy && admission == Admission::DropIfRunning {
                drop(st);
                inner.publish(|| {
                    let ev = Event::new(EventKind::ChainRejected);
                    match offered {
                        Some(id) => ev.with_chain(id),
                        None => ev,
                    }
                });
                return Err(SlotError::Busy);
            }

            let chain = build();
            st.generation += 1;
            let generation = st.generation;
            st.status = SlotStatus::Running {
                chain: chain.id(),
                started_at: Instant::now(),
            };
            let previous = st.active.replace(Active {
                chain: chain.clone(),
                generation,
            });
            (chain, generation, previous)
        };

        if let Some(prev) = previous {
            let was_pending = !prev.chain.is_terminal();
            prev.chain.cancel();
            if was_pending {
                inner.publish(|| {
                    Event::new(EventKind::ChainSuperseded)
                        .with_chain(prev.chain.id())
                        .with_generation(prev.generation)
                });
            }
        }
        inner.publish(|| {
            Event::new(EventKind::ChainStarted)
                .with_chain(chain.id())
                .with_generation(generation)
        });

        if let Some(token) = &inner.token {
            chain.bind(token);
        }

        let weak = Arc::downgrade(inner);
        let id = chain.id();
        let registered = chain.on_complete(move |state| Inner::complete(&weak, generation, id, state));
        if !registered {
            // Completion callback already taken: watch the outcome instead.
            let weak = Arc::downgrade(inner);
            let watched = chain.clone();
            tokio::spawn(async move {
                let state = watched.outcome().await;
                Inner::complete(&weak, generation, id, &state);
            });
        }
        Ok(())
    }
}

impl<T> Inner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn publish(&self, event: impl FnOnce() -> Event) {
        if let Some(bus) = &self.bus {
            bus.publish(event().with_slot(Arc::clone(&self.name)));
        }
    }

    /// True once the token the slot is bound to has fired.
    fn unbound(&self) -> bool {
        self.token.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    fn complete(weak: &Weak<Self>, generation: u64, id: TaskId, state: &TaskState<T>) {
        let Some(inner) = weak.upgrade() else {
            return;
        };

        let event = {
            let mut st = inner.state.lock();
            let current = st.is_current(generation);
            if current {
                st.active = None;
                st.status = SlotStatus::Idle;
            }

            match state {
                // Reported even when superseded; never delivered.
                TaskState::Cancelled => Event::new(EventKind::ChainCancelled),
                TaskState::Resolved(value) if current => {
                    inner.consumer.on_value(value.clone());
                    Event::new(EventKind::ChainResolved)
                }
                TaskState::Failed(err) if current => {
                    inner.consumer.on_error(err.clone());
                    Event::new(EventKind::ChainFailed).with_reason(err.to_string())
                }
                _ => return,
            }
        };
        inner.publish(|| event.with_chain(id).with_generation(generation));
    }

    fn deactivate(&self) {
        let active = {
            let mut st = self.state.lock();
            if matches!(st.status, SlotStatus::Closed) {
                return;
            }
            st.status = SlotStatus::Closed;
            st.active.take()
        };

        let chain = active.map(|a| {
            a.chain.cancel();
            a.chain.id()
        });
        self.publish(|| {
            let ev = Event::new(EventKind::SlotDeactivated);
            match chain {
                Some(id) => ev.with_chain(id),
                None => ev,
            }
        });
    }
}

impl<T> Drop for Slot<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.inner.deactivate();
    }
}
