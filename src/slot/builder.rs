use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::admission::Admission;
use super::consumer::Consumer;
use super::core::{Inner, Slot};
use super::state::SlotState;
use crate::events::Bus;

/// Configures a [`Slot`] before it is first used.
///
/// ```
/// use std::sync::Arc;
/// use chainvisor::{Admission, Display, Slot};
///
/// let view = Arc::new(Display::<u32>::new());
/// let slot = Slot::builder("counter", view)
///     .with_admission(Admission::DropIfRunning)
///     .build();
/// assert_eq!(slot.admission(), Admission::DropIfRunning);
/// ```
pub struct SlotBuilder<T> {
    name: Arc<str>,
    consumer: Arc<dyn Consumer<T>>,
    admission: Admission,
    bus: Option<Bus>,
    token: Option<CancellationToken>,
}

impl<T> SlotBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(name: impl Into<Arc<str>>, consumer: Arc<dyn Consumer<T>>) -> Self {
        Self {
            name: name.into(),
            consumer,
            admission: Admission::default(),
            bus: None,
            token: None,
        }
    }

    /// Sets the admission policy.
    pub fn with_admission(mut self, admission: Admission) -> Self {
        self.admission = admission;
        self
    }

    /// Publishes chain lifecycle events on `bus`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Cancels every installed chain when `token` is cancelled, and closes the slot.
    pub fn bound_to(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    #[must_use]
    pub fn build(self) -> Slot<T> {
        Slot::from_inner(Inner {
            name: self.name,
            admission: self.admission,
            bus: self.bus,
            token: self.token,
            consumer: self.consumer,
            state: Mutex::new(SlotState::new()),
        })
    }
}
