//! Receivers of chain results.

use parking_lot::Mutex;

use crate::error::TaskError;

/// Receives the outcome of the chains installed in a [`Slot`](super::Slot).
///
/// Called with the slot's lock held, so implementations must not call back
/// into the same slot. Cancellation is never reported.
pub trait Consumer<T>: Send + Sync + 'static {
    fn on_value(&self, value: T);

    fn on_error(&self, error: TaskError);
}

/// Stock consumer holding the value currently on display.
///
/// A failure sets the error indicator and leaves the displayed value as it
/// was; the next successful value clears the indicator.
///
/// ```
/// use chainvisor::{Consumer, Display, TaskError};
///
/// let view = Display::new();
/// view.on_value("cat-1");
/// view.on_error(TaskError::transport("offline"));
///
/// assert_eq!(view.value(), Some("cat-1"));
/// assert!(view.has_error());
/// assert_eq!(view.deliveries(), 2);
/// ```
pub struct Display<T> {
    state: Mutex<DisplayState<T>>,
}

struct DisplayState<T> {
    value: Option<T>,
    error: Option<TaskError>,
    deliveries: usize,
}

impl<T: Clone> Display<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DisplayState {
                value: None,
                error: None,
                deliveries: 0,
            }),
        }
    }

    /// The value currently displayed.
    pub fn value(&self) -> Option<T> {
        self.state.lock().value.clone()
    }

    /// The error of the last delivery, if it failed.
    pub fn error(&self) -> Option<TaskError> {
        self.state.lock().error.clone()
    }

    pub fn has_error(&self) -> bool {
        self.state.lock().error.is_some()
    }

    /// Number of results (values and errors) received so far.
    pub fn deliveries(&self) -> usize {
        self.state.lock().deliveries
    }
}

impl<T: Clone> Default for Display<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Consumer<T> for Display<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn on_value(&self, value: T) {
        let mut st = self.state.lock();
        st.value = Some(value);
        st.error = None;
        st.deliveries += 1;
    }

    fn on_error(&self, error: TaskError) {
        let mut st = self.state.lock();
        st.error = Some(error);
        st.deliveries += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_value_clears_error() {
        let view = Display::new();
        view.on_error(TaskError::decode("bad"));
        assert_eq!(view.value(), None::<u8>);
        assert_eq!(view.error().map(|e| e.as_label()), Some("task_decode"));

        view.on_value(7u8);
        assert_eq!(view.value(), Some(7));
        assert!(!view.has_error());
    }
}
