//! Index selection for "pick one at random" steps inside a chain.
//!
//! Picks are made from values carried in the chain's payload, so a [`Picker`]
//! only chooses an index; [`pick`] does the lookup and reports empty input as
//! [`TaskError::Empty`].

use rand::Rng;

use crate::error::TaskError;

/// Chooses an index in `0..len`.
///
/// Called only with `len > 0`.
pub trait Picker: Send + Sync + 'static {
    fn pick_index(&self, len: usize) -> usize;
}

/// Uniformly random picks from the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPicker;

impl Picker for RandomPicker {
    fn pick_index(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Always picks the same index (wrapped into range).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPicker(pub usize);

impl Picker for FixedPicker {
    fn pick_index(&self, len: usize) -> usize {
        self.0 % len
    }
}

/// Picks one element of `items`.
///
/// ```
/// use chainvisor::{FixedPicker, TaskError, pick};
///
/// let tags = vec!["funny".to_string(), "cute".to_string()];
/// assert_eq!(pick(&FixedPicker(1), &tags, "tags").unwrap(), "cute");
/// assert!(matches!(pick::<String>(&FixedPicker(0), &[], "tags"), Err(TaskError::Empty { .. })));
/// ```
pub fn pick<T: Clone>(picker: &dyn Picker, items: &[T], what: &str) -> Result<T, TaskError> {
    if items.is_empty() {
        return Err(TaskError::Empty { what: what.into() });
    }
    let idx = picker.pick_index(items.len()).min(items.len() - 1);
    Ok(items[idx].clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_picks_stay_in_range() {
        let items = [1, 2, 3];
        for _ in 0..200 {
            let v = pick(&RandomPicker, &items, "numbers").unwrap();
            assert!(items.contains(&v));
        }
    }

    #[test]
    fn fixed_picker_wraps() {
        assert_eq!(pick(&FixedPicker(4), &["a", "b", "c"], "letters").unwrap(), "b");
    }

    #[test]
    fn empty_list_fails() {
        let err = pick::<u8>(&FixedPicker(0), &[], "captions").unwrap_err();
        assert_eq!(err.as_label(), "task_empty");
        assert!(err.to_string().contains("captions"));
    }
}
