//! Two-slot value history.
//!
//! A [`HistorizedValue`] remembers the value it held immediately before the
//! most recent write, which is all edge detection needs.

use serde::{Deserialize, Serialize};

/// Scalar cell that keeps the value written before the latest write.
///
/// Every call to [`set`](HistorizedValue::set) shifts `current` into
/// `previous`, even when the new value equals the old one, so `previous`
/// always means "the value one write ago" rather than "the last distinct
/// value".
///
/// # Example
///
/// ```rust
/// use animwatch::core::HistorizedValue;
///
/// let mut hash = HistorizedValue::new(0);
/// hash.set(7);
/// assert!(hash.changed());
/// assert_eq!(hash.previous(), 0);
///
/// hash.set(7);
/// assert!(!hash.changed());
/// assert_eq!(hash.previous(), 7);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorizedValue<T> {
    current: T,
    previous: T,
}

impl<T: Copy + PartialEq> HistorizedValue<T> {
    /// Create a cell with both slots holding `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            current: initial,
            previous: initial,
        }
    }

    /// Write a new value, moving the old one into `previous`.
    pub fn set(&mut self, value: T) {
        self.previous = self.current;
        self.current = value;
    }

    /// The most recently written value.
    pub fn current(&self) -> T {
        self.current
    }

    /// The value held before the most recent write.
    pub fn previous(&self) -> T {
        self.previous
    }

    /// Whether the last write produced a different value.
    pub fn changed(&self) -> bool {
        self.current != self.previous
    }
}

impl<T: Copy + PartialEq + Default> Default for HistorizedValue<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_value_is_unchanged() {
        let value = HistorizedValue::new(3);
        assert_eq!(value.current(), 3);
        assert_eq!(value.previous(), 3);
        assert!(!value.changed());
    }

    #[test]
    fn set_shifts_current_into_previous() {
        let mut value = HistorizedValue::new(0);
        value.set(1);
        value.set(2);

        assert_eq!(value.current(), 2);
        assert_eq!(value.previous(), 1);
        assert!(value.changed());
    }

    #[test]
    fn repeated_write_clears_changed() {
        let mut value = HistorizedValue::new(0);
        value.set(5);
        assert!(value.changed());

        value.set(5);
        assert!(!value.changed());
        assert_eq!(value.previous(), 5);
    }

    #[test]
    fn write_back_to_old_value_is_a_change() {
        let mut value = HistorizedValue::new(4);
        value.set(9);
        value.set(4);
        assert!(value.changed());
        assert_eq!(value.previous(), 9);
    }

    #[test]
    fn works_with_non_integer_scalars() {
        let mut flag = HistorizedValue::<bool>::default();
        assert!(!flag.changed());
        flag.set(true);
        assert!(flag.changed());

        let mut weight = HistorizedValue::new(0.5_f32);
        weight.set(0.5);
        assert!(!weight.changed());
    }

    #[test]
    fn serializes_both_slots() {
        let mut value = HistorizedValue::new(1);
        value.set(2);

        let json = serde_json::to_string(&value).unwrap();
        let restored: HistorizedValue<i32> = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, value);
        assert!(restored.changed());
    }
}
