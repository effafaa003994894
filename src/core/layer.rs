//! Per-layer polled status.

use super::history::HistorizedValue;
use super::info::{StateId, TransitionId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One polled snapshot of a layer: the active state and the active
/// transition (`TransitionId::NONE` when none is in progress).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSample {
    pub state: StateId,
    pub transition: TransitionId,
}

impl LayerSample {
    pub fn new(state: impl Into<StateId>, transition: impl Into<TransitionId>) -> Self {
        Self {
            state: state.into(),
            transition: transition.into(),
        }
    }

    /// Sample for a layer resting in `state` with no transition running.
    pub fn settled(state: impl Into<StateId>) -> Self {
        Self::new(state, TransitionId::NONE)
    }
}

impl From<(i32, i32)> for LayerSample {
    fn from((state, transition): (i32, i32)) -> Self {
        Self::new(state, transition)
    }
}

/// Historized state and transition hashes for one layer.
///
/// Written once per tick by the manager; observers only read it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerStatus {
    layer: usize,
    state: HistorizedValue<StateId>,
    transition: HistorizedValue<TransitionId>,
}

impl LayerStatus {
    /// Create the status of layer `layer` with both cells at the sentinel.
    pub fn new(layer: usize) -> Self {
        Self {
            layer,
            state: HistorizedValue::new(StateId::NONE),
            transition: HistorizedValue::new(TransitionId::NONE),
        }
    }

    pub fn layer(&self) -> usize {
        self.layer
    }

    pub fn state(&self) -> &HistorizedValue<StateId> {
        &self.state
    }

    pub fn transition(&self) -> &HistorizedValue<TransitionId> {
        &self.transition
    }

    /// Whether a transition is in progress on this layer right now.
    pub fn in_transition(&self) -> bool {
        !self.transition.current().is_none()
    }

    pub(crate) fn record(&mut self, sample: LayerSample) {
        self.state.set(sample.state);
        self.transition.set(sample.transition);
    }
}

/// Which layers an observer watches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerFilter {
    #[default]
    Any,
    Index(usize),
}

impl LayerFilter {
    /// Map a raw layer index, where any negative value means "every layer".
    pub fn from_raw(raw: i32) -> Self {
        usize::try_from(raw).map_or(LayerFilter::Any, LayerFilter::Index)
    }

    pub fn matches(self, layer: usize) -> bool {
        match self {
            LayerFilter::Any => true,
            LayerFilter::Index(index) => index == layer,
        }
    }
}

impl From<usize> for LayerFilter {
    fn from(index: usize) -> Self {
        LayerFilter::Index(index)
    }
}

impl From<i32> for LayerFilter {
    fn from(raw: i32) -> Self {
        LayerFilter::from_raw(raw)
    }
}

impl fmt::Display for LayerFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerFilter::Any => f.write_str("*"),
            LayerFilter::Index(index) => write!(f, "{index}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_status_starts_at_sentinel() {
        let status = LayerStatus::new(2);
        assert_eq!(status.layer(), 2);
        assert_eq!(status.state().current(), StateId::NONE);
        assert_eq!(status.transition().current(), TransitionId::NONE);
        assert!(!status.state().changed());
        assert!(!status.in_transition());
    }

    #[test]
    fn record_updates_both_cells() {
        let mut status = LayerStatus::new(0);
        status.record(LayerSample::new(1, 0));
        status.record(LayerSample::new(1, 40));

        assert!(!status.state().changed());
        assert!(status.transition().changed());
        assert_eq!(status.transition().current(), TransitionId(40));
        assert!(status.in_transition());
    }

    #[test]
    fn negative_raw_layer_means_any() {
        assert_eq!(LayerFilter::from_raw(-1), LayerFilter::Any);
        assert_eq!(LayerFilter::from_raw(3), LayerFilter::Index(3));
        assert!(LayerFilter::Any.matches(9));
        assert!(LayerFilter::Index(1).matches(1));
        assert!(!LayerFilter::Index(1).matches(0));
        assert_eq!(LayerFilter::from(-1), LayerFilter::Any);
        assert_eq!(LayerFilter::from(2usize), LayerFilter::Index(2));
    }

    #[test]
    fn layer_filter_display() {
        assert_eq!(LayerFilter::Any.to_string(), "*");
        assert_eq!(LayerFilter::Index(4).to_string(), "4");
    }

    #[test]
    fn sample_from_tuple() {
        let sample: LayerSample = (5, 9).into();
        assert_eq!(sample.state, StateId(5));
        assert_eq!(sample.transition, TransitionId(9));
        assert_eq!(LayerSample::settled(5).transition, TransitionId::NONE);
    }
}
