//! Per-tick dispatch summary.

use crate::core::{StateId, TransitionId};
use crate::observer::ObserverKey;
use std::fmt;

/// A callback invocation skipped because its reference was stale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkippedLookup {
    MissingState {
        observer: ObserverKey,
        layer: usize,
        id: StateId,
    },
    MissingTransition {
        observer: ObserverKey,
        layer: usize,
        id: TransitionId,
    },
    /// The observer filters on a layer the machine does not have.
    MissingLayer { observer: ObserverKey, layer: usize },
}

impl SkippedLookup {
    pub fn observer(&self) -> ObserverKey {
        match *self {
            SkippedLookup::MissingState { observer, .. }
            | SkippedLookup::MissingTransition { observer, .. }
            | SkippedLookup::MissingLayer { observer, .. } => observer,
        }
    }
}

impl fmt::Display for SkippedLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkippedLookup::MissingState {
                observer,
                layer,
                id,
            } => write!(f, "{observer}: state {id} on layer {layer} not found in metadata"),
            SkippedLookup::MissingTransition {
                observer,
                layer,
                id,
            } => write!(
                f,
                "{observer}: transition {id} on layer {layer} not found in metadata"
            ),
            SkippedLookup::MissingLayer { observer, layer } => {
                write!(f, "{observer}: layer {layer} does not exist")
            }
        }
    }
}

/// What one call to `tick` did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Zero-based index of this tick
    pub tick: u64,
    pub layers_polled: usize,
    pub observers_performed: usize,
    pub callbacks_fired: usize,
    pub skipped: Vec<SkippedLookup>,
}

impl TickReport {
    pub(crate) fn new(tick: u64) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }

    /// Log a stale reference and record it.
    pub(crate) fn skip(&mut self, lookup: SkippedLookup) {
        tracing::warn!(tick = self.tick, "{lookup}; callbacks skipped");
        self.skipped.push(lookup);
    }

    /// Whether every lookup this tick succeeded.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}
