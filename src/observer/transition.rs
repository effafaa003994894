//! Transition edge detection.

use super::slot::TransitionSlots;
use super::ObserverKey;
use crate::core::{HistorizedValue, LayerStatus, StateId, TransitionId, TransitionInfo};
use crate::manager::{SkippedLookup, TickReport};
use crate::metadata::ControllerMetadata;

/// Transition edges observed on one layer during one tick.
///
/// A layer can finish one transition and start another on the same tick,
/// in which case both `finished` and `started` are set.
///
/// # Example
///
/// ```rust
/// use animwatch::core::{HistorizedValue, TransitionId};
/// use animwatch::observer::TransitionEdges;
///
/// let mut hash = HistorizedValue::new(TransitionId::NONE);
/// hash.set(TransitionId(10));
/// hash.set(TransitionId(11));
///
/// let edges = TransitionEdges::detect(&hash);
/// assert_eq!(edges.finished, Some(TransitionId(10)));
/// assert_eq!(edges.started, Some(TransitionId(11)));
/// assert_eq!(edges.ongoing, None);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransitionEdges {
    pub finished: Option<TransitionId>,
    pub started: Option<TransitionId>,
    /// Running since an earlier tick
    pub ongoing: Option<TransitionId>,
}

impl TransitionEdges {
    pub fn detect(value: &HistorizedValue<TransitionId>) -> Self {
        let present = |id: TransitionId| (!id.is_none()).then_some(id);

        if value.changed() {
            Self {
                finished: present(value.previous()),
                started: present(value.current()),
                ongoing: None,
            }
        } else {
            Self {
                finished: None,
                started: None,
                ongoing: present(value.current()),
            }
        }
    }

    /// The transition in progress this tick, whether it just started or not.
    pub fn active(&self) -> Option<TransitionId> {
        self.started.or(self.ongoing)
    }
}

/// Which transitions a transition observer forwards.
#[derive(Clone, Copy, Debug)]
pub(super) enum TransitionFilter {
    Any,
    From(StateId),
    To(StateId),
    Between(StateId, StateId),
}

impl TransitionFilter {
    fn accepts(self, info: &TransitionInfo) -> bool {
        match self {
            TransitionFilter::Any => true,
            TransitionFilter::From(source) => info.leaves(source),
            TransitionFilter::To(dest) => info.arrives_at(dest),
            TransitionFilter::Between(source, dest) => info.leaves(source) && info.arrives_at(dest),
        }
    }
}

fn resolve<'m>(
    key: &ObserverKey,
    id: TransitionId,
    status: &LayerStatus,
    metadata: &'m ControllerMetadata,
    report: &mut TickReport,
) -> Option<&'m TransitionInfo> {
    let info = metadata.transition(id);
    if info.is_none() {
        report.skip(SkippedLookup::MissingTransition {
            observer: *key,
            layer: status.layer(),
            id,
        });
    }
    info
}

/// Fire finished, started, stay, then active for transitions the filter accepts.
pub(super) fn dispatch(
    key: &ObserverKey,
    filter: TransitionFilter,
    slots: &mut TransitionSlots,
    status: &LayerStatus,
    metadata: &ControllerMetadata,
    report: &mut TickReport,
) {
    let edges = TransitionEdges::detect(status.transition());

    if let Some(id) = edges.finished {
        if let Some(info) =
            resolve(key, id, status, metadata, report).filter(|info| filter.accepts(info))
        {
            report.callbacks_fired += slots.finished.fire(info, status);
        }
    }

    if let Some(id) = edges.active() {
        if let Some(info) =
            resolve(key, id, status, metadata, report).filter(|info| filter.accepts(info))
        {
            let mut fired = if edges.started.is_some() {
                slots.started.fire(info, status)
            } else {
                slots.stay.fire(info, status)
            };
            fired += slots.active.fire(info, status);
            report.callbacks_fired += fired;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LayerFilter, LayerSample};
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<(&'static str, TransitionId)>>>;

    fn metadata() -> ControllerMetadata {
        ControllerMetadata::from_parts(
            vec![],
            vec![
                TransitionInfo::new(
                    TransitionId(12),
                    "Idle -> Walk",
                    0,
                    "Base Layer",
                    StateId(1),
                    StateId(2),
                ),
                TransitionInfo::new(
                    TransitionId(21),
                    "Walk -> Idle",
                    0,
                    "Base Layer",
                    StateId(2),
                    StateId(1),
                ),
                TransitionInfo::new(
                    TransitionId(23),
                    "Walk -> Run",
                    0,
                    "Base Layer",
                    StateId(2),
                    StateId(3),
                ),
            ],
        )
    }

    fn key() -> ObserverKey {
        ObserverKey::AnyTransition {
            layer: LayerFilter::Any,
        }
    }

    fn logging_slots(log: &Log) -> TransitionSlots {
        let mut slots = TransitionSlots::new();
        for (slot, tag) in [
            (&mut slots.started, "started"),
            (&mut slots.finished, "finished"),
            (&mut slots.stay, "stay"),
            (&mut slots.active, "active"),
        ] {
            let log = Arc::clone(log);
            slot.add(Box::new(move |info: &TransitionInfo, _: &LayerStatus| {
                log.lock().unwrap().push((tag, info.id))
            }));
        }
        slots
    }

    fn run(filter: TransitionFilter, ticks: &[i32]) -> Vec<(&'static str, TransitionId)> {
        let log: Log = Arc::default();
        let mut slots = logging_slots(&log);
        let mut status = LayerStatus::new(0);
        let mut report = TickReport::default();
        for &raw in ticks {
            status.record(LayerSample::new(1, raw));
            dispatch(&key(), filter, &mut slots, &status, &metadata(), &mut report);
        }
        let entries = log.lock().unwrap().clone();
        entries
    }

    #[test]
    fn detect_idle_layer_has_no_edges() {
        let value = HistorizedValue::new(TransitionId::NONE);
        assert_eq!(TransitionEdges::detect(&value), TransitionEdges::default());
    }

    #[test]
    fn detect_ongoing_transition() {
        let mut value = HistorizedValue::new(TransitionId::NONE);
        value.set(TransitionId(5));
        value.set(TransitionId(5));
        let edges = TransitionEdges::detect(&value);
        assert_eq!(edges.ongoing, Some(TransitionId(5)));
        assert_eq!(edges.active(), Some(TransitionId(5)));
        assert_eq!(edges.started, None);
    }

    #[test]
    fn full_lifecycle_order() {
        let log = run(TransitionFilter::Any, &[0, 12, 12, 12, 0]);
        let t = TransitionId(12);
        assert_eq!(
            log,
            vec![
                ("started", t),
                ("active", t),
                ("stay", t),
                ("active", t),
                ("stay", t),
                ("active", t),
                ("finished", t),
            ]
        );
    }

    #[test]
    fn back_to_back_transitions_finish_then_start() {
        let log = run(TransitionFilter::Any, &[12, 23]);
        assert_eq!(
            log,
            vec![
                ("started", TransitionId(12)),
                ("active", TransitionId(12)),
                ("finished", TransitionId(12)),
                ("started", TransitionId(23)),
                ("active", TransitionId(23)),
            ]
        );
    }

    #[test]
    fn from_filter_matches_source_only() {
        let log = run(TransitionFilter::From(StateId(2)), &[12, 0, 21, 0, 23]);
        let started: Vec<_> = log
            .iter()
            .filter(|(tag, _)| *tag == "started")
            .map(|(_, id)| *id)
            .collect();
        assert_eq!(started, vec![TransitionId(21), TransitionId(23)]);
    }

    #[test]
    fn to_filter_matches_destination_only() {
        let log = run(TransitionFilter::To(StateId(1)), &[12, 21, 0]);
        assert_eq!(
            log,
            vec![
                ("started", TransitionId(21)),
                ("active", TransitionId(21)),
                ("finished", TransitionId(21)),
            ]
        );
    }

    #[test]
    fn between_filter_requires_both_endpoints() {
        let log = run(TransitionFilter::Between(StateId(2), StateId(3)), &[21, 23, 12]);
        assert_eq!(
            log,
            vec![
                ("started", TransitionId(23)),
                ("active", TransitionId(23)),
                ("finished", TransitionId(23)),
            ]
        );
    }

    #[test]
    fn missing_transition_is_skipped_once_per_lookup() {
        let log: Log = Arc::default();
        let mut slots = logging_slots(&log);
        let mut status = LayerStatus::new(0);
        let mut report = TickReport::default();

        status.record(LayerSample::new(1, 404));
        dispatch(&key(), TransitionFilter::Any, &mut slots, &status, &metadata(), &mut report);

        assert!(log.lock().unwrap().is_empty());
        assert_eq!(report.callbacks_fired, 0);
        assert_eq!(
            report.skipped,
            vec![SkippedLookup::MissingTransition {
                observer: key(),
                layer: 0,
                id: TransitionId(404),
            }]
        );
    }
}
