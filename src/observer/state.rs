//! State edge detection.
//!
//! For a watched state `S`, each layer is a two-state machine
//! {outside `S`, inside `S`}; comparing the current and previous polled
//! hash classifies the tick.

use super::slot::{CallbackSlot, StateSlots};
use super::ObserverKey;
use crate::core::{HistorizedValue, LayerStatus, StateId, StateInfo};
use crate::manager::{SkippedLookup, TickReport};
use crate::metadata::ControllerMetadata;

/// Classification of one tick relative to a watched state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateEdge {
    /// First tick in the state
    Entered,
    /// Second or later consecutive tick in the state
    Continuing,
    /// First tick after leaving the state
    Exited,
    /// Not in the state now or on the previous tick
    Outside,
}

impl StateEdge {
    /// Classify `value` relative to `watched`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use animwatch::core::{HistorizedValue, StateId};
    /// use animwatch::observer::StateEdge;
    ///
    /// let mut hash = HistorizedValue::new(StateId::NONE);
    /// hash.set(StateId(1));
    /// assert_eq!(StateEdge::classify(&hash, StateId(1)), StateEdge::Entered);
    /// hash.set(StateId(1));
    /// assert_eq!(StateEdge::classify(&hash, StateId(1)), StateEdge::Continuing);
    /// hash.set(StateId(2));
    /// assert_eq!(StateEdge::classify(&hash, StateId(1)), StateEdge::Exited);
    /// ```
    pub fn classify(value: &HistorizedValue<StateId>, watched: StateId) -> Self {
        match (value.current() == watched, value.previous() == watched) {
            (true, false) => StateEdge::Entered,
            (true, true) => StateEdge::Continuing,
            (false, true) => StateEdge::Exited,
            (false, false) => StateEdge::Outside,
        }
    }
}

fn resolve<'m>(
    key: &ObserverKey,
    id: StateId,
    status: &LayerStatus,
    metadata: &'m ControllerMetadata,
    report: &mut TickReport,
) -> Option<&'m StateInfo> {
    let info = metadata.state(id);
    if info.is_none() {
        report.skip(SkippedLookup::MissingState {
            observer: *key,
            layer: status.layer(),
            id,
        });
    }
    info
}

/// Fire `on_change` when the layer has just entered a new state.
pub(super) fn any_state(
    key: &ObserverKey,
    on_change: &mut CallbackSlot<StateInfo>,
    status: &LayerStatus,
    metadata: &ControllerMetadata,
    report: &mut TickReport,
) {
    let state = status.state();
    if !state.changed() || state.current().is_none() {
        return;
    }

    if let Some(info) = resolve(key, state.current(), status, metadata, report) {
        report.callbacks_fired += on_change.fire(info, status);
    }
}

/// Fire exit, enter, stay, then active for the watched state.
///
/// Watching `StateId::NONE` never fires: it is the idle sentinel, not a state.
pub(super) fn specific_state(
    key: &ObserverKey,
    watched: StateId,
    slots: &mut StateSlots,
    status: &LayerStatus,
    metadata: &ControllerMetadata,
    report: &mut TickReport,
) {
    if watched.is_none() {
        return;
    }

    let edge = StateEdge::classify(status.state(), watched);
    if edge == StateEdge::Outside {
        return;
    }

    // On exit the just-left state is `watched`, so one lookup covers every edge.
    let Some(info) = resolve(key, watched, status, metadata, report) else {
        return;
    };

    let fired = match edge {
        StateEdge::Exited => slots.exit.fire(info, status),
        StateEdge::Entered => slots.enter.fire(info, status) + slots.active.fire(info, status),
        StateEdge::Continuing => slots.stay.fire(info, status) + slots.active.fire(info, status),
        StateEdge::Outside => 0,
    };
    report.callbacks_fired += fired;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LayerFilter, LayerSample};
    use crate::observer::{EventSlot, StateEvent};
    use std::sync::{Arc, Mutex};

    fn metadata() -> ControllerMetadata {
        ControllerMetadata::from_parts(
            vec![
                StateInfo::new(StateId(1), "Idle", 0, "Base Layer"),
                StateInfo::new(StateId(2), "Walk", 0, "Base Layer"),
            ],
            vec![],
        )
    }

    fn key() -> ObserverKey {
        ObserverKey::SpecificState {
            layer: LayerFilter::Index(0),
            state: StateId(1),
        }
    }

    #[test]
    fn classify_covers_all_four_cases() {
        let mut value = HistorizedValue::new(StateId(2));
        assert_eq!(StateEdge::classify(&value, StateId(1)), StateEdge::Outside);
        value.set(StateId(1));
        assert_eq!(StateEdge::classify(&value, StateId(1)), StateEdge::Entered);
        value.set(StateId(1));
        assert_eq!(StateEdge::classify(&value, StateId(1)), StateEdge::Continuing);
        value.set(StateId(2));
        assert_eq!(StateEdge::classify(&value, StateId(1)), StateEdge::Exited);
    }

    #[test]
    fn entry_tick_fires_enter_then_active() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut slots = StateSlots::new();
        for (slot, tag) in [
            (&mut slots.active, "active"),
            (&mut slots.enter, "enter"),
            (&mut slots.stay, "stay"),
        ] {
            let log = Arc::clone(&log);
            slot.add(Box::new(move |_: &StateInfo, _: &LayerStatus| {
                log.lock().unwrap().push(tag)
            }));
        }

        let mut status = LayerStatus::new(0);
        let mut report = TickReport::default();

        status.record(LayerSample::settled(1));
        specific_state(&key(), StateId(1), &mut slots, &status, &metadata(), &mut report);
        assert_eq!(*log.lock().unwrap(), vec!["enter", "active"]);

        status.record(LayerSample::settled(1));
        specific_state(&key(), StateId(1), &mut slots, &status, &metadata(), &mut report);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["enter", "active", "stay", "active"]
        );
        assert_eq!(report.callbacks_fired, 4);
    }

    #[test]
    fn exit_reports_the_left_state() {
        let left = Arc::new(Mutex::new(None));
        let mut slots = StateSlots::new();
        let sink = Arc::clone(&left);
        slots.exit.add(Box::new(move |info: &StateInfo, status: &LayerStatus| {
            *sink.lock().unwrap() = Some((info.name.clone(), status.state().current()));
        }));

        let mut status = LayerStatus::new(0);
        let mut report = TickReport::default();
        status.record(LayerSample::settled(1));
        status.record(LayerSample::settled(2));
        specific_state(&key(), StateId(1), &mut slots, &status, &metadata(), &mut report);

        assert_eq!(
            *left.lock().unwrap(),
            Some(("Idle".to_string(), StateId(2)))
        );
    }

    #[test]
    fn any_state_ignores_sentinel_and_unchanged_ticks() {
        let count = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&count);
        let mut on_change = CallbackSlot::<StateInfo>::new(EventSlot::State(StateEvent::Change));
        on_change.add(Box::new(move |_: &StateInfo, _: &LayerStatus| {
            *sink.lock().unwrap() += 1
        }));

        let any = ObserverKey::AnyState {
            layer: LayerFilter::Any,
        };
        let mut status = LayerStatus::new(0);
        let mut report = TickReport::default();
        for raw in [0, 1, 1, 2, 0, 0] {
            status.record(LayerSample::settled(raw));
            any_state(&any, &mut on_change, &status, &metadata(), &mut report);
        }

        assert_eq!(*count.lock().unwrap(), 2);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn missing_state_is_skipped_and_recorded() {
        let mut slots = StateSlots::new();
        slots
            .enter
            .add(Box::new(|_: &StateInfo, _: &LayerStatus| panic!("must not fire")));

        let ghost = ObserverKey::SpecificState {
            layer: LayerFilter::Index(0),
            state: StateId(99),
        };
        let mut status = LayerStatus::new(0);
        let mut report = TickReport::default();
        status.record(LayerSample::settled(99));
        specific_state(&ghost, StateId(99), &mut slots, &status, &metadata(), &mut report);

        assert_eq!(report.callbacks_fired, 0);
        assert_eq!(
            report.skipped,
            vec![SkippedLookup::MissingState {
                observer: ghost,
                layer: 0,
                id: StateId(99),
            }]
        );
    }

    #[test]
    fn watching_the_sentinel_never_fires_or_warns() {
        let mut slots = StateSlots::new();
        for slot in [&mut slots.enter, &mut slots.stay, &mut slots.exit, &mut slots.active] {
            slot.add(Box::new(|_: &StateInfo, _: &LayerStatus| panic!("must not fire")));
        }

        let none = ObserverKey::SpecificState {
            layer: LayerFilter::Index(0),
            state: StateId::NONE,
        };
        let mut status = LayerStatus::new(0);
        let mut report = TickReport::default();
        for raw in [0, 0, 1, 0] {
            status.record(LayerSample::settled(raw));
            specific_state(&none, StateId::NONE, &mut slots, &status, &metadata(), &mut report);
        }

        assert_eq!(report.callbacks_fired, 0);
        assert!(report.skipped.is_empty());
    }
}
