//! Observers: edge detection plus multicast callback slots.
//!
//! Each observer watches one or all layers for a particular kind of edge
//! and forwards matching events to its subscribers.
//!
//! # Variants
//!
//! - **AnyState**: `Change` whenever a layer enters a new state
//! - **SpecificState**: `Enter`, `Exit`, `Stay`, `Active` for one state
//! - **AnyTransition**: every transition start/finish/stay/active
//! - **TransitionFromState**: transitions leaving one state
//! - **TransitionToState**: transitions arriving at one state
//! - **SpecificTransition**: transitions between one source and one destination
//!
//! Observers are identified by their [`ObserverKey`]; the manager keeps at
//! most one observer per key, so repeated registration accumulates
//! subscribers instead of duplicating detection work.

use crate::core::{LayerFilter, LayerStatus, StateId, StateInfo, TransitionInfo};
use crate::manager::{SkippedLookup, TickReport};
use crate::metadata::ControllerMetadata;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod error;
mod slot;
mod state;
mod transition;

pub use error::ObserverError;
pub use slot::{
    Callback, CallbackSlot, EventSlot, StateEvent, StateSlots, SubscriptionId, TransitionEvent,
    TransitionSlots,
};
pub use state::StateEdge;
pub use transition::TransitionEdges;

use transition::TransitionFilter;

/// Observer variant tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObserverKind {
    AnyState,
    SpecificState,
    AnyTransition,
    TransitionFromState,
    TransitionToState,
    SpecificTransition,
}

impl ObserverKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AnyState => "AnyState",
            Self::SpecificState => "SpecificState",
            Self::AnyTransition => "AnyTransition",
            Self::TransitionFromState => "TransitionFromState",
            Self::TransitionToState => "TransitionToState",
            Self::SpecificTransition => "SpecificTransition",
        }
    }
}

impl fmt::Display for ObserverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Canonical identity of an observer.
///
/// # Example
///
/// ```rust
/// use animwatch::core::{LayerFilter, StateId};
/// use animwatch::observer::ObserverKey;
///
/// let key = ObserverKey::SpecificState {
///     layer: LayerFilter::Index(0),
///     state: StateId(1),
/// };
/// assert_eq!(key.to_string(), "SpecificState:0:1");
///
/// let any = ObserverKey::AnyTransition { layer: LayerFilter::Any };
/// assert_eq!(any.to_string(), "AnyTransition:*");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObserverKey {
    AnyState {
        layer: LayerFilter,
    },
    SpecificState {
        layer: LayerFilter,
        state: StateId,
    },
    AnyTransition {
        layer: LayerFilter,
    },
    TransitionFromState {
        layer: LayerFilter,
        source: StateId,
    },
    TransitionToState {
        layer: LayerFilter,
        dest: StateId,
    },
    SpecificTransition {
        layer: LayerFilter,
        source: StateId,
        dest: StateId,
    },
}

impl ObserverKey {
    pub fn kind(&self) -> ObserverKind {
        match self {
            Self::AnyState { .. } => ObserverKind::AnyState,
            Self::SpecificState { .. } => ObserverKind::SpecificState,
            Self::AnyTransition { .. } => ObserverKind::AnyTransition,
            Self::TransitionFromState { .. } => ObserverKind::TransitionFromState,
            Self::TransitionToState { .. } => ObserverKind::TransitionToState,
            Self::SpecificTransition { .. } => ObserverKind::SpecificTransition,
        }
    }

    pub fn layer(&self) -> LayerFilter {
        match *self {
            Self::AnyState { layer }
            | Self::SpecificState { layer, .. }
            | Self::AnyTransition { layer }
            | Self::TransitionFromState { layer, .. }
            | Self::TransitionToState { layer, .. }
            | Self::SpecificTransition { layer, .. } => layer,
        }
    }
}

impl fmt::Display for ObserverKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.layer())?;
        match self {
            Self::AnyState { .. } | Self::AnyTransition { .. } => Ok(()),
            Self::SpecificState { state: id, .. }
            | Self::TransitionFromState { source: id, .. }
            | Self::TransitionToState { dest: id, .. } => write!(f, ":{id}"),
            Self::SpecificTransition { source, dest, .. } => write!(f, ":{source}:{dest}"),
        }
    }
}

/// A registered observer and its subscribers.
#[derive(Debug)]
pub enum Observer {
    AnyState {
        layer: LayerFilter,
        on_change: CallbackSlot<StateInfo>,
    },
    SpecificState {
        layer: LayerFilter,
        state: StateId,
        slots: StateSlots,
    },
    AnyTransition {
        layer: LayerFilter,
        slots: TransitionSlots,
    },
    TransitionFromState {
        layer: LayerFilter,
        source: StateId,
        slots: TransitionSlots,
    },
    TransitionToState {
        layer: LayerFilter,
        dest: StateId,
        slots: TransitionSlots,
    },
    SpecificTransition {
        layer: LayerFilter,
        source: StateId,
        dest: StateId,
        slots: TransitionSlots,
    },
}

impl Observer {
    /// Create an observer with empty slots for `key`.
    pub fn new(key: ObserverKey) -> Self {
        match key {
            ObserverKey::AnyState { layer } => Observer::AnyState {
                layer,
                on_change: CallbackSlot::new(EventSlot::State(StateEvent::Change)),
            },
            ObserverKey::SpecificState { layer, state } => Observer::SpecificState {
                layer,
                state,
                slots: StateSlots::new(),
            },
            ObserverKey::AnyTransition { layer } => Observer::AnyTransition {
                layer,
                slots: TransitionSlots::new(),
            },
            ObserverKey::TransitionFromState { layer, source } => Observer::TransitionFromState {
                layer,
                source,
                slots: TransitionSlots::new(),
            },
            ObserverKey::TransitionToState { layer, dest } => Observer::TransitionToState {
                layer,
                dest,
                slots: TransitionSlots::new(),
            },
            ObserverKey::SpecificTransition {
                layer,
                source,
                dest,
            } => Observer::SpecificTransition {
                layer,
                source,
                dest,
                slots: TransitionSlots::new(),
            },
        }
    }

    pub fn key(&self) -> ObserverKey {
        match *self {
            Observer::AnyState { layer, .. } => ObserverKey::AnyState { layer },
            Observer::SpecificState { layer, state, .. } => {
                ObserverKey::SpecificState { layer, state }
            }
            Observer::AnyTransition { layer, .. } => ObserverKey::AnyTransition { layer },
            Observer::TransitionFromState { layer, source, .. } => {
                ObserverKey::TransitionFromState { layer, source }
            }
            Observer::TransitionToState { layer, dest, .. } => {
                ObserverKey::TransitionToState { layer, dest }
            }
            Observer::SpecificTransition {
                layer,
                source,
                dest,
                ..
            } => ObserverKey::SpecificTransition {
                layer,
                source,
                dest,
            },
        }
    }

    pub fn kind(&self) -> ObserverKind {
        self.key().kind()
    }

    /// Subscribe a state callback to `event`.
    ///
    /// Fails when this observer does not report that event, including
    /// every state event on a transition observer.
    pub fn subscribe_state<F>(
        &mut self,
        event: StateEvent,
        callback: F,
    ) -> Result<SubscriptionId, ObserverError>
    where
        F: FnMut(&StateInfo, &LayerStatus) + Send + 'static,
    {
        let kind = self.kind();
        let slot = match (self, event) {
            (Observer::AnyState { on_change, .. }, StateEvent::Change) => Some(on_change),
            (Observer::SpecificState { slots, .. }, event) => slots.get_mut(event),
            _ => None,
        };
        let slot = slot.ok_or(ObserverError::UnsupportedEvent {
            kind,
            event: EventSlot::State(event),
        })?;
        Ok(slot.add(Box::new(callback)))
    }

    /// Subscribe a transition callback to `event`.
    pub fn subscribe_transition<F>(
        &mut self,
        event: TransitionEvent,
        callback: F,
    ) -> Result<SubscriptionId, ObserverError>
    where
        F: FnMut(&TransitionInfo, &LayerStatus) + Send + 'static,
    {
        let kind = self.kind();
        let slots = self
            .transition_slots_mut()
            .ok_or(ObserverError::UnsupportedEvent {
                kind,
                event: EventSlot::Transition(event),
            })?;
        Ok(slots.get_mut(event).add(Box::new(callback)))
    }

    pub fn on_change<F>(&mut self, callback: F) -> Result<SubscriptionId, ObserverError>
    where
        F: FnMut(&StateInfo, &LayerStatus) + Send + 'static,
    {
        self.subscribe_state(StateEvent::Change, callback)
    }

    pub fn on_enter<F>(&mut self, callback: F) -> Result<SubscriptionId, ObserverError>
    where
        F: FnMut(&StateInfo, &LayerStatus) + Send + 'static,
    {
        self.subscribe_state(StateEvent::Enter, callback)
    }

    pub fn on_exit<F>(&mut self, callback: F) -> Result<SubscriptionId, ObserverError>
    where
        F: FnMut(&StateInfo, &LayerStatus) + Send + 'static,
    {
        self.subscribe_state(StateEvent::Exit, callback)
    }

    pub fn on_started<F>(&mut self, callback: F) -> Result<SubscriptionId, ObserverError>
    where
        F: FnMut(&TransitionInfo, &LayerStatus) + Send + 'static,
    {
        self.subscribe_transition(TransitionEvent::Started, callback)
    }

    pub fn on_finished<F>(&mut self, callback: F) -> Result<SubscriptionId, ObserverError>
    where
        F: FnMut(&TransitionInfo, &LayerStatus) + Send + 'static,
    {
        self.subscribe_transition(TransitionEvent::Finished, callback)
    }

    /// Remove a subscription. Returns `false` if it was not registered here.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        match (self, id.slot()) {
            (Observer::AnyState { on_change, .. }, EventSlot::State(_)) => on_change.remove(id),
            (Observer::SpecificState { slots, .. }, EventSlot::State(event)) => {
                slots.get_mut(event).is_some_and(|slot| slot.remove(id))
            }
            (observer, EventSlot::Transition(event)) => observer
                .transition_slots_mut()
                .is_some_and(|slots| slots.get_mut(event).remove(id)),
            _ => false,
        }
    }

    /// Total subscribers across all slots.
    pub fn subscriber_count(&self) -> usize {
        match self {
            Observer::AnyState { on_change, .. } => on_change.len(),
            Observer::SpecificState { slots, .. } => slots.len(),
            Observer::AnyTransition { slots, .. }
            | Observer::TransitionFromState { slots, .. }
            | Observer::TransitionToState { slots, .. }
            | Observer::SpecificTransition { slots, .. } => slots.len(),
        }
    }

    fn transition_slots_mut(&mut self) -> Option<&mut TransitionSlots> {
        match self {
            Observer::AnyTransition { slots, .. }
            | Observer::TransitionFromState { slots, .. }
            | Observer::TransitionToState { slots, .. }
            | Observer::SpecificTransition { slots, .. } => Some(slots),
            Observer::AnyState { .. } | Observer::SpecificState { .. } => None,
        }
    }

    /// Run edge detection against the refreshed layer statuses and fire
    /// the matching slots.
    ///
    /// Stale references are logged, recorded in `report` and skipped; this
    /// never fails.
    pub fn perform(
        &mut self,
        statuses: &[LayerStatus],
        metadata: &ControllerMetadata,
        report: &mut TickReport,
    ) {
        if self.subscriber_count() == 0 {
            return;
        }

        let key = self.key();
        match key.layer() {
            LayerFilter::Any => {
                for status in statuses {
                    self.perform_layer(&key, status, metadata, report);
                }
            }
            LayerFilter::Index(layer) => match statuses.get(layer) {
                Some(status) => self.perform_layer(&key, status, metadata, report),
                None => report.skip(SkippedLookup::MissingLayer { observer: key, layer }),
            },
        }
    }

    fn perform_layer(
        &mut self,
        key: &ObserverKey,
        status: &LayerStatus,
        metadata: &ControllerMetadata,
        report: &mut TickReport,
    ) {
        match self {
            Observer::AnyState { on_change, .. } => {
                state::any_state(key, on_change, status, metadata, report)
            }
            Observer::SpecificState { state, slots, .. } => {
                state::specific_state(key, *state, slots, status, metadata, report)
            }
            Observer::AnyTransition { slots, .. } => {
                transition::dispatch(key, TransitionFilter::Any, slots, status, metadata, report)
            }
            Observer::TransitionFromState { source, slots, .. } => transition::dispatch(
                key,
                TransitionFilter::From(*source),
                slots,
                status,
                metadata,
                report,
            ),
            Observer::TransitionToState { dest, slots, .. } => transition::dispatch(
                key,
                TransitionFilter::To(*dest),
                slots,
                status,
                metadata,
                report,
            ),
            Observer::SpecificTransition {
                source,
                dest,
                slots,
                ..
            } => transition::dispatch(
                key,
                TransitionFilter::Between(*source, *dest),
                slots,
                status,
                metadata,
                report,
            ),
        }
    }
}
