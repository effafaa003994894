//! Multicast callback slots and subscription handles.

use crate::core::{LayerStatus, StateInfo, TransitionInfo};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Sequence numbers are drawn from one counter, so no two subscriptions
/// anywhere share a handle.
static NEXT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Callback invoked with the resolved record and the layer it happened on.
pub type Callback<I> = Box<dyn FnMut(&I, &LayerStatus) + Send>;

/// Events a state observer can report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateEvent {
    /// Any state was entered (any-state observers only)
    Change,
    Enter,
    Exit,
    /// Second and later consecutive ticks in the state
    Stay,
    /// Every tick in the state, including the entry tick
    Active,
}

/// Events a transition observer can report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionEvent {
    Started,
    Finished,
    /// Second and later consecutive ticks of the transition
    Stay,
    /// Every tick of the transition, including the start tick
    Active,
}

/// Either kind of event, as named in subscription handles and errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventSlot {
    State(StateEvent),
    Transition(TransitionEvent),
}

impl fmt::Display for EventSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventSlot::State(StateEvent::Change) => "change",
            EventSlot::State(StateEvent::Enter) => "enter",
            EventSlot::State(StateEvent::Exit) => "exit",
            EventSlot::State(StateEvent::Stay) => "state stay",
            EventSlot::State(StateEvent::Active) => "state active",
            EventSlot::Transition(TransitionEvent::Started) => "started",
            EventSlot::Transition(TransitionEvent::Finished) => "finished",
            EventSlot::Transition(TransitionEvent::Stay) => "transition stay",
            EventSlot::Transition(TransitionEvent::Active) => "transition active",
        };
        f.write_str(name)
    }
}

/// Handle returned by a subscribe call.
///
/// Handles are unique per process: removing by handle is unambiguous even
/// when the same closure was subscribed twice, and a handle issued by one
/// observer never matches a subscriber of another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId {
    slot: EventSlot,
    seq: u64,
}

impl SubscriptionId {
    pub fn slot(&self) -> EventSlot {
        self.slot
    }
}

/// Ordered list of subscribers for one event.
pub struct CallbackSlot<I> {
    slot: EventSlot,
    callbacks: BTreeMap<u64, Callback<I>>,
}

impl<I> CallbackSlot<I> {
    pub(crate) fn new(slot: EventSlot) -> Self {
        Self {
            slot,
            callbacks: BTreeMap::new(),
        }
    }

    pub(crate) fn add(&mut self, callback: Callback<I>) -> SubscriptionId {
        let seq = NEXT_SEQ.fetch_add(1, Ordering::Relaxed);
        self.callbacks.insert(seq, callback);
        SubscriptionId {
            slot: self.slot,
            seq,
        }
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        id.slot == self.slot && self.callbacks.remove(&id.seq).is_some()
    }

    /// Invoke every subscriber in subscription order, returning how many ran.
    pub(crate) fn fire(&mut self, info: &I, status: &LayerStatus) -> usize {
        for callback in self.callbacks.values_mut() {
            callback(info, status);
        }
        self.callbacks.len()
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl<I> fmt::Debug for CallbackSlot<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackSlot")
            .field("slot", &self.slot)
            .field("subscribers", &self.callbacks.len())
            .finish()
    }
}

/// Slots of a specific-state observer.
#[derive(Debug)]
pub struct StateSlots {
    pub(crate) enter: CallbackSlot<StateInfo>,
    pub(crate) exit: CallbackSlot<StateInfo>,
    pub(crate) stay: CallbackSlot<StateInfo>,
    pub(crate) active: CallbackSlot<StateInfo>,
}

impl StateSlots {
    pub(crate) fn new() -> Self {
        Self {
            enter: CallbackSlot::new(EventSlot::State(StateEvent::Enter)),
            exit: CallbackSlot::new(EventSlot::State(StateEvent::Exit)),
            stay: CallbackSlot::new(EventSlot::State(StateEvent::Stay)),
            active: CallbackSlot::new(EventSlot::State(StateEvent::Active)),
        }
    }

    pub(crate) fn get_mut(&mut self, event: StateEvent) -> Option<&mut CallbackSlot<StateInfo>> {
        match event {
            StateEvent::Enter => Some(&mut self.enter),
            StateEvent::Exit => Some(&mut self.exit),
            StateEvent::Stay => Some(&mut self.stay),
            StateEvent::Active => Some(&mut self.active),
            StateEvent::Change => None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.enter.len() + self.exit.len() + self.stay.len() + self.active.len()
    }
}

/// Slots shared by every transition observer.
#[derive(Debug)]
pub struct TransitionSlots {
    pub(crate) started: CallbackSlot<TransitionInfo>,
    pub(crate) finished: CallbackSlot<TransitionInfo>,
    pub(crate) stay: CallbackSlot<TransitionInfo>,
    pub(crate) active: CallbackSlot<TransitionInfo>,
}

impl TransitionSlots {
    pub(crate) fn new() -> Self {
        Self {
            started: CallbackSlot::new(EventSlot::Transition(TransitionEvent::Started)),
            finished: CallbackSlot::new(EventSlot::Transition(TransitionEvent::Finished)),
            stay: CallbackSlot::new(EventSlot::Transition(TransitionEvent::Stay)),
            active: CallbackSlot::new(EventSlot::Transition(TransitionEvent::Active)),
        }
    }

    pub(crate) fn get_mut(&mut self, event: TransitionEvent) -> &mut CallbackSlot<TransitionInfo> {
        match event {
            TransitionEvent::Started => &mut self.started,
            TransitionEvent::Finished => &mut self.finished,
            TransitionEvent::Stay => &mut self.stay,
            TransitionEvent::Active => &mut self.active,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.started.len() + self.finished.len() + self.stay.len() + self.active.len()
    }
}
