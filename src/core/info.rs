//! Identity newtypes and immutable metadata records.
//!
//! State and transition ids are opaque 32-bit hashes produced by whoever
//! loads the controller description. The value `0` is reserved for
//! "no state" and "no active transition".

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hash id of a state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(pub i32);

impl StateId {
    /// Sentinel for "no state".
    pub const NONE: StateId = StateId(0);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl From<i32> for StateId {
    fn from(raw: i32) -> Self {
        StateId(raw)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hash id of a transition.
///
/// Distinct from the ids of the two states it connects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionId(pub i32);

impl TransitionId {
    /// Sentinel for "no active transition".
    pub const NONE: TransitionId = TransitionId(0);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl From<i32> for TransitionId {
    fn from(raw: i32) -> Self {
        TransitionId(raw)
    }
}

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata describing one state.
///
/// # Example
///
/// ```rust
/// use animwatch::core::{StateId, StateInfo};
///
/// let idle = StateInfo::new(StateId(1), "Idle", 0, "Base Layer");
/// assert_eq!(idle.full_name(), "Base Layer.Idle");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateInfo {
    pub id: StateId,
    pub name: String,
    pub layer: usize,
    pub layer_name: String,
}

impl StateInfo {
    pub fn new(
        id: StateId,
        name: impl Into<String>,
        layer: usize,
        layer_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            layer,
            layer_name: layer_name.into(),
        }
    }

    /// Dotted `"LayerName.StateName"` form the id hash is derived from.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.layer_name, self.name)
    }
}

/// Metadata describing one transition between two states of a layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionInfo {
    pub id: TransitionId,
    pub name: String,
    pub layer: usize,
    pub layer_name: String,
    pub source: StateId,
    pub dest: StateId,
    /// Whether the transition can be interrupted.
    pub atomic: bool,
    /// Blend duration, in the units the controller uses.
    pub duration: f32,
    pub mute: bool,
    /// Normalized start offset into the destination state.
    pub offset: f32,
    pub solo: bool,
}

impl TransitionInfo {
    /// Create a transition record with default timing and flags.
    pub fn new(
        id: TransitionId,
        name: impl Into<String>,
        layer: usize,
        layer_name: impl Into<String>,
        source: StateId,
        dest: StateId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            layer,
            layer_name: layer_name.into(),
            source,
            dest,
            atomic: false,
            duration: 0.0,
            mute: false,
            offset: 0.0,
            solo: false,
        }
    }

    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    pub fn atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    pub fn muted(mut self, mute: bool) -> Self {
        self.mute = mute;
        self
    }

    pub fn solo(mut self, solo: bool) -> Self {
        self.solo = solo;
        self
    }

    /// Whether this transition leaves `state`.
    pub fn leaves(&self, state: StateId) -> bool {
        self.source == state
    }

    /// Whether this transition arrives at `state`.
    pub fn arrives_at(&self, state: StateId) -> bool {
        self.dest == state
    }
}
