//! Controller metadata tables.
//!
//! The dispatcher never discovers states or transitions on its own. A
//! loader extracts them from the controller description and hands them
//! over as a [`ControllerMetadata`], either built in code or decoded from
//! JSON or bincode. After [`EventManager::initialize`] the tables are
//! read-only.
//!
//! [`EventManager::initialize`]: crate::manager::EventManager::initialize

use crate::core::{StateId, StateInfo, TransitionId, TransitionInfo};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod error;
pub mod validation;

pub use error::{MetadataError, MetadataViolation};

/// Wire form of the metadata tables.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct MetadataDocument {
    states: Vec<StateInfo>,
    transitions: Vec<TransitionInfo>,
}

/// Lookup tables `id -> StateInfo` and `id -> TransitionInfo`.
///
/// # Example
///
/// ```rust
/// use animwatch::core::{StateId, StateInfo};
/// use animwatch::metadata::ControllerMetadata;
///
/// let mut metadata = ControllerMetadata::new();
/// metadata.insert_state(StateInfo::new(StateId(1), "Idle", 0, "Base Layer"));
///
/// assert_eq!(metadata.name_of(1), "Idle");
/// assert_eq!(metadata.name_of(999), "");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "MetadataDocument", into = "MetadataDocument")]
pub struct ControllerMetadata {
    states: HashMap<StateId, StateInfo>,
    transitions: HashMap<TransitionId, TransitionInfo>,
}

impl ControllerMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build tables from record lists. Later duplicates replace earlier ones.
    pub fn from_parts(
        states: impl IntoIterator<Item = StateInfo>,
        transitions: impl IntoIterator<Item = TransitionInfo>,
    ) -> Self {
        let mut metadata = Self::new();
        for state in states {
            metadata.insert_state(state);
        }
        for transition in transitions {
            metadata.insert_transition(transition);
        }
        metadata
    }

    /// Add or replace a state record, returning the one it replaced.
    pub fn insert_state(&mut self, info: StateInfo) -> Option<StateInfo> {
        self.states.insert(info.id, info)
    }

    /// Add or replace a transition record, returning the one it replaced.
    pub fn insert_transition(&mut self, info: TransitionInfo) -> Option<TransitionInfo> {
        self.transitions.insert(info.id, info)
    }

    pub fn state(&self, id: StateId) -> Option<&StateInfo> {
        self.states.get(&id)
    }

    pub fn transition(&self, id: TransitionId) -> Option<&TransitionInfo> {
        self.transitions.get(&id)
    }

    /// Name for a raw hash, looked up as a state first and then as a
    /// transition. Unknown ids yield an empty string.
    pub fn name_of(&self, raw: i32) -> &str {
        self.states
            .get(&StateId(raw))
            .map(|s| s.name.as_str())
            .or_else(|| {
                self.transitions
                    .get(&TransitionId(raw))
                    .map(|t| t.name.as_str())
            })
            .unwrap_or("")
    }

    pub fn states(&self) -> impl Iterator<Item = &StateInfo> {
        self.states.values()
    }

    pub fn transitions(&self) -> impl Iterator<Item = &TransitionInfo> {
        self.transitions.values()
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty() && self.transitions.is_empty()
    }

    /// Highest layer index referenced by any record, if any.
    pub fn max_layer(&self) -> Option<usize> {
        self.states
            .values()
            .map(|s| s.layer)
            .chain(self.transitions.values().map(|t| t.layer))
            .max()
    }

    pub fn to_json(&self) -> Result<String, MetadataError> {
        serde_json::to_string(self).map_err(|e| MetadataError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, MetadataError> {
        serde_json::from_str(json).map_err(|e| MetadataError::DeserializationFailed(e.to_string()))
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, MetadataError> {
        bincode::serialize(self).map_err(|e| MetadataError::SerializationFailed(e.to_string()))
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, MetadataError> {
        bincode::deserialize(bytes).map_err(|e| MetadataError::DeserializationFailed(e.to_string()))
    }
}

impl From<MetadataDocument> for ControllerMetadata {
    fn from(document: MetadataDocument) -> Self {
        Self::from_parts(document.states, document.transitions)
    }
}

impl From<ControllerMetadata> for MetadataDocument {
    fn from(metadata: ControllerMetadata) -> Self {
        let mut states: Vec<StateInfo> = metadata.states.into_values().collect();
        let mut transitions: Vec<TransitionInfo> = metadata.transitions.into_values().collect();
        states.sort_by_key(|s| s.id);
        transitions.sort_by_key(|t| t.id);
        Self {
            states,
            transitions,
        }
    }
}
