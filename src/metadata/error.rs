//! Metadata error types.

use crate::core::{StateId, TransitionId};
use thiserror::Error;

/// Errors that can occur while encoding or decoding controller metadata
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),
}

/// A single inconsistency found while validating metadata tables.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MetadataViolation {
    #[error("State '{name}' uses reserved id 0")]
    ReservedStateId { name: String },

    #[error("Transition '{name}' uses reserved id 0")]
    ReservedTransitionId { name: String },

    #[error("State {id} is on layer {layer}, but the machine has {layer_count} layers")]
    StateLayerOutOfRange {
        id: StateId,
        layer: usize,
        layer_count: usize,
    },

    #[error("Transition {id} is on layer {layer}, but the machine has {layer_count} layers")]
    TransitionLayerOutOfRange {
        id: TransitionId,
        layer: usize,
        layer_count: usize,
    },

    #[error("Transition {id} references unknown state {state}")]
    UnknownEndpoint { id: TransitionId, state: StateId },

    #[error("Transition {id} on layer {layer} references state {state} on layer {state_layer}")]
    CrossLayerEndpoint {
        id: TransitionId,
        layer: usize,
        state: StateId,
        state_layer: usize,
    },
}
