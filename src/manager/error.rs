//! Dispatcher errors.

use crate::metadata::MetadataViolation;
use thiserror::Error;

/// Errors returned by [`EventManager`](super::EventManager).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DispatchError {
    #[error("tick called before initialize; this manager is now halted")]
    NotInitialized,

    #[error("manager halted after an earlier precondition violation")]
    Halted,

    #[error("manager is already initialized")]
    AlreadyInitialized,

    #[error("metadata failed validation with {} violation(s)", .0.len())]
    InvalidMetadata(Vec<MetadataViolation>),
}
