//! Observer subscription errors.

use super::{EventSlot, ObserverKind};
use thiserror::Error;

/// Errors that can occur when subscribing to an observer
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ObserverError {
    #[error("{kind} observers have no '{event}' event")]
    UnsupportedEvent { kind: ObserverKind, event: EventSlot },
}
