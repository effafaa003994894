//! Animwatch: edge-detecting events for poll-only layered state machines
//!
//! An animation controller runs several independent layers, each with its
//! own states and transitions, but only answers one question: "which state
//! and transition hash is active on layer N right now?". Animwatch polls
//! that once per tick, remembers the previous answer, and turns the
//! difference into enter/exit/stay/active and started/finished events.
//!
//! # Core Concepts
//!
//! - **HistorizedValue**: a cell that remembers the value before the last write
//! - **LayerStatus**: historized state and transition hashes for one layer
//! - **Observer**: edge detection for one kind of event, with multicast slots
//! - **EventManager**: the observer registry and per-tick dispatcher
//!
//! # Example
//!
//! ```rust
//! use animwatch::core::{LayerSample, StateId, StateInfo};
//! use animwatch::manager::EventManager;
//! use animwatch::metadata::ControllerMetadata;
//! use std::sync::{Arc, Mutex};
//!
//! let metadata = ControllerMetadata::from_parts(
//!     vec![
//!         StateInfo::new(StateId(1), "Idle", 0, "Base Layer"),
//!         StateInfo::new(StateId(2), "Walk", 0, "Base Layer"),
//!     ],
//!     vec![],
//! );
//!
//! let mut manager = EventManager::default();
//! manager.initialize(1, metadata).unwrap();
//!
//! let entered = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&entered);
//! let any = manager.any_state(0);
//! manager
//!     .observer_mut(any)
//!     .unwrap()
//!     .on_change(move |info, _| sink.lock().unwrap().push(info.name.clone()))
//!     .unwrap();
//!
//! for raw in [1, 1, 2] {
//!     manager.tick(&mut |_: usize| LayerSample::settled(raw)).unwrap();
//! }
//!
//! assert_eq!(*entered.lock().unwrap(), vec!["Idle", "Walk"]);
//! ```

pub mod core;
pub mod manager;
pub mod metadata;
pub mod observer;

// Re-export commonly used types
pub use crate::core::{
    HistorizedValue, LayerFilter, LayerSample, LayerStatus, StateId, StateInfo, TransitionId,
    TransitionInfo,
};
pub use crate::manager::{
    DispatchError, EventManager, LayerSource, ManagerConfig, ObserverId, SkippedLookup, TickReport,
};
pub use crate::metadata::{ControllerMetadata, MetadataError, MetadataViolation};
pub use crate::observer::{
    Observer, ObserverError, ObserverKey, ObserverKind, StateEvent, SubscriptionId,
    TransitionEvent,
};
