//! Registry and per-tick dispatcher.
//!
//! [`EventManager`] owns the layer statuses, the metadata tables and the
//! observer registry. The host drives it: one [`initialize`] call once the
//! metadata is loaded, then one [`tick`] per frame.
//!
//! Each tick runs in two phases that never interleave: every layer is
//! polled and its status updated, then every observer runs against that
//! same snapshot.
//!
//! # Example
//!
//! ```rust
//! use animwatch::core::{LayerSample, StateId, StateInfo};
//! use animwatch::manager::{EventManager, ManagerConfig};
//! use animwatch::metadata::ControllerMetadata;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let metadata = ControllerMetadata::from_parts(
//!     vec![StateInfo::new(StateId(1), "Idle", 0, "Base Layer")],
//!     vec![],
//! );
//!
//! let mut manager = EventManager::new(ManagerConfig::default());
//! manager.initialize(1, metadata).unwrap();
//!
//! let entered = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&entered);
//! let idle = manager.specific_state(0, StateId(1));
//! manager
//!     .observer_mut(idle)
//!     .unwrap()
//!     .on_enter(move |_, _| {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     })
//!     .unwrap();
//!
//! let mut poll = |_layer: usize| LayerSample::settled(1);
//! manager.tick(&mut poll).unwrap();
//! manager.tick(&mut poll).unwrap();
//!
//! assert_eq!(entered.load(Ordering::SeqCst), 1);
//! ```
//!
//! [`initialize`]: EventManager::initialize
//! [`tick`]: EventManager::tick

use crate::core::{LayerFilter, LayerSample, LayerStatus, StateId};
use crate::metadata::validation::violations;
use crate::metadata::ControllerMetadata;
use crate::observer::{Observer, ObserverKey};
use std::collections::HashMap;
use tracing::{debug, error, trace, warn};

pub mod config;
pub mod error;
mod report;

pub use config::ManagerConfig;
pub use error::DispatchError;
pub use report::{SkippedLookup, TickReport};

/// The polling side of the state machine: current hashes for one layer.
pub trait LayerSource {
    fn sample(&mut self, layer: usize) -> LayerSample;
}

impl<F> LayerSource for F
where
    F: FnMut(usize) -> LayerSample,
{
    fn sample(&mut self, layer: usize) -> LayerSample {
        self(layer)
    }
}

/// Handle to a registered observer.
///
/// Registering the same key again returns an equal handle. Once the
/// observer is removed the handle goes stale for good, even after its
/// registry slot is reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId {
    index: usize,
    generation: u32,
}

/// A registry slot. `generation` advances each time the slot is vacated.
#[derive(Debug)]
struct Entry {
    generation: u32,
    observer: Option<Observer>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Ready,
    Halted,
}

/// Observer registry and per-tick dispatcher.
#[derive(Debug)]
pub struct EventManager {
    config: ManagerConfig,
    phase: Phase,
    statuses: Vec<LayerStatus>,
    metadata: ControllerMetadata,
    observers: Vec<Entry>,
    free: Vec<usize>,
    index: HashMap<ObserverKey, ObserverId>,
    ticks: u64,
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new(ManagerConfig::default())
    }
}

impl EventManager {
    pub fn new(config: ManagerConfig) -> Self {
        Self {
            config,
            phase: Phase::Uninitialized,
            statuses: Vec::new(),
            metadata: ControllerMetadata::new(),
            observers: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            ticks: 0,
        }
    }

    /// Allocate `layer_count` layer statuses and take ownership of the
    /// metadata tables.
    ///
    /// Must be called exactly once, before the first [`tick`](Self::tick).
    /// Metadata violations are logged, or rejected when the config asks
    /// for strict metadata.
    pub fn initialize(
        &mut self,
        layer_count: usize,
        metadata: ControllerMetadata,
    ) -> Result<(), DispatchError> {
        match self.phase {
            Phase::Halted => return Err(DispatchError::Halted),
            Phase::Ready => return Err(DispatchError::AlreadyInitialized),
            Phase::Uninitialized => {}
        }

        let found = violations(metadata.validate(layer_count));
        if !found.is_empty() {
            if self.config.strict_metadata {
                return Err(DispatchError::InvalidMetadata(found));
            }
            for violation in &found {
                warn!(%violation, "inconsistent controller metadata");
            }
        }

        self.statuses = (0..layer_count).map(LayerStatus::new).collect();
        self.metadata = metadata;
        self.phase = Phase::Ready;

        debug!(
            layer_count,
            states = self.metadata.state_count(),
            transitions = self.metadata.transition_count(),
            "event manager initialized"
        );
        Ok(())
    }

    /// Poll every layer, then run every observer against the new snapshot.
    ///
    /// Calling this before [`initialize`](Self::initialize) returns
    /// [`DispatchError::NotInitialized`] and halts the manager for good.
    pub fn tick<S>(&mut self, source: &mut S) -> Result<TickReport, DispatchError>
    where
        S: LayerSource + ?Sized,
    {
        match self.phase {
            Phase::Ready => {}
            Phase::Halted => return Err(DispatchError::Halted),
            Phase::Uninitialized => {
                error!("tick called before initialize; halting event manager");
                self.phase = Phase::Halted;
                return Err(DispatchError::NotInitialized);
            }
        }

        let mut report = TickReport::new(self.ticks);

        for status in &mut self.statuses {
            status.record(source.sample(status.layer()));
        }
        report.layers_polled = self.statuses.len();

        for observer in self.observers.iter_mut().filter_map(|e| e.observer.as_mut()) {
            observer.perform(&self.statuses, &self.metadata, &mut report);
            report.observers_performed += 1;
        }

        self.ticks += 1;
        trace!(
            tick = report.tick,
            callbacks = report.callbacks_fired,
            skipped = report.skipped.len(),
            "tick dispatched"
        );
        Ok(report)
    }

    /// Return the observer registered under `key`, creating it on first use.
    pub fn observe(&mut self, key: ObserverKey) -> ObserverId {
        let observers = &mut self.observers;
        let free = &mut self.free;
        *self.index.entry(key).or_insert_with(|| {
            let observer = Some(Observer::new(key));
            let id = match free.pop() {
                Some(index) => {
                    let entry = &mut observers[index];
                    entry.observer = observer;
                    ObserverId {
                        index,
                        generation: entry.generation,
                    }
                }
                None => {
                    observers.push(Entry {
                        generation: 0,
                        observer,
                    });
                    ObserverId {
                        index: observers.len() - 1,
                        generation: 0,
                    }
                }
            };
            debug!(observer = %key, "registered observer");
            id
        })
    }

    pub fn any_state(&mut self, layer: impl Into<LayerFilter>) -> ObserverId {
        self.observe(ObserverKey::AnyState {
            layer: layer.into(),
        })
    }

    /// Watching `StateId::NONE` is accepted but never fires.
    pub fn specific_state(
        &mut self,
        layer: impl Into<LayerFilter>,
        state: impl Into<StateId>,
    ) -> ObserverId {
        self.observe(ObserverKey::SpecificState {
            layer: layer.into(),
            state: state.into(),
        })
    }

    pub fn any_transition(&mut self, layer: impl Into<LayerFilter>) -> ObserverId {
        self.observe(ObserverKey::AnyTransition {
            layer: layer.into(),
        })
    }

    pub fn transition_from_state(
        &mut self,
        layer: impl Into<LayerFilter>,
        source: impl Into<StateId>,
    ) -> ObserverId {
        self.observe(ObserverKey::TransitionFromState {
            layer: layer.into(),
            source: source.into(),
        })
    }

    pub fn transition_to_state(
        &mut self,
        layer: impl Into<LayerFilter>,
        dest: impl Into<StateId>,
    ) -> ObserverId {
        self.observe(ObserverKey::TransitionToState {
            layer: layer.into(),
            dest: dest.into(),
        })
    }

    pub fn specific_transition(
        &mut self,
        layer: impl Into<LayerFilter>,
        source: impl Into<StateId>,
        dest: impl Into<StateId>,
    ) -> ObserverId {
        self.observe(ObserverKey::SpecificTransition {
            layer: layer.into(),
            source: source.into(),
            dest: dest.into(),
        })
    }

    pub fn observer_id(&self, key: &ObserverKey) -> Option<ObserverId> {
        self.index.get(key).copied()
    }

    pub fn observer(&self, id: ObserverId) -> Option<&Observer> {
        self.observers
            .get(id.index)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.observer.as_ref())
    }

    pub fn observer_mut(&mut self, id: ObserverId) -> Option<&mut Observer> {
        self.observers
            .get_mut(id.index)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.observer.as_mut())
    }

    /// Drop an observer and all its subscribers.
    ///
    /// Registering its key again later creates a fresh observer with a new
    /// handle. The vacated slot is reused by later registrations.
    pub fn remove_observer(&mut self, id: ObserverId) -> Option<Observer> {
        let entry = self
            .observers
            .get_mut(id.index)
            .filter(|entry| entry.generation == id.generation)?;
        let observer = entry.observer.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(id.index);
        self.index.remove(&observer.key());
        debug!(observer = %observer.key(), "removed observer");
        Some(observer)
    }

    pub fn observer_count(&self) -> usize {
        self.index.len()
    }

    /// Name of a state or transition hash, or `""` if it is unknown.
    pub fn id_to_name(&self, raw: i32) -> &str {
        self.metadata.name_of(raw)
    }

    pub fn layer_status(&self, layer: usize) -> Option<&LayerStatus> {
        self.statuses.get(layer)
    }

    pub fn layer_statuses(&self) -> &[LayerStatus] {
        &self.statuses
    }

    pub fn layer_count(&self) -> usize {
        self.statuses.len()
    }

    pub fn metadata(&self) -> &ControllerMetadata {
        &self.metadata
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub fn is_halted(&self) -> bool {
        self.phase == Phase::Halted
    }

    /// Number of completed ticks.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }
}
