//! Core value types.
//!
//! This module contains the data the dispatcher works on:
//! - `HistorizedValue` for one-write-ago history
//! - `LayerStatus` and `LayerSample` for per-layer polled hashes
//! - id newtypes and the immutable `StateInfo` / `TransitionInfo` records
//!
//! Nothing here performs I/O or logging.

mod history;
mod info;
mod layer;

pub use history::HistorizedValue;
pub use info::{StateId, StateInfo, TransitionId, TransitionInfo};
pub use layer::{LayerFilter, LayerSample, LayerStatus};
