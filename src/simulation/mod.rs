//! Lockstep simulation of several policies over one trace.
//!
//! # Components
//! - [`SimulationDriver`] - Owns the policies, the trace and the history
//! - [`History`] / [`SimulationStep`] - Recorded per-step results and snapshots
//! - [`run`] / [`AutoplayHandle`] - Timer-driven autoplay over a [`SharedDriver`]

mod autoplay;
mod driver;
mod history;

pub use autoplay::{run, shared, AutoplayHandle, RunSummary, SharedDriver};
pub use driver::{DriverStatus, SimulationDriver};
pub use history::{History, HistoryEntry, PolicyStepResult, SimulationStep};
