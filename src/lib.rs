//! evictsim - side-by-side simulation of cache eviction policies.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            evictsim                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Analysis (analysis)                         │   │
//! │  │     Comparison + StepMetric + TraceProfile (read-only)   │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↑                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Simulation (simulation/)                    │   │
//! │  │   SimulationDriver + History + autoplay worker           │   │
//! │  │   step forward / step back (replay) / run / stop         │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Policies (policy/)                          │   │
//! │  │   ┌─────────────────────────────────────────────────┐   │   │
//! │  │   │   Eviction Policies:  FIFO  |  LRU  |  LFU      │   │   │
//! │  │   │        (built by name via PolicyRegistry)        │   │   │
//! │  │   └─────────────────────────────────────────────────┘   │   │
//! │  │      EvictionPolicy + PolicyStats + OperationLog         │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (Reference, Error, config)
//! - [`policy`] - Eviction policies and their registry
//! - [`simulation`] - Lockstep driver, history and autoplay
//! - [`analysis`] - Comparison and trace summaries
//!
//! # Quick Start
//! ```
//! use evictsim::{PolicyKind, SimulationDriver};
//!
//! let mut driver = SimulationDriver::new();
//! driver.initialize(["FIFO", "LRU", "LFU"], 3).unwrap();
//! driver.load_trace(vec![1, 2, 3, 1, 4]);
//! driver.run_to_end().unwrap();
//!
//! let last = driver.history().get(4).unwrap();
//! assert_eq!(last.step.result(PolicyKind::Fifo).unwrap().evicted, Some(1));
//! assert_eq!(last.step.result(PolicyKind::Lru).unwrap().evicted, Some(2));
//! ```

pub mod analysis;
pub mod common;
pub mod policy;
pub mod simulation;

// Re-export commonly used items at crate root for convenience
pub use common::config::{DEFAULT_CAPACITY, DEFAULT_SPEED_MS};
pub use common::{
    ConfigError, Error, Reference, Result, SequenceError, SimulationConfig, StateError,
};

pub use analysis::{Comparison, TraceProfile};
pub use policy::{
    AccessOutcome, EvictionPolicy, FifoPolicy, LfuPolicy, LruPolicy, Operation, OperationKind,
    Policy, PolicyKind, PolicyRegistry, PolicyState, StatsSnapshot, StepResult,
};
pub use simulation::{DriverStatus, History, HistoryEntry, SimulationDriver, SimulationStep};
