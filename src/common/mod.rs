//! Common types and utilities shared across evictsim.
//!
//! This module contains the primitives used throughout the crate:
//! - Configuration constants and [`SimulationConfig`]
//! - Error types
//! - The [`Reference`] bound for trace items

pub mod config;
pub mod error;
mod reference;

pub use config::SimulationConfig;
pub use error::{ConfigError, Error, Result, SequenceError, StateError};
pub use reference::Reference;
