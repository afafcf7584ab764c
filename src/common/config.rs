//! Configuration for a simulation run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::common::{ConfigError, Result};
use crate::policy::PolicyKind;

/// Cache capacity used when none is given.
pub const DEFAULT_CAPACITY: usize = 4;

/// Autoplay interval used when none is given.
pub const DEFAULT_SPEED_MS: u64 = 1000;

/// Capacity range offered by the interactive controls.
///
/// Advisory only: the core accepts any positive capacity.
pub const MIN_UI_CAPACITY: usize = 2;
pub const MAX_UI_CAPACITY: usize = 16;

/// Autoplay interval range offered by the interactive controls.
///
/// Advisory only: the core accepts any positive interval.
pub const MIN_UI_SPEED_MS: u64 = 100;
pub const MAX_UI_SPEED_MS: u64 = 3000;

/// Which policies to run, how big each cache is, and how fast to autoplay.
///
/// # Example
/// ```
/// use evictsim::{PolicyKind, SimulationConfig};
///
/// let config = SimulationConfig::default()
///     .with_policies(vec![PolicyKind::Lru, PolicyKind::Lfu])
///     .with_capacity(3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Policies in selection order. Iteration order everywhere follows this.
    pub policies: Vec<PolicyKind>,

    /// Capacity of every policy instance.
    pub capacity: usize,

    /// Autoplay interval in milliseconds.
    pub speed_ms: u64,
}

impl SimulationConfig {
    pub fn new(policies: Vec<PolicyKind>, capacity: usize, speed_ms: u64) -> Self {
        Self {
            policies,
            capacity,
            speed_ms,
        }
    }

    pub fn with_policies(mut self, policies: Vec<PolicyKind>) -> Self {
        self.policies = policies;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_speed_ms(mut self, speed_ms: u64) -> Self {
        self.speed_ms = speed_ms;
        self
    }

    /// Autoplay interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.speed_ms)
    }

    /// Check every field.
    ///
    /// # Errors
    /// - `EmptyPolicySet` if no policy is selected
    /// - `DuplicatePolicy` if a policy appears twice
    /// - `InvalidCapacity` if capacity is 0
    /// - `InvalidSpeed` if the interval is 0
    pub fn validate(&self) -> Result<()> {
        validate_policy_set(&self.policies)?;
        validate_capacity(self.capacity)?;
        if self.speed_ms == 0 {
            return Err(ConfigError::InvalidSpeed(self.speed_ms).into());
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            policies: vec![PolicyKind::Fifo, PolicyKind::Lru, PolicyKind::Lfu],
            capacity: DEFAULT_CAPACITY,
            speed_ms: DEFAULT_SPEED_MS,
        }
    }
}

pub(crate) fn validate_capacity(capacity: usize) -> Result<()> {
    if capacity == 0 {
        return Err(ConfigError::InvalidCapacity(capacity).into());
    }
    Ok(())
}

pub(crate) fn validate_policy_set(policies: &[PolicyKind]) -> Result<()> {
    if policies.is_empty() {
        return Err(ConfigError::EmptyPolicySet.into());
    }
    for (i, kind) in policies.iter().enumerate() {
        if policies[..i].contains(kind) {
            return Err(ConfigError::DuplicatePolicy(*kind).into());
        }
    }
    Ok(())
}
