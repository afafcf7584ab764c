//! Eviction policy implementations.
//!
//! Every policy satisfies the [`EvictionPolicy`] contract: capacity-bounded
//! admission, a hit/miss/eviction outcome per access, resettable statistics,
//! and an append-only [`OperationLog`].
//!
//! Currently implements:
//! - [`FifoPolicy`] - evicts the oldest admission, hits do not reorder
//! - [`LruPolicy`] - evicts the least recently accessed reference
//! - [`LfuPolicy`] - evicts the least frequently accessed reference,
//!   oldest last touch first among equals
//!
//! Instances are created through the [`PolicyRegistry`] and held as the
//! closed [`Policy`] enum.

mod fifo;
mod lfu;
mod oplog;
mod lru;
mod registry;
mod stats;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::{ConfigError, Error, Reference};

pub use fifo::FifoPolicy;
pub use lfu::LfuPolicy;
pub use oplog::{Operation, OperationDetail, OperationKind, OperationLog};
pub use lru::LruPolicy;
pub use registry::{Policy, PolicyRegistry, Registration};
pub use stats::{PolicyStats, StatsSnapshot};

/// Identifies one of the supported policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PolicyKind {
    Fifo,
    Lru,
    Lfu,
}

impl PolicyKind {
    /// All kinds, in registration order.
    pub const ALL: [PolicyKind; 3] = [PolicyKind::Fifo, PolicyKind::Lru, PolicyKind::Lfu];

    /// Canonical identifier ("FIFO", "LRU", "LFU").
    pub fn identifier(&self) -> &'static str {
        match self {
            PolicyKind::Fifo => "FIFO",
            PolicyKind::Lru => "LRU",
            PolicyKind::Lfu => "LFU",
        }
    }

    /// Human-readable expansion of the acronym.
    pub fn description(&self) -> &'static str {
        match self {
            PolicyKind::Fifo => "First In, First Out",
            PolicyKind::Lru => "Least Recently Used",
            PolicyKind::Lfu => "Least Frequently Used",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for PolicyKind {
    type Err = Error;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        PolicyKind::ALL
            .into_iter()
            .find(|kind| kind.identifier().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ConfigError::UnknownPolicy(s.to_string()).into())
    }
}

/// Whether an access found its reference resident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessOutcome {
    Hit,
    Miss,
}

impl AccessOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, AccessOutcome::Hit)
    }
}

/// Result of one `access` call. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult<K> {
    pub reference: K,
    pub outcome: AccessOutcome,
    /// Reference removed to make room; only ever set on a miss.
    pub evicted: Option<K>,
    /// Resident set after the access, in the policy's internal order.
    pub resident: Vec<K>,
}

/// Read-only projection of a policy instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyState<K> {
    pub kind: PolicyKind,
    pub capacity: usize,
    /// Resident set in the policy's internal order.
    pub resident: Vec<K>,
    pub stats: StatsSnapshot,
    pub hit_rate: f64,
    pub miss_rate: f64,
    /// Length of the operation log when this state was taken.
    pub operation_count: usize,
}

/// The contract every eviction policy satisfies.
///
/// `access` is the only mutating operation besides `reset`, and it is
/// deterministic given the current state and the reference.
pub trait EvictionPolicy<K: Reference> {
    fn kind(&self) -> PolicyKind;

    /// Fixed at construction.
    fn capacity(&self) -> usize;

    /// Look up `reference`, admitting it on a miss and evicting if full.
    fn access(&mut self, reference: &K) -> StepResult<K>;

    /// Resident references in the policy's internal order.
    fn resident(&self) -> Vec<K>;

    fn contains(&self, reference: &K) -> bool;

    /// Number of resident references. Never exceeds `capacity()`.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn stats(&self) -> StatsSnapshot;

    fn operations(&self) -> &[Operation<K>];

    /// Clear residents, counters, auxiliary structures and the log.
    /// Capacity is preserved.
    fn reset(&mut self);

    fn state(&self) -> PolicyState<K> {
        let stats = self.stats();
        PolicyState {
            kind: self.kind(),
            capacity: self.capacity(),
            resident: self.resident(),
            stats,
            hit_rate: stats.hit_rate(),
            miss_rate: stats.miss_rate(),
            operation_count: self.operations().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!("FIFO".parse::<PolicyKind>(), Ok(PolicyKind::Fifo));
        assert_eq!("lru".parse::<PolicyKind>(), Ok(PolicyKind::Lru));
        assert_eq!(" Lfu ".parse::<PolicyKind>(), Ok(PolicyKind::Lfu));
        assert_eq!(
            "MRU".parse::<PolicyKind>(),
            Err(Error::Config(ConfigError::UnknownPolicy("MRU".to_string())))
        );
    }

    #[test]
    fn test_kind_display_roundtrip() {
        for kind in PolicyKind::ALL {
            assert_eq!(kind.to_string().parse::<PolicyKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_kind_description() {
        assert_eq!(PolicyKind::Fifo.description(), "First In, First Out");
        assert_eq!(PolicyKind::Lru.description(), "Least Recently Used");
        assert_eq!(PolicyKind::Lfu.description(), "Least Frequently Used");
    }

    #[test]
    fn test_outcome_is_hit() {
        assert!(AccessOutcome::Hit.is_hit());
        assert!(!AccessOutcome::Miss.is_hit());

        let mut policy = LruPolicy::<u32>::new(2);
        assert!(!policy.access(&1).outcome.is_hit());
        assert!(policy.access(&1).outcome.is_hit());
    }

    #[test]
    fn test_state_of_fresh_policy() {
        let policy = FifoPolicy::<u32>::new(3);
        let state = policy.state();
        assert_eq!(state.kind, PolicyKind::Fifo);
        assert_eq!(state.capacity, 3);
        assert!(state.resident.is_empty());
        assert_eq!(state.hit_rate, 0.0);
        assert_eq!(state.miss_rate, 0.0);
        assert_eq!(state.operation_count, 0);
    }
}
