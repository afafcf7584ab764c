//! Per-policy statistics tracking.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Counters owned by one policy instance.
///
/// Counters only grow until [`PolicyStats::reset`]. Each policy owns its own
/// stats exclusively, so plain integers are enough.
#[derive(Debug, Default, Clone)]
pub struct PolicyStats {
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl PolicyStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    #[inline]
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    #[inline]
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A point-in-time copy of a policy's counters.
///
/// # Example
/// ```
/// use evictsim::StatsSnapshot;
///
/// let snapshot = StatsSnapshot { hits: 3, misses: 1, evictions: 0 };
/// assert_eq!(snapshot.hit_rate(), 0.75);
/// assert_eq!(snapshot.miss_rate(), 0.25);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl StatsSnapshot {
    /// Hits plus misses.
    pub fn total_accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of accesses that hit (0.0 to 1.0). Zero before any access.
    pub fn hit_rate(&self) -> f64 {
        ratio(self.hits, self.total_accesses())
    }

    /// Fraction of accesses that missed (0.0 to 1.0). Zero before any access.
    pub fn miss_rate(&self) -> f64 {
        ratio(self.misses, self.total_accesses())
    }

    /// Hit rate scaled to 0..=100.
    pub fn hit_rate_percent(&self) -> f64 {
        self.hit_rate() * 100.0
    }
}

fn ratio(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ hits: {}, misses: {}, evictions: {}, hit_rate: {:.2}% }}",
            self.hits,
            self.misses,
            self.evictions,
            self.hit_rate_percent()
        )
    }
}
