//! Read-only summaries for comparison views.
//!
//! Nothing here touches a policy; everything is derived from states,
//! history or the trace itself.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::common::Reference;
use crate::policy::{AccessOutcome, PolicyKind, PolicyState, StatsSnapshot};
use crate::simulation::History;

/// One policy's totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub kind: PolicyKind,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub hit_rate: f64,
    pub miss_rate: f64,
    pub total_accesses: u64,
}

/// Side-by-side totals of several policies, in the order given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    rows: Vec<ComparisonRow>,
}

impl Comparison {
    pub fn from_states<K>(states: &[PolicyState<K>]) -> Self {
        let rows = states
            .iter()
            .map(|s| ComparisonRow {
                kind: s.kind,
                hits: s.stats.hits,
                misses: s.stats.misses,
                evictions: s.stats.evictions,
                hit_rate: s.hit_rate,
                miss_rate: s.miss_rate,
                total_accesses: s.stats.total_accesses(),
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    pub fn row(&self, kind: PolicyKind) -> Option<&ComparisonRow> {
        self.rows.iter().find(|r| r.kind == kind)
    }

    /// Row with the highest hit rate. Ties go to the earlier row.
    pub fn best(&self) -> Option<&ComparisonRow> {
        self.rows.iter().fold(None, |best, row| match best {
            Some(b) if b.hit_rate >= row.hit_rate => Some(b),
            _ => Some(row),
        })
    }

    /// Counters summed across every row.
    pub fn totals(&self) -> StatsSnapshot {
        self.rows
            .iter()
            .fold(StatsSnapshot::default(), |acc, row| StatsSnapshot {
                hits: acc.hits + row.hits,
                misses: acc.misses + row.misses,
                evictions: acc.evictions + row.evictions,
            })
    }

    /// Hit rate over the summed counters. Zero before any access.
    pub fn overall_hit_rate(&self) -> f64 {
        self.totals().hit_rate()
    }
}

/// One policy's outcome within a [`StepMetric`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyOutcome<K> {
    pub kind: PolicyKind,
    pub outcome: AccessOutcome,
    pub evicted: Option<K>,
}

/// Flattened row of the step-by-step table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepMetric<K> {
    pub step_index: usize,
    pub reference: K,
    pub outcomes: Vec<PolicyOutcome<K>>,
}

/// One [`StepMetric`] per recorded step.
pub fn step_metrics<K: Clone>(history: &History<K>) -> Vec<StepMetric<K>> {
    history
        .steps()
        .map(|step| StepMetric {
            step_index: step.step_index,
            reference: step.reference.clone(),
            outcomes: step
                .results
                .iter()
                .map(|r| PolicyOutcome {
                    kind: r.kind,
                    outcome: r.result.outcome,
                    evicted: r.result.evicted.clone(),
                })
                .collect(),
        })
        .collect()
}

/// Policy-independent properties of a trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceProfile {
    pub unique_references: usize,
    pub total_accesses: usize,
    /// `(total - unique) / total`: every first touch must miss.
    pub theoretical_max_hit_rate: f64,
    /// `unique / capacity`, capped at 1.
    pub cache_utilization: f64,
}

impl TraceProfile {
    pub fn of<K: Reference>(trace: &[K], capacity: usize) -> Self {
        let unique = trace.iter().collect::<HashSet<_>>().len();
        let total = trace.len();

        let theoretical_max_hit_rate = if total == 0 {
            0.0
        } else {
            (total - unique) as f64 / total as f64
        };
        let cache_utilization = if capacity == 0 {
            0.0
        } else {
            (unique as f64 / capacity as f64).min(1.0)
        };

        Self {
            unique_references: unique,
            total_accesses: total,
            theoretical_max_hit_rate,
            cache_utilization,
        }
    }
}
