//! Recorded simulation steps.

use serde::{Deserialize, Serialize};

use crate::policy::{PolicyKind, PolicyState, StepResult};

/// One policy's result within a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyStepResult<K> {
    pub kind: PolicyKind,
    pub result: StepResult<K>,
}

/// Every active policy's result for one trace reference.
///
/// `results` follows policy selection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStep<K> {
    /// 0-based position in the trace.
    pub step_index: usize,
    pub reference: K,
    pub results: Vec<PolicyStepResult<K>>,
}

impl<K> SimulationStep<K> {
    /// Result for one policy, if it took part in the step.
    pub fn result(&self, kind: PolicyKind) -> Option<&StepResult<K>> {
        self.results
            .iter()
            .find(|r| r.kind == kind)
            .map(|r| &r.result)
    }
}

/// A step plus every policy's full state right after it.
///
/// The snapshots are what backward navigation displays: policy state cannot
/// be rolled back from a [`StepResult`] because evictions lose information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry<K> {
    pub step: SimulationStep<K>,
    pub states: Vec<PolicyState<K>>,
}

impl<K> HistoryEntry<K> {
    pub fn state(&self, kind: PolicyKind) -> Option<&PolicyState<K>> {
        self.states.iter().find(|s| s.kind == kind)
    }
}

/// Ordered record of every step taken since the last (re)initialization.
///
/// Grows only while the simulation advances past its previous furthest
/// step. Consumers get read-only access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History<K> {
    entries: Vec<HistoryEntry<K>>,
}

impl<K> History<K> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, entry: HistoryEntry<K>) {
        debug_assert_eq!(entry.step.step_index, self.entries.len());
        self.entries.push(entry);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, step_index: usize) -> Option<&HistoryEntry<K>> {
        self.entries.get(step_index)
    }

    pub fn entries(&self) -> &[HistoryEntry<K>] {
        &self.entries
    }

    pub fn steps(&self) -> impl Iterator<Item = &SimulationStep<K>> {
        self.entries.iter().map(|e| &e.step)
    }
}

impl<K> Default for History<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{AccessOutcome, StatsSnapshot};

    fn entry(step_index: usize, reference: u32) -> HistoryEntry<u32> {
        HistoryEntry {
            step: SimulationStep {
                step_index,
                reference,
                results: vec![PolicyStepResult {
                    kind: PolicyKind::Fifo,
                    result: StepResult {
                        reference,
                        outcome: AccessOutcome::Miss,
                        evicted: None,
                        resident: vec![reference],
                    },
                }],
            },
            states: vec![PolicyState {
                kind: PolicyKind::Fifo,
                capacity: 1,
                resident: vec![reference],
                stats: StatsSnapshot {
                    hits: 0,
                    misses: 1,
                    evictions: 0,
                },
                hit_rate: 0.0,
                miss_rate: 1.0,
                operation_count: 1,
            }],
        }
    }

    #[test]
    fn test_history_lookup() {
        let mut history = History::new();
        history.push(entry(0, 10));
        history.push(entry(1, 20));

        assert_eq!(history.len(), 2);
        assert_eq!(history.get(1).map(|e| e.step.reference), Some(20));
        assert!(history.get(2).is_none());

        let refs: Vec<_> = history.steps().map(|s| s.reference).collect();
        assert_eq!(refs, vec![10, 20]);
        assert_eq!(history.entries().len(), 2);
        assert_eq!(history.entries()[0], entry(0, 10));
    }

    #[test]
    fn test_step_result_by_kind() {
        let e = entry(0, 5);
        assert!(e.step.result(PolicyKind::Fifo).is_some());
        assert!(e.step.result(PolicyKind::Lru).is_none());
        assert_eq!(e.state(PolicyKind::Fifo).map(|s| s.capacity), Some(1));
    }

    #[test]
    fn test_history_clear() {
        let mut history = History::new();
        history.push(entry(0, 1));
        history.clear();
        assert!(history.is_empty());
    }
}
