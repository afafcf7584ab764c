//! LFU (Least Frequently Used) replacement policy.
//!
//! Victim selection is two-level:
//! 1. the lowest access frequency among resident references,
//! 2. within that frequency, the oldest last-touched marker.
//!
//! Markers come from a logical clock that ticks on every admission and
//! every hit, so they are strictly increasing and the tie-break is
//! deterministic.
//!
//! The minimum frequency is tracked alongside the groups rather than
//! searched for: a hit can only raise it to the promoted frequency, and an
//! admission always drops it back to 1.

use std::collections::{BTreeMap, HashMap};

use log::trace;

use super::{
    AccessOutcome, EvictionPolicy, Operation, OperationDetail, OperationKind, OperationLog,
    PolicyKind, PolicyStats, StatsSnapshot, StepResult,
};
use crate::common::Reference;

#[derive(Debug, Clone, Copy)]
struct LfuEntry {
    frequency: u64,
    last_touched: u64,
}

/// Evicts the least frequently used reference, least recently touched
/// first among equals.
///
/// # Example
/// ```
/// use evictsim::{EvictionPolicy, LfuPolicy};
///
/// let mut lfu = LfuPolicy::new(2);
/// for r in [1, 2, 1] {
///     lfu.access(&r);
/// }
/// let result = lfu.access(&3);
/// assert_eq!(result.evicted, Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct LfuPolicy<K> {
    capacity: usize,

    entries: HashMap<K, LfuEntry>,

    /// frequency -> (last_touched -> reference). A group's first entry is
    /// its oldest touch. Empty groups are removed.
    groups: HashMap<u64, BTreeMap<u64, K>>,

    /// Lowest frequency with a non-empty group while anything is resident.
    min_frequency: u64,

    /// Resident references in admission order.
    admitted: Vec<K>,

    /// Logical clock for last-touched markers.
    clock: u64,

    stats: PolicyStats,
    log: OperationLog<K>,
}

impl<K: Reference> LfuPolicy<K> {
    /// Create an empty LFU policy.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");

        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            groups: HashMap::new(),
            min_frequency: 0,
            admitted: Vec::with_capacity(capacity),
            clock: 0,
            stats: PolicyStats::new(),
            log: OperationLog::new(),
        }
    }

    /// Current access frequency of a resident reference.
    pub fn frequency(&self, reference: &K) -> Option<u64> {
        self.entries.get(reference).map(|e| e.frequency)
    }

    /// Reference that the next eviction would remove.
    pub fn peek_victim(&self) -> Option<&K> {
        self.groups
            .get(&self.min_frequency)
            .and_then(|group| group.values().next())
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Bump frequency and refresh the marker of a resident reference.
    /// Returns the new frequency.
    fn promote(&mut self, reference: &K) -> u64 {
        let now = self.tick();
        let Some(entry) = self.entries.get_mut(reference) else {
            return 0;
        };
        let old = *entry;
        entry.frequency += 1;
        entry.last_touched = now;
        let new = *entry;

        if let Some(group) = self.groups.get_mut(&old.frequency) {
            group.remove(&old.last_touched);
            if group.is_empty() {
                self.groups.remove(&old.frequency);
                if self.min_frequency == old.frequency {
                    self.min_frequency = new.frequency;
                }
            }
        }
        self.groups
            .entry(new.frequency)
            .or_default()
            .insert(new.last_touched, reference.clone());

        new.frequency
    }

    fn admit(&mut self, reference: &K) {
        let now = self.tick();
        self.entries.insert(
            reference.clone(),
            LfuEntry {
                frequency: 1,
                last_touched: now,
            },
        );
        self.groups
            .entry(1)
            .or_default()
            .insert(now, reference.clone());
        self.min_frequency = 1;
        self.admitted.push(reference.clone());
    }

    /// Only called right before `admit`, which restores `min_frequency`.
    fn evict_lfu(&mut self, incoming: &K) -> Option<K> {
        let group = self.groups.get_mut(&self.min_frequency)?;
        let (_, victim) = group.pop_first()?;
        if group.is_empty() {
            self.groups.remove(&self.min_frequency);
        }

        self.entries.remove(&victim);
        self.admitted.retain(|r| r != &victim);
        self.stats.record_eviction();
        trace!("LFU evicted {:?} for {:?}", victim, incoming);

        self.log.push(
            OperationKind::Evict,
            victim.clone(),
            self.resident(),
            OperationDetail::default().evicted_for(incoming.clone()),
        );
        Some(victim)
    }
}

impl<K: Reference> EvictionPolicy<K> for LfuPolicy<K> {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Lfu
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn access(&mut self, reference: &K) -> StepResult<K> {
        if self.entries.contains_key(reference) {
            self.stats.record_hit();
            let frequency = self.promote(reference);

            let resident = self.resident();
            self.log.push(
                OperationKind::Hit,
                reference.clone(),
                resident.clone(),
                OperationDetail::default().frequency(frequency),
            );
            return StepResult {
                reference: reference.clone(),
                outcome: AccessOutcome::Hit,
                evicted: None,
                resident,
            };
        }

        self.stats.record_miss();
        let evicted = if self.entries.len() >= self.capacity {
            self.evict_lfu(reference)
        } else {
            None
        };

        self.admit(reference);

        let resident = self.resident();
        self.log.push(
            OperationKind::Miss,
            reference.clone(),
            resident.clone(),
            OperationDetail::default()
                .evicted(evicted.clone())
                .frequency(1),
        );
        StepResult {
            reference: reference.clone(),
            outcome: AccessOutcome::Miss,
            evicted,
            resident,
        }
    }

    fn resident(&self) -> Vec<K> {
        self.admitted.clone()
    }

    fn contains(&self, reference: &K) -> bool {
        self.entries.contains_key(reference)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn operations(&self) -> &[Operation<K>] {
        self.log.as_slice()
    }

    fn reset(&mut self) {
        self.entries.clear();
        self.groups.clear();
        self.min_frequency = 0;
        self.admitted.clear();
        self.clock = 0;
        self.stats.reset();
        self.log.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(policy: &mut LfuPolicy<u32>, trace: &[u32]) -> Vec<StepResult<u32>> {
        trace.iter().map(|r| policy.access(r)).collect()
    }

    #[test]
    fn test_lfu_evicts_lowest_frequency() {
        let mut policy = LfuPolicy::new(2);
        let results = run(&mut policy, &[1, 2, 1, 3]);

        assert_eq!(policy.frequency(&1), Some(2));
        assert_eq!(results[3].evicted, Some(2));
        assert_eq!(policy.resident(), vec![1, 3]);
    }

    #[test]
    fn test_lfu_tie_breaks_on_oldest_touch() {
        let mut policy = LfuPolicy::new(3);
        // 1, 2, 3 all at frequency 1; 1 is the oldest touch
        let results = run(&mut policy, &[1, 2, 3, 4]);
        assert_eq!(results[3].evicted, Some(1));

        let mut policy = LfuPolicy::new(3);
        run(&mut policy, &[1, 2, 3, 3, 2, 1]);
        // all at frequency 2; 3 was touched least recently
        assert_eq!(policy.peek_victim(), Some(&3));
        let result = policy.access(&9);
        assert_eq!(result.evicted, Some(3));
    }

    #[test]
    fn test_lfu_new_entry_is_next_victim_among_singletons() {
        let mut policy = LfuPolicy::new(2);
        run(&mut policy, &[1, 1, 2, 3]);

        // 2 (freq 1) evicted for 3; now 3 is the only singleton
        assert_eq!(policy.resident(), vec![1, 3]);
        assert_eq!(policy.frequency(&3), Some(1));
        assert_eq!(policy.peek_victim(), Some(&3));
    }

    #[test]
    fn test_lfu_min_frequency_follows_promotion() {
        let mut policy = LfuPolicy::new(2);
        run(&mut policy, &[1, 1, 2, 2]);

        // both at frequency 2, so the singleton group is gone
        assert_eq!(policy.peek_victim(), Some(&1));
        let result = policy.access(&3);
        assert_eq!(result.evicted, Some(1));
        assert_eq!(policy.peek_victim(), Some(&3));
    }

    #[test]
    fn test_lfu_victim_matches_full_scan() {
        let mut policy = LfuPolicy::new(4);
        let mut seed = 0x2545_f491_u32;
        for _ in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            policy.access(&(seed % 9));

            let scanned = policy
                .entries
                .iter()
                .min_by_key(|(_, e)| (e.frequency, e.last_touched))
                .map(|(k, _)| k);
            assert_eq!(policy.peek_victim(), scanned);
        }
    }

    #[test]
    fn test_lfu_hit_logs_frequency() {
        let mut policy = LfuPolicy::new(2);
        run(&mut policy, &[5, 5, 5]);

        let ops = policy.operations();
        assert_eq!(ops[0].detail.frequency, Some(1));
        assert_eq!(ops[1].detail.frequency, Some(2));
        assert_eq!(ops[2].detail.frequency, Some(3));
        assert_eq!(ops[2].kind, OperationKind::Hit);
    }

    #[test]
    fn test_lfu_resident_in_admission_order() {
        let mut policy = LfuPolicy::new(3);
        run(&mut policy, &[3, 1, 2, 1, 1]);

        assert_eq!(policy.resident(), vec![3, 1, 2]);
        assert_eq!(policy.stats().hits, 2);
    }

    #[test]
    fn test_lfu_reset() {
        let mut policy = LfuPolicy::new(2);
        run(&mut policy, &[1, 2, 1, 3]);

        policy.reset();

        assert_eq!(policy.state(), LfuPolicy::<u32>::new(2).state());
        assert_eq!(policy.frequency(&1), None);
        assert_eq!(policy.peek_victim(), None);
    }
}
