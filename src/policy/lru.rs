//! LRU (Least Recently Used) replacement policy.

use std::collections::{HashSet, VecDeque};

use log::trace;

use super::{
    AccessOutcome, EvictionPolicy, Operation, OperationDetail, OperationKind, OperationLog,
    PolicyKind, PolicyStats, StatsSnapshot, StepResult,
};
use crate::common::Reference;

/// Evicts the reference whose last access is oldest.
///
/// Recency is a strict total order refreshed on every access, hits
/// included, so eviction never needs a tie-break.
#[derive(Debug, Clone)]
pub struct LruPolicy<K> {
    capacity: usize,

    /// Resident references by recency (front = least recent).
    recency: VecDeque<K>,

    members: HashSet<K>,

    stats: PolicyStats,
    log: OperationLog<K>,
}

impl<K: Reference> LruPolicy<K> {
    /// Create an empty LRU policy.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");

        Self {
            capacity,
            recency: VecDeque::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
            stats: PolicyStats::new(),
            log: OperationLog::new(),
        }
    }

    /// Least recently used reference, i.e. the next victim.
    pub fn peek_lru(&self) -> Option<&K> {
        self.recency.front()
    }

    /// Move a resident reference to the most-recent end.
    fn touch(&mut self, reference: &K) {
        if let Some(pos) = self.recency.iter().position(|r| r == reference) {
            if let Some(entry) = self.recency.remove(pos) {
                self.recency.push_back(entry);
            }
        }
    }

    fn evict_lru(&mut self, incoming: &K) -> Option<K> {
        let victim = self.recency.pop_front()?;
        self.members.remove(&victim);
        self.stats.record_eviction();
        trace!("LRU evicted {:?} for {:?}", victim, incoming);

        self.log.push(
            OperationKind::Evict,
            victim.clone(),
            self.resident(),
            OperationDetail::default().evicted_for(incoming.clone()),
        );
        Some(victim)
    }
}

impl<K: Reference> EvictionPolicy<K> for LruPolicy<K> {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Lru
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn access(&mut self, reference: &K) -> StepResult<K> {
        if self.members.contains(reference) {
            self.stats.record_hit();
            self.touch(reference);

            let resident = self.resident();
            self.log.push(
                OperationKind::Hit,
                reference.clone(),
                resident.clone(),
                OperationDetail::default(),
            );
            return StepResult {
                reference: reference.clone(),
                outcome: AccessOutcome::Hit,
                evicted: None,
                resident,
            };
        }

        self.stats.record_miss();
        let evicted = if self.recency.len() >= self.capacity {
            self.evict_lru(reference)
        } else {
            None
        };

        self.recency.push_back(reference.clone());
        self.members.insert(reference.clone());

        let resident = self.resident();
        self.log.push(
            OperationKind::Miss,
            reference.clone(),
            resident.clone(),
            OperationDetail::default().evicted(evicted.clone()),
        );
        StepResult {
            reference: reference.clone(),
            outcome: AccessOutcome::Miss,
            evicted,
            resident,
        }
    }

    fn resident(&self) -> Vec<K> {
        self.recency.iter().cloned().collect()
    }

    fn contains(&self, reference: &K) -> bool {
        self.members.contains(reference)
    }

    fn len(&self) -> usize {
        self.recency.len()
    }

    fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn operations(&self) -> &[Operation<K>] {
        self.log.as_slice()
    }

    fn reset(&mut self) {
        self.recency.clear();
        self.members.clear();
        self.stats.reset();
        self.log.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(policy: &mut LruPolicy<u32>, trace: &[u32]) -> Vec<StepResult<u32>> {
        trace.iter().map(|r| policy.access(r)).collect()
    }

    #[test]
    fn test_lru_hit_refreshes_recency() {
        let mut policy = LruPolicy::new(3);
        let results = run(&mut policy, &[1, 2, 3, 1, 4]);

        assert_eq!(results[3].outcome, AccessOutcome::Hit);
        assert_eq!(results[3].resident, vec![2, 3, 1]);
        // 1 was refreshed, so 2 is the least recent
        assert_eq!(results[4].evicted, Some(2));
        assert_eq!(policy.resident(), vec![3, 1, 4]);
    }

    #[test]
    fn test_lru_without_hits_matches_fifo_victim() {
        let mut policy = LruPolicy::new(3);
        let results = run(&mut policy, &[1, 2, 3, 4]);

        assert_eq!(results[3].evicted, Some(1));
        assert_eq!(policy.peek_lru(), Some(&2));
    }

    #[test]
    fn test_lru_worst_case_cycle() {
        // Cycling through capacity + 1 references never hits
        let mut policy = LruPolicy::new(4);
        run(&mut policy, &[1, 2, 3, 4, 5, 1, 2, 3, 4, 5, 1, 2, 3, 4, 5]);

        let stats = policy.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 15);
        assert_eq!(stats.evictions, 11);
    }

    #[test]
    fn test_lru_repeated_hits() {
        let mut policy = LruPolicy::new(3);
        run(&mut policy, &[1, 2, 3, 1, 2, 3, 1, 2, 3]);

        let stats = policy.stats();
        assert_eq!(stats.hits, 6);
        assert_eq!(stats.misses, 3);
        assert_eq!(stats.evictions, 0);
    }

    #[test]
    fn test_lru_evict_logged_before_miss() {
        let mut policy = LruPolicy::new(1);
        run(&mut policy, &[7, 8]);

        let ops = policy.operations();
        assert_eq!(ops.len(), 3);
        assert_eq!(ops[1].kind, OperationKind::Evict);
        assert_eq!(ops[1].reference, 7);
        assert_eq!(ops[1].detail.evicted_for, Some(8));
        assert_eq!(ops[2].kind, OperationKind::Miss);
        assert_eq!(ops[2].detail.evicted, Some(7));
    }

    #[test]
    fn test_lru_reset() {
        let mut policy = LruPolicy::new(2);
        run(&mut policy, &[1, 2, 1, 3]);

        policy.reset();

        assert_eq!(policy.state(), LruPolicy::<u32>::new(2).state());
        assert!(!policy.contains(&1));
    }
}
