//! FIFO (First-In-First-Out) replacement policy.

use std::collections::{HashSet, VecDeque};

use log::trace;

use super::{
    AccessOutcome, EvictionPolicy, Operation, OperationDetail, OperationKind, OperationLog,
    PolicyKind, PolicyStats, StatsSnapshot, StepResult,
};
use crate::common::Reference;

/// Evicts references in the order they were admitted.
///
/// A hit leaves the queue untouched; that is what separates FIFO from LRU.
#[derive(Debug, Clone)]
pub struct FifoPolicy<K> {
    capacity: usize,

    /// Resident references in admission order (front = oldest).
    queue: VecDeque<K>,

    /// Set for O(1) membership check.
    members: HashSet<K>,

    stats: PolicyStats,
    log: OperationLog<K>,
}

impl<K: Reference> FifoPolicy<K> {
    /// Create an empty FIFO policy.
    ///
    /// # Panics
    /// Panics if `capacity` is 0. Use [`PolicyRegistry`](super::PolicyRegistry)
    /// to get a configuration error instead.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");

        Self {
            capacity,
            queue: VecDeque::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
            stats: PolicyStats::new(),
            log: OperationLog::new(),
        }
    }

    /// Next reference to be evicted, if any.
    pub fn peek_oldest(&self) -> Option<&K> {
        self.queue.front()
    }

    fn evict_oldest(&mut self, incoming: &K) -> Option<K> {
        let victim = self.queue.pop_front()?;
        self.members.remove(&victim);
        self.stats.record_eviction();
        trace!("FIFO evicted {:?} for {:?}", victim, incoming);

        self.log.push(
            OperationKind::Evict,
            victim.clone(),
            self.resident(),
            OperationDetail::default().evicted_for(incoming.clone()),
        );
        Some(victim)
    }
}

impl<K: Reference> EvictionPolicy<K> for FifoPolicy<K> {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Fifo
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn access(&mut self, reference: &K) -> StepResult<K> {
        if self.members.contains(reference) {
            self.stats.record_hit();
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
        let evicted = if self.queue.len() >= self.capacity {
            self.evict_oldest(reference)
        } else {
            None
        };

        self.queue.push_back(reference.clone());
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
        self.queue.iter().cloned().collect()
    }

    fn contains(&self, reference: &K) -> bool {
        self.members.contains(reference)
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn operations(&self) -> &[Operation<K>] {
        self.log.as_slice()
    }

    fn reset(&mut self) {
        self.queue.clear();
        self.members.clear();
        self.stats.reset();
        self.log.clear();
    }
}
