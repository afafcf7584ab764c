//! Append-only operation log kept by every policy.

use serde::{Deserialize, Serialize};

/// What happened in one logged operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Hit,
    Miss,
    Evict,
}

/// Extra information attached to an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDetail<K> {
    /// On a miss: the reference evicted to make room, if any.
    pub evicted: Option<K>,

    /// On an evict: the reference being admitted.
    pub evicted_for: Option<K>,

    /// LFU only: the reference's frequency after the operation.
    pub frequency: Option<u64>,
}

impl<K> Default for OperationDetail<K> {
    fn default() -> Self {
        Self {
            evicted: None,
            evicted_for: None,
            frequency: None,
        }
    }
}

impl<K> OperationDetail<K> {
    pub fn evicted(mut self, evicted: Option<K>) -> Self {
        self.evicted = evicted;
        self
    }

    pub fn evicted_for(mut self, reference: K) -> Self {
        self.evicted_for = Some(reference);
        self
    }

    pub fn frequency(mut self, frequency: u64) -> Self {
        self.frequency = Some(frequency);
        self
    }
}

/// One entry of the log.
///
/// `resident` is the resident set right after the operation, in the
/// policy's internal order. An entry's position in the log is its
/// logical time; there are no wall-clock timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation<K> {
    pub kind: OperationKind,
    pub reference: K,
    pub resident: Vec<K>,
    pub detail: OperationDetail<K>,
}

/// Ordered, append-only sequence of operations.
///
/// Owned by exactly one policy and only handed out as a slice.
#[derive(Debug, Clone)]
pub struct OperationLog<K> {
    entries: Vec<Operation<K>>,
}

impl<K> OperationLog<K> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub(crate) fn push(
        &mut self,
        kind: OperationKind,
        reference: K,
        resident: Vec<K>,
        detail: OperationDetail<K>,
    ) {
        self.entries.push(Operation {
            kind,
            reference,
            resident,
            detail,
        });
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn as_slice(&self) -> &[Operation<K>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries of the given kind.
    pub fn count(&self, kind: OperationKind) -> usize {
        self.entries.iter().filter(|op| op.kind == kind).count()
    }
}

impl<K> Default for OperationLog<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_appends_in_order() {
        let mut log = OperationLog::new();
        log.push(OperationKind::Miss, 1, vec![1], OperationDetail::default());
        log.push(OperationKind::Hit, 1, vec![1], OperationDetail::default());

        assert_eq!(log.len(), 2);
        assert_eq!(log.as_slice()[0].kind, OperationKind::Miss);
        assert_eq!(log.as_slice()[1].kind, OperationKind::Hit);
        assert_eq!(log.count(OperationKind::Hit), 1);
        assert_eq!(log.count(OperationKind::Evict), 0);
    }

    #[test]
    fn test_detail_builders() {
        let detail = OperationDetail::default()
            .evicted(Some(3))
            .frequency(1);
        assert_eq!(detail.evicted, Some(3));
        assert_eq!(detail.evicted_for, None);
        assert_eq!(detail.frequency, Some(1));
    }

    #[test]
    fn test_clear() {
        let mut log = OperationLog::new();
        log.push(OperationKind::Miss, 'a', vec!['a'], OperationDetail::default());
        log.clear();
        assert!(log.is_empty());
    }
}
