//! Policy registry: identifier -> constructor.

use super::{
    EvictionPolicy, FifoPolicy, LfuPolicy, LruPolicy, Operation, PolicyKind, StatsSnapshot,
    StepResult,
};
use crate::common::config::validate_capacity;
use crate::common::{ConfigError, Reference, Result};

/// A policy instance. The set of policies is closed, so dispatch is a
/// `match` rather than a trait object.
#[derive(Debug, Clone)]
pub enum Policy<K> {
    Fifo(FifoPolicy<K>),
    Lru(LruPolicy<K>),
    Lfu(LfuPolicy<K>),
}

macro_rules! dispatch {
    ($self:expr, $p:ident => $body:expr) => {
        match $self {
            Policy::Fifo($p) => $body,
            Policy::Lru($p) => $body,
            Policy::Lfu($p) => $body,
        }
    };
}

impl<K: Reference> Policy<K> {
    /// The LFU instance, when this is one.
    pub fn as_lfu(&self) -> Option<&LfuPolicy<K>> {
        match self {
            Policy::Lfu(p) => Some(p),
            _ => None,
        }
    }
}

impl<K: Reference> EvictionPolicy<K> for Policy<K> {
    fn kind(&self) -> PolicyKind {
        dispatch!(self, p => p.kind())
    }

    fn capacity(&self) -> usize {
        dispatch!(self, p => p.capacity())
    }

    fn access(&mut self, reference: &K) -> StepResult<K> {
        dispatch!(self, p => p.access(reference))
    }

    fn resident(&self) -> Vec<K> {
        dispatch!(self, p => p.resident())
    }

    fn contains(&self, reference: &K) -> bool {
        dispatch!(self, p => p.contains(reference))
    }

    fn len(&self) -> usize {
        dispatch!(self, p => p.len())
    }

    fn stats(&self) -> StatsSnapshot {
        dispatch!(self, p => p.stats())
    }

    fn operations(&self) -> &[Operation<K>] {
        dispatch!(self, p => p.operations())
    }

    fn reset(&mut self) {
        dispatch!(self, p => p.reset())
    }
}

/// One row of the registration table.
#[derive(Debug)]
pub struct Registration<K> {
    pub kind: PolicyKind,
    pub identifier: &'static str,
    constructor: fn(usize) -> Policy<K>,
}

impl<K> Clone for Registration<K> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            identifier: self.identifier,
            constructor: self.constructor,
        }
    }
}

/// Maps policy identifiers to constructors.
///
/// The table is fixed once the registry is built and nothing else is
/// shared between the instances it creates. Custom tables start from
/// [`empty`](Self::empty) or [`standard`](Self::standard) and add rows with
/// [`register`](Self::register), e.g. to offer only some policies or to
/// accept extra names for them.
///
/// # Example
/// ```
/// use evictsim::{EvictionPolicy, FifoPolicy, Policy, PolicyKind, PolicyRegistry};
///
/// let registry = PolicyRegistry::<u32>::standard();
/// let policy = registry.create("LRU", 4).unwrap();
/// assert_eq!(policy.kind(), PolicyKind::Lru);
/// assert!(registry.create("MRU", 4).is_err());
///
/// let queue_only = PolicyRegistry::<u32>::empty()
///     .register(PolicyKind::Fifo, "queue", |capacity| Policy::Fifo(FifoPolicy::new(capacity)));
/// assert_eq!(queue_only.create("QUEUE", 2).unwrap().kind(), PolicyKind::Fifo);
/// assert!(queue_only.create("LRU", 2).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PolicyRegistry<K> {
    table: Vec<Registration<K>>,
}

impl<K: Reference> PolicyRegistry<K> {
    /// Registry with nothing registered.
    pub fn empty() -> Self {
        Self { table: Vec::new() }
    }

    /// Registry with FIFO, LRU and LFU, in that order.
    pub fn standard() -> Self {
        Self::empty()
            .register(PolicyKind::Fifo, PolicyKind::Fifo.identifier(), |capacity| {
                Policy::Fifo(FifoPolicy::new(capacity))
            })
            .register(PolicyKind::Lru, PolicyKind::Lru.identifier(), |capacity| {
                Policy::Lru(LruPolicy::new(capacity))
            })
            .register(PolicyKind::Lfu, PolicyKind::Lfu.identifier(), |capacity| {
                Policy::Lfu(LfuPolicy::new(capacity))
            })
    }

    /// Add a row mapping `identifier` to `constructor`.
    ///
    /// An existing row with the same identifier (case-insensitive) is
    /// replaced in place. `constructor` must build a policy of `kind` and is
    /// only ever called with a capacity of at least 1.
    pub fn register(
        mut self,
        kind: PolicyKind,
        identifier: &'static str,
        constructor: fn(usize) -> Policy<K>,
    ) -> Self {
        let registration = Registration {
            kind,
            identifier,
            constructor,
        };
        match self
            .table
            .iter_mut()
            .find(|r| r.identifier.eq_ignore_ascii_case(identifier))
        {
            Some(existing) => *existing = registration,
            None => self.table.push(registration),
        }
        self
    }

    /// Registered kinds in table order. A kind registered under several
    /// identifiers appears once per row.
    pub fn kinds(&self) -> impl Iterator<Item = PolicyKind> + '_ {
        self.table.iter().map(|r| r.kind)
    }

    /// Find a registration by identifier (case-insensitive).
    ///
    /// # Errors
    /// `UnknownPolicy` if nothing is registered under `identifier`.
    pub fn lookup(&self, identifier: &str) -> Result<&Registration<K>> {
        let trimmed = identifier.trim();
        self.table
            .iter()
            .find(|r| r.identifier.eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ConfigError::UnknownPolicy(identifier.to_string()).into())
    }

    /// Create a policy by identifier.
    ///
    /// # Errors
    /// - `UnknownPolicy` for an unregistered identifier
    /// - `InvalidCapacity` if `capacity` is 0
    pub fn create(&self, identifier: &str, capacity: usize) -> Result<Policy<K>> {
        let registration = self.lookup(identifier)?;
        validate_capacity(capacity)?;
        let policy = (registration.constructor)(capacity);
        debug_assert_eq!(policy.kind(), registration.kind);
        Ok(policy)
    }

    /// Create a policy by kind.
    ///
    /// # Errors
    /// Same as [`create`](Self::create).
    pub fn create_kind(&self, kind: PolicyKind, capacity: usize) -> Result<Policy<K>> {
        self.create(kind.identifier(), capacity)
    }
}

impl<K: Reference> Default for PolicyRegistry<K> {
    fn default() -> Self {
        Self::standard()
    }
}
