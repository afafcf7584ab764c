//! Reference (trace alphabet) bound.

use std::fmt::Debug;
use std::hash::Hash;

/// One item of a memory-access trace.
///
/// References are opaque: policies only hash, compare and clone them.
/// No ordering between references is assumed. Anything satisfying the
/// bounds is a reference through the blanket impl.
///
/// # Example
/// ```
/// use evictsim::Reference;
///
/// fn takes_reference<K: Reference>(_: K) {}
///
/// takes_reference(7u32);
/// takes_reference("page-a".to_string());
/// ```
pub trait Reference: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> Reference for T {}
