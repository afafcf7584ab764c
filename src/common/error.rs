//! Error types for evictsim.

use thiserror::Error;

use crate::policy::PolicyKind;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in evictsim.
///
/// Every error is deterministic given its inputs, so nothing is retried.
/// Callers get the condition back immediately and the simulation state is
/// left exactly as it was before the failing call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The requested policy set, capacity or speed is unusable.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A step was requested past either end of the trace.
    #[error("sequence error: {0}")]
    Sequence(#[from] SequenceError),

    /// The driver is not in a state that allows the operation.
    #[error("state error: {0}")]
    State(#[from] StateError),
}

impl Error {
    /// Whether this error is a navigation no-op.
    ///
    /// Sequence errors mean "nothing to do" rather than "something broke":
    /// `current_step` and the history are untouched when one is returned.
    pub fn is_noop(&self) -> bool {
        matches!(self, Error::Sequence(_))
    }
}

/// Rejected configuration. Initialization is all-or-nothing, so none of
/// these leave a partially built policy set behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Identifier not present in the policy registry.
    #[error("unknown policy: {0:?}")]
    UnknownPolicy(String),

    /// Capacity must be positive.
    #[error("invalid capacity: {0} (must be > 0)")]
    InvalidCapacity(usize),

    /// At least one policy must be selected.
    #[error("no policies selected")]
    EmptyPolicySet,

    /// The same policy was selected twice.
    #[error("policy {0} selected more than once")]
    DuplicatePolicy(PolicyKind),

    /// Autoplay interval must be positive.
    #[error("invalid speed: {0}ms (must be > 0)")]
    InvalidSpeed(u64),
}

/// Navigation past the ends of the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// `step_forward` with no references left.
    #[error("trace exhausted after {total_steps} steps")]
    TraceExhausted { total_steps: usize },

    /// `step_backward` at step 0.
    #[error("already at the first step")]
    AtStart,
}

/// Operation not allowed in the driver's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    /// Stepping or resetting before `initialize`.
    #[error("simulation not initialized")]
    NotInitialized,

    /// Manual stepping while autoplay owns the driver.
    #[error("simulation is running")]
    Running,
}
