//! Simulation driver - runs several policies in lockstep over one trace.
//!
//! The [`SimulationDriver`] provides:
//! - One policy instance per selected policy, built through the registry
//! - Forward stepping that feeds every policy the same reference
//! - A navigable history with per-step state snapshots
//! - Non-destructive backward navigation and replay

use log::debug;
use serde::{Deserialize, Serialize};

use crate::common::config::{validate_capacity, validate_policy_set};
use crate::common::{ConfigError, Reference, Result, SequenceError, SimulationConfig, StateError};
use crate::policy::{EvictionPolicy, Operation, Policy, PolicyKind, PolicyRegistry, PolicyState};
use crate::simulation::history::{History, HistoryEntry, PolicyStepResult, SimulationStep};

/// Lifecycle of a driver.
///
/// ```text
/// Uninitialized ──initialize──▶ Ready ──run──▶ Running ──stop/end──▶ Paused
///                                 ▲                ▲                   │
///                                 │                └───────run─────────┤
///                                 └──────────reset / initialize────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriverStatus {
    Uninitialized,
    Ready,
    Running,
    Paused,
}

/// Outcome of one autoplay tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tick {
    Stepped,
    Finished,
    Cancelled,
}

/// Drives the selected policies through a trace.
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────────────────────┐
/// │                      SimulationDriver                        │
/// │  ┌──────────────┐   trace[current_step]                      │
/// │  │ trace: Vec<K>│──────────┬──────────────┬──────────────┐   │
/// │  └──────────────┘          ▼              ▼              ▼   │
/// │                       ┌─────────┐    ┌─────────┐    ┌─────────┐
/// │                       │  FIFO   │    │   LRU   │    │   LFU   │
/// │                       └────┬────┘    └────┬────┘    └────┬────┘
/// │                            └──────────────┼──────────────┘   │
/// │                                           ▼                  │
/// │  ┌─────────────────────────────────────────────────────────┐ │
/// │  │ history: [step 0 + states] [step 1 + states] ...        │ │
/// │  └─────────────────────────────────────────────────────────┘ │
/// └──────────────────────────────────────────────────────────────┘
/// ```
///
/// # Navigation
/// `current_step` is the displayed position. The live policies always sit
/// at the furthest step ever taken (`history.len()`). Stepping back only
/// moves `current_step`; stepping forward below `history.len()` replays the
/// recorded step instead of calling `access` again, so counters are never
/// double-counted.
///
/// # Usage
/// ```
/// use evictsim::SimulationDriver;
///
/// let mut driver = SimulationDriver::new();
/// driver.initialize(["FIFO", "LRU"], 3).unwrap();
/// driver.load_trace(vec![1, 2, 3, 1, 4]);
///
/// driver.step_forward().unwrap();
/// driver.step_forward().unwrap();
/// driver.step_backward().unwrap();
/// assert_eq!(driver.current_step(), 1);
/// ```
#[derive(Debug)]
pub struct SimulationDriver<K> {
    registry: PolicyRegistry<K>,

    status: DriverStatus,

    /// Active policies in selection order.
    policies: Vec<Policy<K>>,

    capacity: usize,

    /// States of freshly built policies, displayed at position 0.
    initial_states: Vec<PolicyState<K>>,

    trace: Vec<K>,

    history: History<K>,

    /// Displayed position in `[0, total_steps]`.
    current_step: usize,

    /// Bumped whenever an autoplay run must stop acting on this driver.
    generation: u64,
}

impl<K: Reference> SimulationDriver<K> {
    /// Create an uninitialized driver using the standard registry.
    pub fn new() -> Self {
        Self::with_registry(PolicyRegistry::standard())
    }

    /// Create an uninitialized driver that resolves identifiers through
    /// `registry`.
    pub fn with_registry(registry: PolicyRegistry<K>) -> Self {
        Self {
            registry,
            status: DriverStatus::Uninitialized,
            policies: Vec::new(),
            capacity: 0,
            initial_states: Vec::new(),
            trace: Vec::new(),
            history: History::new(),
            current_step: 0,
            generation: 0,
        }
    }

    // ========================================================================
    // Public API: Configuration
    // ========================================================================

    /// Discard all policies and history and build fresh policies.
    ///
    /// The loaded trace is kept. All-or-nothing: on error the driver is
    /// left exactly as it was.
    ///
    /// # Errors
    /// - `EmptyPolicySet` if no identifiers are given
    /// - `UnknownPolicy` for an unregistered identifier
    /// - `DuplicatePolicy` if an identifier repeats
    /// - `InvalidCapacity` if `capacity` is 0
    pub fn initialize<I, S>(&mut self, identifiers: I, capacity: usize) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let identifiers: Vec<S> = identifiers.into_iter().collect();
        if identifiers.is_empty() {
            return Err(ConfigError::EmptyPolicySet.into());
        }
        validate_capacity(capacity)?;

        let policies = identifiers
            .iter()
            .map(|id| self.registry.create(id.as_ref(), capacity))
            .collect::<Result<Vec<_>>>()?;
        let kinds: Vec<PolicyKind> = policies.iter().map(|p| p.kind()).collect();
        validate_policy_set(&kinds)?;

        self.capacity = capacity;
        self.install(policies);
        debug!(
            "initialized {:?} with capacity {} ({} references loaded)",
            kinds,
            capacity,
            self.trace.len()
        );
        Ok(())
    }

    /// [`initialize`](Self::initialize) from a config.
    ///
    /// # Errors
    /// Any error from [`SimulationConfig::validate`].
    pub fn initialize_with(&mut self, config: &SimulationConfig) -> Result<()> {
        config.validate()?;
        self.initialize(config.policies.iter().map(|k| k.identifier()), config.capacity)
    }

    /// Load the trace to simulate.
    ///
    /// Does not advance the simulation. If the driver is initialized, its
    /// history belongs to the old trace and is discarded along with the
    /// policies' state, exactly as [`reset`](Self::reset) does.
    pub fn load_trace(&mut self, trace: impl Into<Vec<K>>) {
        self.trace = trace.into();
        debug!("loaded trace of {} references", self.trace.len());

        if self.status != DriverStatus::Uninitialized {
            self.rebuild();
        }
    }

    /// Rebuild every policy with the same identifiers and capacity, clear
    /// history and rewind to step 0. The trace is kept.
    ///
    /// # Errors
    /// `NotInitialized` before the first [`initialize`](Self::initialize).
    pub fn reset(&mut self) -> Result<()> {
        self.ensure_initialized()?;
        self.rebuild();
        debug!("reset to step 0 of {}", self.trace.len());
        Ok(())
    }

    fn rebuild(&mut self) {
        for policy in &mut self.policies {
            policy.reset();
        }
        let policies = std::mem::take(&mut self.policies);
        self.install(policies);
    }

    fn install(&mut self, policies: Vec<Policy<K>>) {
        self.initial_states = policies.iter().map(|p| p.state()).collect();
        self.policies = policies;
        self.history.clear();
        self.current_step = 0;
        self.status = DriverStatus::Ready;
        self.generation += 1;
    }

    // ========================================================================
    // Public API: Navigation
    // ========================================================================

    /// Advance one step and return it.
    ///
    /// Below the furthest recorded step this replays the recorded step
    /// without touching the policies.
    ///
    /// # Errors
    /// - `NotInitialized` before `initialize`
    /// - `Running` while autoplay owns the driver
    /// - `TraceExhausted` at the end of the trace (no-op)
    pub fn step_forward(&mut self) -> Result<SimulationStep<K>> {
        self.ensure_idle()?;
        self.advance()
    }

    /// Move the displayed position back one step and return the policy
    /// states recorded for the new position.
    ///
    /// Live policy state is never rolled back. At step 0 the returned
    /// states are those of the freshly built policies.
    ///
    /// # Errors
    /// - `NotInitialized` before `initialize`
    /// - `Running` while autoplay owns the driver
    /// - `AtStart` at step 0 (no-op)
    pub fn step_backward(&mut self) -> Result<&[PolicyState<K>]> {
        self.ensure_idle()?;
        if self.current_step == 0 {
            return Err(SequenceError::AtStart.into());
        }
        self.current_step -= 1;
        Ok(self.displayed_states())
    }

    /// Step forward until the end of the trace.
    ///
    /// Returns the number of steps taken, replayed ones included.
    ///
    /// # Errors
    /// - `NotInitialized` before `initialize`
    /// - `Running` while autoplay owns the driver
    pub fn run_to_end(&mut self) -> Result<usize> {
        self.ensure_idle()?;
        let mut steps = 0;
        while self.current_step < self.trace.len() {
            self.advance()?;
            steps += 1;
        }
        Ok(steps)
    }

    pub(crate) fn advance(&mut self) -> Result<SimulationStep<K>> {
        self.ensure_initialized()?;

        let total_steps = self.trace.len();
        if self.current_step >= total_steps {
            return Err(SequenceError::TraceExhausted { total_steps }.into());
        }

        if let Some(entry) = self.history.get(self.current_step) {
            let step = entry.step.clone();
            self.current_step += 1;
            return Ok(step);
        }

        let step_index = self.current_step;
        let reference = self.trace[step_index].clone();

        let results = self
            .policies
            .iter_mut()
            .map(|policy| PolicyStepResult {
                kind: policy.kind(),
                result: policy.access(&reference),
            })
            .collect();
        let step = SimulationStep {
            step_index,
            reference,
            results,
        };
        let states = self.policies.iter().map(|p| p.state()).collect();

        self.history.push(HistoryEntry {
            step: step.clone(),
            states,
        });
        self.current_step += 1;
        Ok(step)
    }

    // ========================================================================
    // Autoplay hooks
    // ========================================================================

    /// Enter `Running` and hand out the token the autoplay worker must
    /// present on every tick.
    pub(crate) fn begin_autoplay(&mut self) -> Result<u64> {
        self.ensure_idle()?;
        let total_steps = self.trace.len();
        if self.current_step >= total_steps {
            return Err(SequenceError::TraceExhausted { total_steps }.into());
        }

        self.generation += 1;
        self.status = DriverStatus::Running;
        debug!("autoplay started at step {}", self.current_step);
        Ok(self.generation)
    }

    /// Advance one step on behalf of the run holding `token`.
    pub(crate) fn autoplay_tick(&mut self, token: u64) -> Result<Tick> {
        if token != self.generation {
            return Ok(Tick::Cancelled);
        }

        match self.advance() {
            Ok(_) if self.is_finished() => {
                self.status = DriverStatus::Paused;
                debug!("autoplay reached the end of the trace");
                Ok(Tick::Finished)
            }
            Ok(_) => Ok(Tick::Stepped),
            Err(e) => {
                self.status = DriverStatus::Paused;
                Err(e)
            }
        }
    }

    // ========================================================================
    // Public API: Read access
    // ========================================================================

    pub fn status(&self) -> DriverStatus {
        self.status
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.trace.len()
    }

    pub fn is_finished(&self) -> bool {
        self.current_step == self.trace.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn trace(&self) -> &[K] {
        &self.trace
    }

    pub fn history(&self) -> &History<K> {
        &self.history
    }

    /// Active policy kinds in selection order.
    pub fn kinds(&self) -> Vec<PolicyKind> {
        self.policies.iter().map(|p| p.kind()).collect()
    }

    pub fn policies(&self) -> &[Policy<K>] {
        &self.policies
    }

    pub fn policy(&self, kind: PolicyKind) -> Option<&Policy<K>> {
        self.policies.iter().find(|p| p.kind() == kind)
    }

    /// The step shown at the current position (`None` at step 0).
    pub fn current_entry(&self) -> Option<&HistoryEntry<K>> {
        self.current_step
            .checked_sub(1)
            .and_then(|i| self.history.get(i))
    }

    /// Policy states as of the displayed position.
    pub fn displayed_states(&self) -> &[PolicyState<K>] {
        match self.current_entry() {
            Some(entry) => &entry.states,
            None => &self.initial_states,
        }
    }

    /// Live state of every policy, i.e. at the furthest step taken.
    pub fn live_states(&self) -> Vec<PolicyState<K>> {
        self.policies.iter().map(|p| p.state()).collect()
    }

    pub fn policy_state(&self, kind: PolicyKind) -> Option<PolicyState<K>> {
        self.policy(kind).map(|p| p.state())
    }

    /// Live operation log of one policy.
    pub fn operations(&self, kind: PolicyKind) -> Option<&[Operation<K>]> {
        self.policy(kind).map(|p| p.operations())
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    fn ensure_initialized(&self) -> Result<()> {
        if self.status == DriverStatus::Uninitialized {
            return Err(StateError::NotInitialized.into());
        }
        Ok(())
    }

    fn ensure_idle(&self) -> Result<()> {
        match self.status {
            DriverStatus::Uninitialized => Err(StateError::NotInitialized.into()),
            DriverStatus::Running => Err(StateError::Running.into()),
            DriverStatus::Ready | DriverStatus::Paused => Ok(()),
        }
    }
}

impl<K> SimulationDriver<K> {
    /// Stop autoplay. Returns whether a run was in progress.
    ///
    /// Once this returns no further autoplay step lands on this driver.
    pub fn stop(&mut self) -> bool {
        self.generation += 1;
        if self.status == DriverStatus::Running {
            self.status = DriverStatus::Paused;
            debug!("autoplay stopped at step {}", self.current_step);
            true
        } else {
            false
        }
    }

    /// Stop the run holding `token`, if it is still the current one.
    pub(crate) fn cancel(&mut self, token: u64) {
        if token == self.generation {
            self.stop();
        }
    }
}

impl<K: Reference> Default for SimulationDriver<K> {
    fn default() -> Self {
        Self::new()
    }
}
