//! Timer-driven autoplay.
//!
//! A run is a worker thread that steps a shared driver on a fixed cadence
//! until the trace ends or the run is stopped. Cancellation does not rely
//! on waking the timer: every tick presents the token it was started with,
//! and the driver refuses tokens older than its current generation. Since
//! [`SimulationDriver::stop`] bumps the generation under the driver lock,
//! no tick can land after it returns.
//!
//! A stop requested through the [`AutoplayHandle`] is a flag instead. The
//! worker reads it after taking the driver lock and cancels its own token,
//! so the handle never has to wait for the lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, warn};
use parking_lot::{Condvar, Mutex};

use crate::common::{ConfigError, Reference, Result};
use crate::simulation::driver::{SimulationDriver, Tick};

/// A driver shared between the caller and an autoplay worker.
pub type SharedDriver<K> = Arc<Mutex<SimulationDriver<K>>>;

/// Wrap a driver for use with [`run`].
pub fn shared<K>(driver: SimulationDriver<K>) -> SharedDriver<K> {
    Arc::new(Mutex::new(driver))
}

/// How an autoplay run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Steps advanced by this run (replayed steps included).
    pub steps: usize,
    /// Whether the run reached the end of the trace.
    pub finished: bool,
}

/// Stop request shared by a handle and its worker.
///
/// The flag is checked by the worker under the driver lock; the condvar
/// only cuts the current sleep short.
#[derive(Debug, Default)]
struct StopSignal {
    raised: AtomicBool,
    lock: Mutex<()>,
    cv: Condvar,
}

impl StopSignal {
    /// Never blocks on the driver.
    fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
        let _guard = self.lock.lock();
        self.cv.notify_all();
    }

    fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }

    /// Sleep for `interval` unless raised first. Returns whether raised.
    fn sleep(&self, interval: Duration) -> bool {
        let deadline = Instant::now() + interval;
        let mut guard = self.lock.lock();
        while !self.is_raised() {
            if self.cv.wait_until(&mut guard, deadline).timed_out() {
                break;
            }
        }
        self.is_raised()
    }
}

/// Handle to a running autoplay.
///
/// Dropping the handle stops the run without waiting for the worker, and
/// no step lands after the drop. If the driver lock is free the driver
/// leaves `Running` before the drop returns; otherwise it does so as soon
/// as the worker next gets the lock. Dropping is safe while holding the
/// driver's guard.
///
/// # Deadlocks
/// [`stop`](Self::stop) and [`join`](Self::join) wait for the worker, and
/// the worker takes the driver lock on its way out. Calling either while
/// the current thread holds the driver's guard never returns. Release the
/// guard first, or drop the handle instead.
#[derive(Debug)]
pub struct AutoplayHandle<K> {
    driver: SharedDriver<K>,
    token: u64,
    signal: Arc<StopSignal>,
    worker: Option<JoinHandle<Result<RunSummary>>>,
}

impl<K> AutoplayHandle<K> {
    /// Stop the run and wait for the worker.
    ///
    /// Once this returns the driver is no longer `Running` on behalf of
    /// this run and no further step from it lands.
    ///
    /// # Errors
    /// The step error that ended the run, if any.
    pub fn stop(mut self) -> Result<RunSummary> {
        self.signal.raise();
        self.wait()
    }

    /// The driver this run steps.
    pub fn driver(&self) -> &SharedDriver<K> {
        &self.driver
    }

    /// Wait for the run to end on its own (end of trace, external stop,
    /// or error).
    ///
    /// # Errors
    /// The step error that ended the run, if any.
    pub fn join(mut self) -> Result<RunSummary> {
        self.wait()
    }

    /// Whether the worker has exited.
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, |w| w.is_finished())
    }

    fn wait(&mut self) -> Result<RunSummary> {
        match self.worker.take() {
            Some(worker) => match worker.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            },
            None => Ok(RunSummary {
                steps: 0,
                finished: false,
            }),
        }
    }
}

impl<K> Drop for AutoplayHandle<K> {
    fn drop(&mut self) {
        if self.worker.take().is_some() {
            self.signal.raise();
            // Leave `Running` right away when the lock is free; otherwise
            // the detached worker cancels once it gets the lock.
            if let Some(mut driver) = self.driver.try_lock() {
                driver.cancel(self.token);
            }
        }
    }
}

/// Start stepping `driver` forward every `interval`.
///
/// The first step happens one interval after the call.
///
/// # Errors
/// - `InvalidSpeed` if `interval` is zero
/// - `NotInitialized` / `Running` if the driver cannot start a run
/// - `TraceExhausted` if there is nothing left to step (no-op)
///
/// # Example
/// ```
/// use std::time::Duration;
/// use evictsim::simulation::{self, SimulationDriver};
///
/// let mut driver = SimulationDriver::new();
/// driver.initialize(["LRU"], 2).unwrap();
/// driver.load_trace(vec![1, 2, 1]);
///
/// let driver = simulation::shared(driver);
/// let handle = simulation::run(&driver, Duration::from_millis(1)).unwrap();
/// let summary = handle.join().unwrap();
/// assert!(summary.finished);
/// assert_eq!(driver.lock().current_step(), 3);
/// ```
pub fn run<K>(driver: &SharedDriver<K>, interval: Duration) -> Result<AutoplayHandle<K>>
where
    K: Reference + Send + 'static,
{
    if interval.is_zero() {
        return Err(ConfigError::InvalidSpeed(0).into());
    }

    let token = driver.lock().begin_autoplay()?;
    let signal = Arc::new(StopSignal::default());

    let worker = {
        let driver = Arc::clone(driver);
        let signal = Arc::clone(&signal);
        thread::spawn(move || run_worker(&driver, &signal, token, interval))
    };

    Ok(AutoplayHandle {
        driver: Arc::clone(driver),
        token,
        signal,
        worker: Some(worker),
    })
}

fn run_worker<K: Reference>(
    driver: &SharedDriver<K>,
    signal: &StopSignal,
    token: u64,
    interval: Duration,
) -> Result<RunSummary> {
    let mut steps = 0;
    loop {
        signal.sleep(interval);

        let mut guard = driver.lock();
        if signal.is_raised() {
            guard.cancel(token);
            debug!("autoplay stopped by its handle after {} steps", steps);
            return Ok(RunSummary {
                steps,
                finished: false,
            });
        }

        let tick = guard.autoplay_tick(token);
        drop(guard);
        match tick {
            Ok(Tick::Stepped) => steps += 1,
            Ok(Tick::Finished) => {
                debug!("autoplay finished after {} steps", steps + 1);
                return Ok(RunSummary {
                    steps: steps + 1,
                    finished: true,
                });
            }
            Ok(Tick::Cancelled) => {
                return Ok(RunSummary {
                    steps,
                    finished: false,
                })
            }
            Err(e) => {
                warn!("autoplay terminated: {}", e);
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    use crate::common::{Error, SequenceError, StateError};
    use crate::simulation::DriverStatus;

    fn shared_driver(trace: Vec<u32>) -> SharedDriver<u32> {
        let mut driver = SimulationDriver::new();
        driver.initialize(["FIFO", "LRU", "LFU"], 2).unwrap();
        driver.load_trace(trace);
        shared(driver)
    }

    #[test]
    fn test_run_to_completion() {
        let driver = shared_driver(vec![1, 2, 1, 3, 1]);

        let handle = run(&driver, Duration::from_millis(1)).unwrap();
        let summary = handle.join().unwrap();

        assert_eq!(
            summary,
            RunSummary {
                steps: 5,
                finished: true
            }
        );
        let d = driver.lock();
        assert!(d.is_finished());
        assert_eq!(d.history().len(), 5);
        assert_eq!(d.status(), DriverStatus::Paused);
    }

    #[test]
    fn test_stop_prevents_further_steps() {
        let driver = shared_driver((0..1000).collect());

        let handle = run(&driver, Duration::from_millis(2)).unwrap();
        thread::sleep(Duration::from_millis(10));
        let summary = handle.stop().unwrap();

        let stopped_at = driver.lock().current_step();
        assert_eq!(summary.steps, stopped_at);
        assert!(!summary.finished);

        thread::sleep(Duration::from_millis(20));
        assert_eq!(driver.lock().current_step(), stopped_at);
        assert_eq!(driver.lock().status(), DriverStatus::Paused);
    }

    #[test]
    fn test_driver_stop_cancels_worker() {
        let driver = shared_driver((0..1000).collect());

        let handle = run(&driver, Duration::from_millis(1)).unwrap();
        assert!(driver.lock().stop());
        let stopped_at = driver.lock().current_step();

        let summary = handle.join().unwrap();
        assert!(!summary.finished);
        assert_eq!(driver.lock().current_step(), stopped_at);
    }

    #[test]
    fn test_drop_stops_run() {
        let driver = shared_driver((0..1000).collect());

        let handle = run(&driver, Duration::from_millis(1)).unwrap();
        drop(handle);

        let stopped_at = driver.lock().current_step();
        thread::sleep(Duration::from_millis(10));
        assert_eq!(driver.lock().current_step(), stopped_at);
    }

    #[test]
    fn test_drop_while_holding_driver_guard() {
        let driver = shared_driver((0..1000).collect());
        let handle = run(&driver, Duration::from_millis(1)).unwrap();

        let (tx, rx) = mpsc::channel();
        let caller = Arc::clone(&driver);
        thread::spawn(move || {
            let mut guard = caller.lock();
            guard.stop();
            drop(handle);
            let step = guard.current_step();
            drop(guard);
            tx.send(step).unwrap();
        });

        let stopped_at = rx
            .recv_timeout(Duration::from_secs(3))
            .expect("dropping the handle blocked on the driver lock");
        thread::sleep(Duration::from_millis(10));
        assert_eq!(driver.lock().current_step(), stopped_at);
        assert_eq!(driver.lock().status(), DriverStatus::Paused);
    }

    #[test]
    fn test_drop_under_guard_lets_worker_cancel() {
        let driver = shared_driver((0..1000).collect());
        let handle = run(&driver, Duration::from_millis(1)).unwrap();
        assert!(Arc::ptr_eq(handle.driver(), &driver));

        let stopped_at = {
            let guard = driver.lock();
            drop(handle);
            guard.current_step()
        };

        // The worker cancels its own token once it gets the lock back
        let deadline = Instant::now() + Duration::from_secs(3);
        while driver.lock().status() == DriverStatus::Running {
            assert!(Instant::now() < deadline, "worker never cancelled its run");
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(driver.lock().status(), DriverStatus::Paused);
        assert_eq!(driver.lock().current_step(), stopped_at);
    }

    #[test]
    fn test_run_rejects_bad_start() {
        let driver = shared_driver(vec![1]);
        assert_eq!(
            run(&driver, Duration::ZERO).unwrap_err(),
            Error::Config(ConfigError::InvalidSpeed(0))
        );

        driver.lock().run_to_end().unwrap();
        assert_eq!(
            run(&driver, Duration::from_millis(1)).unwrap_err(),
            Error::Sequence(SequenceError::TraceExhausted { total_steps: 1 })
        );

        let uninit = shared(SimulationDriver::<u32>::new());
        assert_eq!(
            run(&uninit, Duration::from_millis(1)).unwrap_err(),
            Error::State(StateError::NotInitialized)
        );
    }

    #[test]
    fn test_second_run_while_running_rejected() {
        let driver = shared_driver((0..1000).collect());

        let handle = run(&driver, Duration::from_millis(5)).unwrap();
        assert_eq!(
            run(&driver, Duration::from_millis(5)).unwrap_err(),
            Error::State(StateError::Running)
        );
        handle.stop().unwrap();
    }
}
