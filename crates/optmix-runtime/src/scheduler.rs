#![forbid(unsafe_code)]

//! Cooperative timer queue for deferred handler calls.
//!
//! Debounced handlers do not run on the stack of the setter that triggered
//! them; they are parked in a [`Scheduler`] and run when the host drives the
//! queue with [`Scheduler::run_due`], typically once per turn of its event
//! loop. Nothing here spawns threads.
//!
//! # Invariants
//!
//! 1. Due timers run in deadline order; equal deadlines run in scheduling
//!    order.
//! 2. A cancelled timer never runs.
//! 3. `run_due` only runs timers that were scheduled before it started.
//!    A zero-wait timer scheduled by a running task waits for the next call,
//!    so a task that reschedules itself cannot spin one `run_due` forever.
//! 4. The queue holds no borrow while a task runs; tasks may schedule and
//!    cancel freely.
//!
//! # Failure Modes
//!
//! - Task returns `Err`: `run_due` stops and returns it. Timers not yet run
//!   stay queued for the next call.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use ahash::AHashMap;
use optmix_core::HandlerError;
use web_time::{Duration, Instant};

/// Source of the current time.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give
/// another to the scheduler.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Rc<Cell<Duration>>,
}

impl ManualClock {
    /// Create a clock stopped at an arbitrary origin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }

    /// Time elapsed since the origin.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed.get()
    }
}

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

type Task = Box<dyn FnOnce() -> Result<(), HandlerError>>;

struct SchedulerInner {
    clock: Rc<dyn Clock>,
    next_id: u64,
    queue: BTreeMap<(Instant, u64), Task>,
    deadlines: AHashMap<u64, Instant>,
}

/// Single-threaded timer queue.
///
/// Cloning a `Scheduler` creates a new handle to the **same** queue.
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl Scheduler {
    /// Create a scheduler driven by the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Create a scheduler driven by `clock`.
    #[must_use]
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                clock: Rc::new(clock),
                next_id: 0,
                queue: BTreeMap::new(),
                deadlines: AHashMap::new(),
            })),
        }
    }

    /// The scheduler's notion of now.
    #[must_use]
    pub fn now(&self) -> Instant {
        let clock = Rc::clone(&self.inner.borrow().clock);
        clock.now()
    }

    /// Run `task` once `delay` has elapsed.
    pub fn schedule(
        &self,
        delay: Duration,
        task: impl FnOnce() -> Result<(), HandlerError> + 'static,
    ) -> TimerId {
        let deadline = self.now() + delay;
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.queue.insert((deadline, id), Box::new(task));
        inner.deadlines.insert(id, deadline);
        tracing::trace!(timer = id, delay_ms = millis(delay), "timer scheduled");
        TimerId(id)
    }

    /// Cancel a pending timer. Returns `false` if it already ran or was
    /// cancelled.
    pub fn cancel(&self, timer: TimerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(deadline) = inner.deadlines.remove(&timer.0) else {
            return false;
        };
        let removed = inner.queue.remove(&(deadline, timer.0)).is_some();
        if removed {
            tracing::trace!(timer = timer.0, "timer cancelled");
        }
        removed
    }

    /// Whether `timer` is still queued.
    #[must_use]
    pub fn is_scheduled(&self, timer: TimerId) -> bool {
        self.inner.borrow().deadlines.contains_key(&timer.0)
    }

    /// Number of queued timers.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    /// Deadline of the earliest queued timer.
    ///
    /// A host loop can sleep until this instant.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.inner
            .borrow()
            .queue
            .keys()
            .next()
            .map(|(deadline, _)| *deadline)
    }

    /// Run every timer whose deadline has passed.
    ///
    /// Returns the number of tasks run.
    ///
    /// # Errors
    ///
    /// Returns the first task failure. Remaining due timers stay queued.
    pub fn run_due(&self) -> Result<usize, HandlerError> {
        let now = self.now();
        let horizon = self.inner.borrow().next_id;
        let mut ran = 0;

        loop {
            let task = {
                let mut inner = self.inner.borrow_mut();
                let key = inner
                    .queue
                    .range(..=(now, u64::MAX))
                    .find(|((_, id), _)| *id < horizon)
                    .map(|(key, _)| *key);
                let Some(key) = key else {
                    break;
                };
                inner.deadlines.remove(&key.1);
                inner.queue.remove(&key)
            };
            let Some(task) = task else {
                break;
            };
            ran += 1;
            task()?;
        }

        if ran > 0 {
            tracing::trace!(ran, "timers fired");
        }
        Ok(ran)
    }

    /// Drop every queued timer without running it.
    pub fn clear(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.queue.clear();
        inner.deadlines.clear();
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.pending())
            .finish()
    }
}
