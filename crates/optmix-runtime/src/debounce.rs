#![forbid(unsafe_code)]

//! Debounce adapter over a [`Scheduler`].
//!
//! [`Debounced`] wraps a callback so bursts of calls collapse into one
//! invocation. Each call cancels the pending timer and starts a new wait
//! window; what runs, and when, depends on the [`DebounceEdge`]:
//!
//! | Edge | First call of a burst | Later calls | Window expires |
//! |------|-----------------------|-------------|----------------|
//! | `Trailing` | deferred | deferred | runs with the latest argument |
//! | `Leading` | runs now | dropped | nothing, window reopens |
//! | `Both` | runs now | deferred | runs with the latest argument if a later call arrived |
//!
//! # Invariants
//!
//! 1. At most one timer is pending per adapter.
//! 2. The trailing call always receives the argument of the most recent call.
//! 3. The callback never runs re-entrantly from the adapter's own timer.
//! 4. Clones share the timer and argument slot; one burst through any clone
//!    is one burst.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use optmix_core::HandlerError;
use web_time::Duration;

use crate::scheduler::{Scheduler, TimerId};

/// Which edge of a burst invokes the callback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum DebounceEdge {
    /// Run once after the burst settles.
    #[default]
    Trailing,
    /// Run on the first call, ignore the rest of the burst.
    Leading,
    /// Run on the first call and again after the burst if it continued.
    Both,
}

/// Wait window and edge for debounced handlers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebounceConfig {
    /// Quiet period that ends a burst. Zero defers to the next scheduler turn.
    pub wait: Duration,
    pub edge: DebounceEdge,
}

impl DebounceConfig {
    /// Trailing-edge debounce with `wait`.
    #[must_use]
    pub const fn trailing(wait: Duration) -> Self {
        Self {
            wait,
            edge: DebounceEdge::Trailing,
        }
    }

    /// Same edge, different wait.
    #[must_use]
    pub const fn with_wait(self, wait: Duration) -> Self {
        Self { wait, ..self }
    }
}

type Callback<A> = Rc<dyn Fn(&A) -> Result<(), HandlerError>>;

struct DebouncedInner<A> {
    callback: Callback<A>,
    config: DebounceConfig,
    scheduler: Scheduler,
    timer: Cell<Option<TimerId>>,
    latest: RefCell<Option<A>>,
}

/// A debounced callback.
pub struct Debounced<A> {
    inner: Rc<DebouncedInner<A>>,
}

impl<A> Clone for Debounced<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Debounce `callback` on `scheduler`.
///
/// `fire_immediately` selects [`DebounceEdge::Both`]: the first call of a
/// burst runs synchronously and the trailing edge stays active. Otherwise
/// the adapter is trailing-only.
pub fn debounce<A: 'static>(
    callback: impl Fn(&A) -> Result<(), HandlerError> + 'static,
    wait: Duration,
    fire_immediately: bool,
    scheduler: &Scheduler,
) -> Debounced<A> {
    let edge = if fire_immediately {
        DebounceEdge::Both
    } else {
        DebounceEdge::Trailing
    };
    Debounced::new(Rc::new(callback), DebounceConfig { wait, edge }, scheduler.clone())
}

impl<A: 'static> Debounced<A> {
    /// Wrap a shared callback.
    #[must_use]
    pub fn new(
        callback: Rc<dyn Fn(&A) -> Result<(), HandlerError>>,
        config: DebounceConfig,
        scheduler: Scheduler,
    ) -> Self {
        Self {
            inner: Rc::new(DebouncedInner {
                callback,
                config,
                scheduler,
                timer: Cell::new(None),
                latest: RefCell::new(None),
            }),
        }
    }

    /// Register a call with `arg`.
    ///
    /// # Errors
    ///
    /// Only leading-edge invocations run here; their failure is returned.
    /// Trailing invocations report through [`Scheduler::run_due`].
    pub fn call(&self, arg: A) -> Result<(), HandlerError> {
        let inner = &self.inner;
        let open = self.live_timer();
        let call_now = open.is_none() && inner.config.edge != DebounceEdge::Trailing;

        match open {
            Some(timer) => {
                inner.scheduler.cancel(timer);
            }
            // A window the scheduler dropped leaves nothing to carry over.
            None => {
                inner.latest.borrow_mut().take();
            }
        }

        let weak = Rc::downgrade(&self.inner);
        let timer = inner
            .scheduler
            .schedule(inner.config.wait, move || fire_trailing(&weak));
        inner.timer.set(Some(timer));

        if call_now {
            (inner.callback)(&arg)
        } else {
            if inner.config.edge != DebounceEdge::Leading {
                *inner.latest.borrow_mut() = Some(arg);
            }
            Ok(())
        }
    }

    /// Run the pending trailing call now instead of waiting.
    ///
    /// Returns `Ok(false)` if nothing was pending.
    pub fn flush(&self) -> Result<bool, HandlerError> {
        let Some(timer) = self.live_timer() else {
            self.inner.latest.borrow_mut().take();
            return Ok(false);
        };
        self.inner.timer.set(None);
        self.inner.scheduler.cancel(timer);
        let arg = self.inner.latest.borrow_mut().take();
        match arg {
            Some(arg) => (self.inner.callback)(&arg).map(|()| true),
            None => Ok(false),
        }
    }

    /// Drop the pending call, if any.
    pub fn cancel(&self) {
        if let Some(timer) = self.inner.timer.take() {
            self.inner.scheduler.cancel(timer);
        }
        self.inner.latest.borrow_mut().take();
    }

    /// Whether a wait window is open.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.live_timer().is_some()
    }

    /// Take the stored timer, keeping it only if the scheduler still has it
    /// queued. [`Scheduler::clear`] closes the window without notifying the
    /// adapter.
    fn live_timer(&self) -> Option<TimerId> {
        let inner = &self.inner;
        let timer = inner.timer.take()?;
        if inner.scheduler.is_scheduled(timer) {
            inner.timer.set(Some(timer));
            Some(timer)
        } else {
            None
        }
    }

    #[must_use]
    pub fn config(&self) -> DebounceConfig {
        self.inner.config
    }
}

fn fire_trailing<A>(weak: &Weak<DebouncedInner<A>>) -> Result<(), HandlerError> {
    let Some(inner) = weak.upgrade() else {
        return Ok(());
    };
    inner.timer.set(None);
    let arg = inner.latest.borrow_mut().take();
    match arg {
        Some(arg) => (inner.callback)(&arg),
        None => Ok(()),
    }
}

impl<A> std::fmt::Debug for Debounced<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debounced")
            .field("config", &self.inner.config)
            .field(
                "pending",
                &self
                    .inner
                    .timer
                    .get()
                    .is_some_and(|t| self.inner.scheduler.is_scheduled(t)),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualClock;

    struct Rig {
        clock: ManualClock,
        scheduler: Scheduler,
        calls: Rc<RefCell<Vec<u32>>>,
    }

    impl Rig {
        fn new() -> Self {
            let clock = ManualClock::new();
            let scheduler = Scheduler::with_clock(clock.clone());
            Self {
                clock,
                scheduler,
                calls: Rc::new(RefCell::new(Vec::new())),
            }
        }

        fn debounced(&self, wait_ms: u64, edge: DebounceEdge) -> Debounced<u32> {
            let calls = Rc::clone(&self.calls);
            Debounced::new(
                Rc::new(move |v: &u32| {
                    calls.borrow_mut().push(*v);
                    Ok(())
                }),
                DebounceConfig {
                    wait: Duration::from_millis(wait_ms),
                    edge,
                },
                self.scheduler.clone(),
            )
        }

        fn tick(&self, ms: u64) {
            self.clock.advance(Duration::from_millis(ms));
            self.scheduler.run_due().unwrap();
        }

        fn calls(&self) -> Vec<u32> {
            self.calls.borrow().clone()
        }
    }

    #[test]
    fn trailing_coalesces_burst_with_latest_argument() {
        let rig = Rig::new();
        let d = rig.debounced(50, DebounceEdge::Trailing);

        d.call(1).unwrap();
        rig.tick(20);
        d.call(2).unwrap();
        rig.tick(20);
        d.call(3).unwrap();
        assert!(rig.calls().is_empty());

        rig.tick(49);
        assert!(rig.calls().is_empty(), "window restarted by the last call");
        rig.tick(1);
        assert_eq!(rig.calls(), [3]);
        assert!(!d.is_pending());
    }

    #[test]
    fn one_timer_per_adapter() {
        let rig = Rig::new();
        let d = rig.debounced(10, DebounceEdge::Trailing);
        for i in 0..5 {
            d.call(i).unwrap();
        }
        assert_eq!(rig.scheduler.pending(), 1);
    }

    #[test]
    fn separate_bursts_fire_separately() {
        let rig = Rig::new();
        let d = rig.debounced(10, DebounceEdge::Trailing);
        d.call(1).unwrap();
        rig.tick(10);
        d.call(2).unwrap();
        rig.tick(10);
        assert_eq!(rig.calls(), [1, 2]);
    }

    #[test]
    fn zero_wait_defers_to_next_turn() {
        let rig = Rig::new();
        let d = rig.debounced(0, DebounceEdge::Trailing);
        d.call(1).unwrap();
        d.call(2).unwrap();
        assert!(rig.calls().is_empty());
        rig.tick(0);
        assert_eq!(rig.calls(), [2]);
    }

    #[test]
    fn both_edges_single_call_fires_once() {
        let rig = Rig::new();
        let d = rig.debounced(10, DebounceEdge::Both);
        d.call(1).unwrap();
        assert_eq!(rig.calls(), [1]);
        rig.tick(10);
        assert_eq!(rig.calls(), [1]);
    }

    #[test]
    fn both_edges_burst_fires_leading_and_trailing() {
        let rig = Rig::new();
        let d = rig.debounced(10, DebounceEdge::Both);
        d.call(1).unwrap();
        d.call(2).unwrap();
        d.call(3).unwrap();
        assert_eq!(rig.calls(), [1]);
        rig.tick(10);
        assert_eq!(rig.calls(), [1, 3]);

        // Window closed: next call is a new leading edge.
        d.call(4).unwrap();
        assert_eq!(rig.calls(), [1, 3, 4]);
    }

    #[test]
    fn leading_edge_ignores_rest_of_burst() {
        let rig = Rig::new();
        let d = rig.debounced(10, DebounceEdge::Leading);
        d.call(1).unwrap();
        rig.tick(5);
        d.call(2).unwrap();
        rig.tick(5);
        d.call(3).unwrap();
        assert_eq!(rig.calls(), [1]);

        rig.tick(10);
        assert_eq!(rig.calls(), [1]);
        d.call(4).unwrap();
        assert_eq!(rig.calls(), [1, 4]);
    }

    #[test]
    fn debounce_fn_maps_fire_immediately() {
        let rig = Rig::new();
        let calls = Rc::clone(&rig.calls);
        let d = debounce(
            move |v: &u32| {
                calls.borrow_mut().push(*v);
                Ok(())
            },
            Duration::from_millis(5),
            true,
            &rig.scheduler,
        );
        assert_eq!(d.config().edge, DebounceEdge::Both);
        d.call(9).unwrap();
        assert_eq!(rig.calls(), [9]);
    }

    #[test]
    fn flush_runs_pending_now() {
        let rig = Rig::new();
        let d = rig.debounced(100, DebounceEdge::Trailing);
        d.call(1).unwrap();
        d.call(2).unwrap();
        assert!(d.flush().unwrap());
        assert_eq!(rig.calls(), [2]);
        assert!(!d.flush().unwrap());
        rig.tick(100);
        assert_eq!(rig.calls(), [2]);
    }

    #[test]
    fn cancel_drops_pending_call() {
        let rig = Rig::new();
        let d = rig.debounced(10, DebounceEdge::Trailing);
        d.call(1).unwrap();
        d.cancel();
        assert!(!d.is_pending());
        rig.tick(10);
        assert!(rig.calls().is_empty());
        assert_eq!(rig.scheduler.pending(), 0);
    }

    #[test]
    fn clones_share_one_window() {
        let rig = Rig::new();
        let a = rig.debounced(10, DebounceEdge::Trailing);
        let b = a.clone();
        a.call(1).unwrap();
        b.call(2).unwrap();
        rig.tick(10);
        assert_eq!(rig.calls(), [2]);
    }

    #[test]
    fn cleared_scheduler_closes_the_window() {
        let rig = Rig::new();
        let d = rig.debounced(10, DebounceEdge::Both);
        d.call(1).unwrap();
        d.call(2).unwrap();
        assert!(d.is_pending());

        rig.scheduler.clear();
        assert!(!d.is_pending());
        rig.tick(100);
        assert_eq!(rig.calls(), [1], "cleared trailing call never runs");

        d.call(3).unwrap();
        assert_eq!(rig.calls(), [1, 3], "next burst gets its leading edge");
        assert!(d.is_pending());
    }

    #[test]
    fn cleared_scheduler_drops_stale_trailing_argument() {
        let rig = Rig::new();
        let d = rig.debounced(10, DebounceEdge::Trailing);
        d.call(1).unwrap();
        rig.scheduler.clear();
        assert!(!d.flush().unwrap());

        d.call(2).unwrap();
        rig.tick(10);
        assert_eq!(rig.calls(), [2]);
    }

    #[test]
    fn dropped_adapter_timer_is_inert() {
        let rig = Rig::new();
        let d = rig.debounced(10, DebounceEdge::Trailing);
        d.call(1).unwrap();
        drop(d);
        rig.tick(10);
        assert!(rig.calls().is_empty());
    }

    #[test]
    fn trailing_error_surfaces_from_run_due() {
        let clock = ManualClock::new();
        let scheduler = Scheduler::with_clock(clock.clone());
        let d = debounce(
            |_: &u32| Err(HandlerError::new("late failure")),
            Duration::from_millis(1),
            false,
            &scheduler,
        );
        d.call(1).unwrap();
        clock.advance(Duration::from_millis(1));
        let err = scheduler.run_due().unwrap_err();
        assert_eq!(err.message(), "late failure");
        assert!(!d.is_pending());
    }

    #[test]
    fn leading_error_surfaces_from_call() {
        let scheduler = Scheduler::with_clock(ManualClock::new());
        let d = debounce(
            |_: &u32| Err(HandlerError::new("now")),
            Duration::from_millis(1),
            true,
            &scheduler,
        );
        assert_eq!(d.call(1).unwrap_err().message(), "now");
    }
}
