//! Property-based invariant tests for bound handlers.
//!
//! 1. A plain handler sees every set, in order, with the set value.
//! 2. A trailing debounced handler runs once per quiet period, with the
//!    value set last before it.
//! 3. A leading/trailing (`Both`) handler never runs more often than the
//!    option is set.
//! 4. The last value a debounced handler sees is the option's final value.

use optmix_core::{Options, Value};
use optmix_runtime::{
    Component, ComponentClass, DebounceConfig, DebounceEdge, ManualClock, Scheduler,
};
use proptest::prelude::*;
use serde_json::json;
use std::rc::Rc;
use web_time::Duration;

// ── Helpers ─────────────────────────────────────────────────────────────

const WAIT_MS: u64 = 50;

struct Rig {
    clock: ManualClock,
    scheduler: Scheduler,
    component: Rc<Component<Vec<Value>>>,
}

impl Rig {
    fn new(spec: &str, edge: DebounceEdge) -> Self {
        let clock = ManualClock::new();
        let scheduler = Scheduler::with_clock(clock.clone());
        let class = ComponentClass::<Vec<Value>>::builder("Probe")
            .scheduler(scheduler.clone())
            .debounce(DebounceConfig {
                wait: Duration::from_millis(WAIT_MS),
                edge,
            })
            .option("value", 0)
            .method("record", |this, v| {
                this.state_mut().push(v.clone());
                Ok(())
            })
            .event("record", spec)
            .build()
            .unwrap();
        let component = class.construct(Vec::new(), &Options::new());
        Self {
            clock,
            scheduler,
            component,
        }
    }

    fn set_then_idle(&self, value: i64, idle_ms: u64) {
        self.component.set("value", value).unwrap();
        self.clock.advance(Duration::from_millis(idle_ms));
        self.scheduler.run_due().unwrap();
    }

    fn settle(&self) {
        self.clock.advance(Duration::from_millis(WAIT_MS));
        self.scheduler.run_due().unwrap();
    }

    fn seen(&self) -> Vec<Value> {
        self.component.state().clone()
    }
}

/// `(value, idle_ms)` steps: set the option, then let time pass.
fn steps_strategy() -> impl Strategy<Value = Vec<(i64, u64)>> {
    proptest::collection::vec((any::<i64>(), 0u64..=2 * WAIT_MS), 1..24)
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Plain handlers see every set
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn plain_handler_sees_every_set(steps in steps_strategy()) {
        let rig = Rig::new("value", DebounceEdge::Trailing);
        for &(value, idle) in &steps {
            rig.set_then_idle(value, idle);
        }
        let expected: Vec<Value> = steps.iter().map(|(v, _)| json!(v)).collect();
        prop_assert_eq!(rig.seen(), expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Trailing debounce: one call per quiet period
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn trailing_runs_once_per_quiet_period(steps in steps_strategy()) {
        let rig = Rig::new("debounce:value", DebounceEdge::Trailing);
        for &(value, idle) in &steps {
            rig.set_then_idle(value, idle);
        }
        rig.settle();

        // A burst ends at a step followed by at least WAIT_MS of idle time,
        // or at the final step.
        let last = steps.len() - 1;
        let expected: Vec<Value> = steps
            .iter()
            .enumerate()
            .filter(|&(i, &(_, idle))| idle >= WAIT_MS || i == last)
            .map(|(_, (v, _))| json!(v))
            .collect();
        prop_assert_eq!(rig.seen(), expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3–4. Both edges: bounded calls, final value delivered
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn both_edges_bounded_and_final(steps in steps_strategy()) {
        let rig = Rig::new("debounce:value", DebounceEdge::Both);
        for &(value, idle) in &steps {
            rig.set_then_idle(value, idle);
        }
        rig.settle();

        let seen = rig.seen();
        prop_assert!(!seen.is_empty());
        prop_assert!(seen.len() <= steps.len());
        let final_value = json!(steps[steps.len() - 1].0);
        prop_assert_eq!(seen.last(), Some(&final_value));
        prop_assert_eq!(rig.component.get("value").unwrap(), final_value);
        prop_assert_eq!(rig.scheduler.pending(), 0);
    }
}
