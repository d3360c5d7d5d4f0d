#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use optmix_core::{Options, Value};
use optmix_runtime::{ComponentClass, DebounceConfig, DebounceEdge, ManualClock, Scheduler};
use std::time::Duration;

const OPTIONS: [&str; 3] = ["width", "height", "data"];

#[derive(Arbitrary, Debug)]
enum Op {
    Set { option: u8, value: i32 },
    Advance { ms: u8 },
    RunDue,
    Flush,
}

#[derive(Arbitrary, Debug)]
struct Input {
    edge: u8,
    wait_ms: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let edge = match input.edge % 3 {
        0 => DebounceEdge::Trailing,
        1 => DebounceEdge::Leading,
        _ => DebounceEdge::Both,
    };
    let clock = ManualClock::new();
    let scheduler = Scheduler::with_clock(clock.clone());
    let Ok(class) = ComponentClass::<Vec<Value>>::builder("Fuzz")
        .scheduler(scheduler.clone())
        .debounce(DebounceConfig {
            wait: Duration::from_millis(u64::from(input.wait_ms)),
            edge,
        })
        .option("width", 0)
        .option("height", 0)
        .option("data", Value::Null)
        .method("redraw", |this, v| {
            this.state_mut().push(v.clone());
            Ok(())
        })
        .method("reload", |this, v| {
            this.state_mut().push(v.clone());
            Ok(())
        })
        .event("redraw", "width height")
        .event("reload", "debounce:data debounce:width")
        .build()
    else {
        return;
    };
    let component = class.construct(Vec::new(), &Options::new());

    for op in input.ops.iter().take(512) {
        match op {
            Op::Set { option, value } => {
                let name = OPTIONS[usize::from(*option) % OPTIONS.len()];
                component.set(name, *value).expect("handlers never fail");
                assert_eq!(component.get(name).unwrap(), Value::from(*value));
            }
            Op::Advance { ms } => clock.advance(Duration::from_millis(u64::from(*ms))),
            Op::RunDue => {
                scheduler.run_due().expect("handlers never fail");
            }
            Op::Flush => {
                let debounced = component
                    .handler("reload")
                    .and_then(|h| h.debounced().cloned());
                if let Some(debounced) = debounced {
                    debounced.flush().expect("handlers never fail");
                }
            }
        }
        assert!(scheduler.pending() <= 1, "one debounced handler, one timer");
    }
});
