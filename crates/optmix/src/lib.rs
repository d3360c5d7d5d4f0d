#![forbid(unsafe_code)]

//! optmix public facade.
//!
//! Declare options once and get, for every instance, a getter, a setter that
//! fires `change:<name>`, and handlers bound to those events by name.
//!
//! ```
//! use optmix::prelude::*;
//! use serde_json::json;
//!
//! let class = ComponentClass::<Vec<String>>::builder("Chart")
//!     .option("width", 960)
//!     .option("height", 480)
//!     .method("redraw", |this, _| {
//!         let width = this.get("width")?;
//!         this.state_mut().push(format!("redraw at {width}"));
//!         Ok(())
//!     })
//!     .event("redraw", "width height")
//!     .build()
//!     .expect("redraw is defined");
//!
//! let chart = class.construct(Vec::new(), &Options::new());
//! assert_eq!(chart.get("width").unwrap(), json!(960));
//!
//! chart.set("width", 300).unwrap();
//! assert_eq!(*chart.state(), ["redraw at 300"]);
//! ```
//!
//! Handlers declared with `debounce:` run later, from
//! [`Scheduler::run_due`](prelude::Scheduler::run_due).

pub mod prelude {
    pub use optmix_core::{
        ComponentError, ConfigError, Defaults, DispatchError, Events, HandlerError, OptionError,
        Options, Value, change_event,
    };
    pub use optmix_runtime::{
        Accessor, Component, ComponentBuilder, ComponentClass, DebounceConfig, DebounceEdge,
        Debounced, HandlerDescriptor, HookPhase, ManualClock, Scheduler, Subscription, debounce,
        initialize_defaults,
    };

    #[cfg(feature = "config")]
    pub use optmix_runtime::ComponentSpec;
}
