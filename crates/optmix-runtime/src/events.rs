#![forbid(unsafe_code)]

//! Event binder.
//!
//! [`install_events`] reads an [`Events`] table (handler name to event spec)
//! and arranges for every new instance of the class to subscribe the named
//! method to the `change:<option>` events the spec lists.
//!
//! Specs are parsed and handler names resolved when the table is installed,
//! so a misspelled handler fails the class definition rather than the first
//! construction. Binding itself happens per instance, after the author's
//! initializer has run.
//!
//! # Invariants
//!
//! 1. Each handler is bound once per instance; every event it listens to
//!    shares that one bound callable.
//! 2. A handler with any debounced token is debounced for all of its
//!    events, with one wait window per instance.
//! 3. Bound handlers hold their instance weakly; dropping the instance
//!    releases its subscriptions. A debounced call still pending stays
//!    queued on the scheduler and does nothing when it fires.
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Handler name is not a method | [`ConfigError::UnresolvedHandler`] at install |
//! | Malformed spec | parse error from [`EventSpec::parse`] at install |
//! | Token names an undeclared option | accepted, logged at `warn` |
//! | Handler returns `Err` | error tagged with the handler name, returned to the setter (or to [`Scheduler::run_due`](crate::Scheduler::run_due) when debounced) |

use std::rc::Rc;

use optmix_core::{ConfigError, EventSpec, EventToken, Events, Value};

use crate::component::{Component, ComponentClass, HookPhase, Method};
use crate::debounce::{DebounceConfig, Debounced};
use crate::reactive::Listener;

// ---------------------------------------------------------------------------
// HandlerDescriptor
// ---------------------------------------------------------------------------

/// A handler bound to one component instance.
///
/// Cloning shares the bound callable and, for debounced handlers, the wait
/// window.
#[derive(Clone)]
pub struct HandlerDescriptor {
    name: Rc<str>,
    events: Vec<String>,
    listener: Listener,
    debounced: Option<Debounced<Value>>,
}

impl HandlerDescriptor {
    /// Handler (method) name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Change events the handler is subscribed to, in spec order.
    #[must_use]
    pub fn events(&self) -> &[String] {
        &self.events
    }

    /// The callable registered with the emitter.
    #[must_use]
    pub fn listener(&self) -> Listener {
        Rc::clone(&self.listener)
    }

    #[must_use]
    pub fn is_debounced(&self) -> bool {
        self.debounced.is_some()
    }

    /// Debounce adapter, for flushing or cancelling a pending call.
    #[must_use]
    pub fn debounced(&self) -> Option<&Debounced<Value>> {
        self.debounced.as_ref()
    }
}

impl std::fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("name", &self.name)
            .field("events", &self.events)
            .field("debounced", &self.debounced)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Installation
// ---------------------------------------------------------------------------

/// What to bind for one handler, resolved once per class.
struct BindingPlan<S> {
    handler: Rc<str>,
    events: Vec<String>,
    method: Method<S>,
    debounce: Option<DebounceConfig>,
}

impl<S: 'static> BindingPlan<S> {
    fn bind(&self, component: &Rc<Component<S>>) -> HandlerDescriptor {
        let weak = Rc::downgrade(component);
        let method = Rc::clone(&self.method);
        let name = Rc::clone(&self.handler);
        let bound: Listener = Rc::new(move |payload: &Value| {
            let Some(this) = weak.upgrade() else {
                tracing::warn!(handler = %name, "handler fired after its component was dropped");
                return Ok(());
            };
            method(&*this, payload).map_err(|err| err.in_handler(&name))
        });

        let (listener, debounced) = match self.debounce {
            Some(config) => {
                let debounced = Debounced::new(bound, config, component.scheduler().clone());
                let adapter = debounced.clone();
                let listener: Listener =
                    Rc::new(move |payload: &Value| adapter.call(payload.clone()));
                (listener, Some(debounced))
            }
            None => (bound, None),
        };

        HandlerDescriptor {
            name: Rc::clone(&self.handler),
            events: self.events.clone(),
            listener,
            debounced,
        }
    }
}

/// Bind the handlers in `events` on every instance of `class`.
///
/// Handlers must already be defined as methods of `class`. Options named by
/// the specs should be declared first (see
/// [`initialize_defaults`](crate::initialize_defaults)); undeclared ones are
/// only warned about. With no events this is a no-op and no hook is
/// registered.
///
/// # Errors
///
/// [`ConfigError`] for the first spec that fails to parse or names a
/// handler `class` does not define. Nothing is installed on error.
pub fn install_events<S: 'static>(
    class: &mut ComponentClass<S>,
    events: &Events,
) -> Result<(), ConfigError> {
    if events.is_empty() {
        return Ok(());
    }

    let mut plans = Vec::with_capacity(events.len());
    for (handler, spec) in events.iter() {
        let parsed = EventSpec::parse(handler, spec)?;
        let method = class
            .method(handler)
            .cloned()
            .ok_or_else(|| ConfigError::UnresolvedHandler {
                class: class.name().to_owned(),
                handler: handler.to_owned(),
            })?;

        for option in parsed.options() {
            if !class.defaults().contains(option) {
                tracing::warn!(
                    class = class.name(),
                    handler,
                    option,
                    "event spec names an undeclared option"
                );
            }
        }

        let debounce = parsed.is_debounced().then(|| {
            let policy = class.debounce_config();
            policy.with_wait(parsed.wait().unwrap_or(policy.wait))
        });
        tracing::debug!(
            class = class.name(),
            handler,
            spec,
            debounced = debounce.is_some(),
            "handler planned"
        );

        plans.push(BindingPlan {
            handler: Rc::from(handler),
            events: parsed.tokens().iter().map(EventToken::event_name).collect(),
            method,
            debounce,
        });
    }

    let plans: Rc<[BindingPlan<S>]> = plans.into();
    class.add_hook(HookPhase::AfterInit, move |component, _| {
        for plan in plans.iter() {
            component.attach_handler(plan.bind(component));
        }
    });
    Ok(())
}
