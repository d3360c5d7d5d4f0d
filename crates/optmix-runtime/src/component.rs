#![forbid(unsafe_code)]

//! Component classes and instances.
//!
//! A [`ComponentClass`] is the shared definition of a component: its
//! methods, its author-supplied initializer, the options declared on it and
//! an ordered list of lifecycle hooks. [`ComponentClass::construct`] builds a
//! [`Component`] instance:
//!
//! ```text
//! before-init hooks (registration order)
//!   -> initializer
//!     -> after-init hooks (registration order)
//! ```
//!
//! The accessor generator and the event binder extend a class by declaring
//! options and appending hooks; they never replace the initializer.
//!
//! # Invariants
//!
//! 1. A class with no hooks constructs instances exactly as the bare
//!    initializer would.
//! 2. Reading an option returns the last value set on the instance, else
//!    the value seeded at construction, else the class default.
//! 3. [`Component::set`] fires exactly one `change:<name>` event, on the
//!    caller's stack, after the new value is stored.
//! 4. No option or handler borrow is held while listeners run, so handlers
//!    may read and set options of their own instance.
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Unknown option name | [`OptionError::Unknown`], nothing stored |
//! | Listener fails during `set` | value stays stored, [`DispatchError`] returned |
//! | Re-entrant `state_mut()` borrow | panics (`RefCell` rules) |

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use ahash::AHashMap;
use indexmap::IndexMap;
use optmix_core::{
    ComponentError, ConfigError, Defaults, DispatchError, Events, HandlerError, OptionError,
    Options, Value, change_event,
};

use crate::compose::initialize_defaults;
use crate::debounce::DebounceConfig;
use crate::events::HandlerDescriptor;
use crate::reactive::{BindingScope, Emitter, Subscription};
use crate::scheduler::Scheduler;

/// A component method usable as a change handler.
///
/// Receives the instance it is bound to and the event payload.
pub type Method<S> = Rc<dyn Fn(&Component<S>, &Value) -> Result<(), HandlerError>>;

/// Author-supplied initializer, run once per instance.
pub type Initializer<S> = Rc<dyn Fn(&Component<S>, &Options)>;

/// Lifecycle hook registered by an extension.
pub type Hook<S> = Rc<dyn Fn(&Rc<Component<S>>, &Options)>;

/// When a hook runs relative to the initializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    BeforeInit,
    AfterInit,
}

// ---------------------------------------------------------------------------
// ComponentClass
// ---------------------------------------------------------------------------

/// Shared definition of a component.
pub struct ComponentClass<S> {
    name: Rc<str>,
    defaults: Rc<Defaults>,
    methods: IndexMap<String, Method<S>>,
    initializer: Option<Initializer<S>>,
    hooks: Vec<(HookPhase, Hook<S>)>,
    debounce: DebounceConfig,
    scheduler: Scheduler,
}

impl<S> Clone for ComponentClass<S> {
    fn clone(&self) -> Self {
        Self {
            name: Rc::clone(&self.name),
            defaults: Rc::clone(&self.defaults),
            methods: self.methods.clone(),
            initializer: self.initializer.clone(),
            hooks: self.hooks.clone(),
            debounce: self.debounce,
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<S: 'static> ComponentClass<S> {
    /// Create an empty class.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self {
            name: Rc::from(name),
            defaults: Rc::new(Defaults::new()),
            methods: IndexMap::new(),
            initializer: None,
            hooks: Vec::new(),
            debounce: DebounceConfig::default(),
            scheduler: Scheduler::new(),
        }
    }

    /// Start a [`ComponentBuilder`].
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ComponentBuilder<S> {
        ComponentBuilder::new(name)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Define (or redefine) a method. Returns the method it replaced.
    pub fn define_method(
        &mut self,
        name: impl Into<String>,
        method: impl Fn(&Component<S>, &Value) -> Result<(), HandlerError> + 'static,
    ) -> Option<Method<S>> {
        self.methods.insert(name.into(), Rc::new(method))
    }

    /// Look up a method by name.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&Method<S>> {
        self.methods.get(name)
    }

    /// Set the author's initializer.
    pub fn set_initializer(&mut self, init: impl Fn(&Component<S>, &Options) + 'static) {
        self.initializer = Some(Rc::new(init));
    }

    /// Declare an option on the class. Returns the default it replaced.
    ///
    /// Instances already constructed keep the declarations they were built
    /// with.
    pub fn declare_option(&mut self, name: impl Into<String>, default: Value) -> Option<Value> {
        Rc::make_mut(&mut self.defaults).insert(name, default)
    }

    /// Options declared so far.
    #[must_use]
    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Append a lifecycle hook.
    pub fn add_hook(
        &mut self,
        phase: HookPhase,
        hook: impl Fn(&Rc<Component<S>>, &Options) + 'static,
    ) {
        tracing::debug!(class = %self.name, ?phase, "lifecycle hook registered");
        self.hooks.push((phase, Rc::new(hook)));
    }

    /// Number of registered hooks.
    #[must_use]
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    /// Debounce policy applied to `debounce:` tokens without an explicit wait.
    #[must_use]
    pub fn debounce_config(&self) -> DebounceConfig {
        self.debounce
    }

    /// Set the debounce policy. Affects events installed afterwards.
    pub fn set_debounce_config(&mut self, config: DebounceConfig) {
        self.debounce = config;
    }

    /// Scheduler handed to new instances for their debounced handlers.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn set_scheduler(&mut self, scheduler: Scheduler) {
        self.scheduler = scheduler;
    }

    /// Build an instance with `state` and construction `options`.
    pub fn construct(&self, state: S, options: &Options) -> Rc<Component<S>> {
        let _span = tracing::debug_span!("construct", class = %self.name).entered();

        let component = Rc::new(Component {
            class: Rc::clone(&self.name),
            defaults: Rc::clone(&self.defaults),
            values: RefCell::new(AHashMap::new()),
            emitter: Emitter::new(),
            scheduler: self.scheduler.clone(),
            handlers: RefCell::new(IndexMap::new()),
            bindings: RefCell::new(BindingScope::new()),
            state: RefCell::new(state),
        });

        self.run_hooks(HookPhase::BeforeInit, &component, options);
        if let Some(init) = &self.initializer {
            init(component.as_ref(), options);
        }
        self.run_hooks(HookPhase::AfterInit, &component, options);

        component
    }

    fn run_hooks(&self, phase: HookPhase, component: &Rc<Component<S>>, options: &Options) {
        for (_, hook) in self.hooks.iter().filter(|(p, _)| *p == phase) {
            hook(component, options);
        }
    }
}

impl<S> std::fmt::Debug for ComponentClass<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentClass")
            .field("name", &self.name)
            .field("options", &self.defaults.names().collect::<Vec<_>>())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ComponentBuilder
// ---------------------------------------------------------------------------

/// Builder that defines a class and augments it in one go.
///
/// [`build`](Self::build) runs [`initialize_defaults`] with everything
/// collected, after methods, debounce policy and scheduler are in place.
pub struct ComponentBuilder<S> {
    class: ComponentClass<S>,
    defaults: Defaults,
    events: Events,
}

impl<S: 'static> ComponentBuilder<S> {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            class: ComponentClass::new(name),
            defaults: Defaults::new(),
            events: Events::new(),
        }
    }

    #[must_use]
    pub fn method(
        mut self,
        name: impl Into<String>,
        method: impl Fn(&Component<S>, &Value) -> Result<(), HandlerError> + 'static,
    ) -> Self {
        self.class.define_method(name, method);
        self
    }

    #[must_use]
    pub fn initializer(mut self, init: impl Fn(&Component<S>, &Options) + 'static) -> Self {
        self.class.set_initializer(init);
        self
    }

    /// Declare one option.
    #[must_use]
    pub fn option(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.defaults.insert(name, default);
        self
    }

    /// Declare several options; later entries win.
    #[must_use]
    pub fn defaults(mut self, defaults: &Defaults) -> Self {
        self.defaults.extend(defaults);
        self
    }

    /// Bind `handler` to the options named in `spec`.
    #[must_use]
    pub fn event(mut self, handler: impl Into<String>, spec: impl Into<String>) -> Self {
        self.events.insert(handler, spec);
        self
    }

    #[must_use]
    pub fn events(mut self, events: &Events) -> Self {
        for (handler, spec) in events.iter() {
            self.events.insert(handler, spec);
        }
        self
    }

    #[must_use]
    pub fn debounce(mut self, config: DebounceConfig) -> Self {
        self.class.set_debounce_config(config);
        self
    }

    #[must_use]
    pub fn scheduler(mut self, scheduler: Scheduler) -> Self {
        self.class.set_scheduler(scheduler);
        self
    }

    /// Finish the class.
    ///
    /// # Errors
    ///
    /// Propagates [`ConfigError`] from event installation.
    pub fn build(self) -> Result<ComponentClass<S>, ConfigError> {
        let Self {
            mut class,
            defaults,
            events,
        } = self;
        initialize_defaults(&mut class, &defaults, &events)?;
        Ok(class)
    }
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// A constructed component instance.
pub struct Component<S> {
    class: Rc<str>,
    defaults: Rc<Defaults>,
    values: RefCell<AHashMap<String, Value>>,
    emitter: Emitter,
    scheduler: Scheduler,
    handlers: RefCell<IndexMap<String, HandlerDescriptor>>,
    bindings: RefCell<BindingScope>,
    state: RefCell<S>,
}

impl<S> Component<S> {
    /// Name of the class this instance was built from.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class
    }

    /// Whether `name` is a declared option.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.defaults.contains(name)
    }

    /// Declared option names, in declaration order.
    pub fn option_names(&self) -> impl Iterator<Item = &str> {
        self.defaults.names()
    }

    /// Current value of option `name`.
    ///
    /// # Errors
    ///
    /// [`OptionError::Unknown`] if `name` is not declared.
    pub fn get(&self, name: &str) -> Result<Value, OptionError> {
        self.current(name).ok_or_else(|| self.unknown(name))
    }

    /// Set option `name` and fire `change:<name>` with the new value.
    ///
    /// Returns the instance so calls can be chained.
    ///
    /// # Errors
    ///
    /// - [`OptionError::Unknown`] if `name` is not declared.
    /// - [`DispatchError`] if a listener fails. The value stays set.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<&Self, ComponentError> {
        if !self.declares(name) {
            return Err(self.unknown(name).into());
        }
        self.store(name, value.into())?;
        Ok(self)
    }

    /// Accessor pair for option `name`.
    ///
    /// # Errors
    ///
    /// [`OptionError::Unknown`] if `name` is not declared.
    pub fn accessor(&self, name: &str) -> Result<Accessor<'_, S>, OptionError> {
        if !self.declares(name) {
            return Err(self.unknown(name));
        }
        Ok(Accessor {
            component: self,
            name: name.to_owned(),
        })
    }

    /// Subscribe to an event on this instance.
    pub fn on(
        &self,
        event: impl Into<String>,
        listener: impl Fn(&Value) -> Result<(), HandlerError> + 'static,
    ) -> Subscription {
        self.emitter.on(event, listener)
    }

    /// Fire `event` on this instance.
    ///
    /// # Errors
    ///
    /// Returns the first listener failure.
    pub fn trigger(&self, event: &str, payload: &Value) -> Result<usize, DispatchError> {
        self.emitter.trigger(event, payload)
    }

    #[must_use]
    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    /// Scheduler running this instance's debounced handlers.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Author state.
    pub fn state(&self) -> Ref<'_, S> {
        self.state.borrow()
    }

    /// Author state, mutably.
    pub fn state_mut(&self) -> RefMut<'_, S> {
        self.state.borrow_mut()
    }

    /// Bound handler for a declared handler name.
    #[must_use]
    pub fn handler(&self, name: &str) -> Option<HandlerDescriptor> {
        self.handlers.borrow().get(name).cloned()
    }

    /// Number of bound handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Number of subscriptions held for bound handlers.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.bindings.borrow().binding_count()
    }

    /// Store a value without notifying anyone.
    pub(crate) fn seed(&self, name: &str, value: Value) {
        tracing::trace!(class = %self.class, option = name, "option seeded");
        self.values.borrow_mut().insert(name.to_owned(), value);
    }

    /// Register a bound handler and keep its subscriptions alive.
    pub(crate) fn attach_handler(&self, descriptor: HandlerDescriptor) {
        {
            let mut bindings = self.bindings.borrow_mut();
            for event in descriptor.events() {
                bindings.subscribe_listener(&self.emitter, event.clone(), descriptor.listener());
            }
        }
        self.handlers
            .borrow_mut()
            .insert(descriptor.name().to_owned(), descriptor);
    }

    fn current(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.values.borrow().get(name) {
            return Some(value.clone());
        }
        self.defaults.get(name).cloned()
    }

    fn store(&self, name: &str, value: Value) -> Result<(), DispatchError> {
        self.values
            .borrow_mut()
            .insert(name.to_owned(), value.clone());
        tracing::trace!(class = %self.class, option = name, "option set");
        self.emitter.trigger(&change_event(name), &value)?;
        Ok(())
    }

    fn unknown(&self, name: &str) -> OptionError {
        OptionError::Unknown {
            class: self.class.to_string(),
            option: name.to_owned(),
        }
    }
}

impl<S> std::fmt::Debug for Component<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("class", &self.class)
            .field("overridden", &self.values.borrow().len())
            .field("handlers", &self.handlers.borrow().len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Accessor
// ---------------------------------------------------------------------------

/// Getter/setter pair for one declared option of one instance.
pub struct Accessor<'a, S> {
    component: &'a Component<S>,
    name: String,
}

impl<'a, S> Accessor<'a, S> {
    /// Option name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> Value {
        self.component.current(&self.name).unwrap_or_default()
    }

    /// Set the value and fire `change:<name>`. Returns the instance.
    ///
    /// # Errors
    ///
    /// [`DispatchError`] if a listener fails. The value stays set.
    pub fn set(&self, value: impl Into<Value>) -> Result<&'a Component<S>, DispatchError> {
        self.component.store(&self.name, value.into())?;
        Ok(self.component)
    }
}

impl<S> std::fmt::Debug for Accessor<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accessor").field("name", &self.name).finish()
    }
}
