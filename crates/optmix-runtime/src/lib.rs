#![forbid(unsafe_code)]

//! Option accessors, change events, and declarative handler binding for
//! components.
//!
//! This crate provides:
//! - [`ComponentClass`] and [`Component`], a class/instance model with an
//!   ordered list of lifecycle hooks around the author's initializer
//! - [`initialize_defaults`], which declares options (getter, setter,
//!   `change:<name>` event) and binds handlers from `"width debounce:height"`
//!   style event specs
//! - [`Emitter`] with RAII [`Subscription`]s
//! - [`Debounced`] over a cooperative [`Scheduler`] driven by the host
//!
//! With the `config` feature, [`ComponentSpec`] loads declarations from TOML
//! or JSON.

pub mod component;
pub mod compose;
#[cfg(feature = "config")]
pub mod config;
pub mod debounce;
pub mod defaults;
pub mod events;
pub mod reactive;
pub mod scheduler;

pub use component::{
    Accessor, Component, ComponentBuilder, ComponentClass, Hook, HookPhase, Initializer, Method,
};
pub use compose::initialize_defaults;
#[cfg(feature = "config")]
pub use config::{ComponentSpec, DebounceSettings};
pub use debounce::{DebounceConfig, DebounceEdge, Debounced, debounce};
pub use defaults::install_defaults;
pub use events::{HandlerDescriptor, install_events};
pub use reactive::{BindingScope, Emitter, Listener, Subscription};
pub use scheduler::{Clock, ManualClock, Scheduler, SystemClock, TimerId};
