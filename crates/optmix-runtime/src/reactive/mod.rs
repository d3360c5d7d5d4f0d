#![forbid(unsafe_code)]

//! Event plumbing for optmix components.
//!
//! - [`Emitter`]: named-event table with synchronous, ordered dispatch.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//! - [`BindingScope`]: owns the subscriptions a component made for its
//!   declared handlers, releasing them together.
//!
//! # Architecture
//!
//! `Emitter` uses `Rc<RefCell<..>>` for single-threaded shared ownership.
//! Subscriptions hold a `Weak` handle to the listener table so they never
//! keep an emitter alive. Dispatch clones the listener list before calling
//! out, so listeners are free to mutate the table.

pub mod binding;
pub mod emitter;

pub use binding::BindingScope;
pub use emitter::{Emitter, Listener, Subscription};
