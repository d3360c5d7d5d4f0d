#![forbid(unsafe_code)]

//! Synchronous named-event emitter.
//!
//! An [`Emitter`] maps event names (e.g. `change:width`) to listeners.
//! [`Emitter::trigger`] calls every listener of an event in registration
//! order, on the caller's stack, before returning.
//!
//! # Invariants
//!
//! 1. Listeners of one event are called in registration order.
//! 2. Dropping a [`Subscription`] removes its listener before the next
//!    dispatch. A dispatch already in progress works on a snapshot and is
//!    not affected.
//! 3. Listeners may re-enter the emitter (trigger other events, subscribe,
//!    unsubscribe) without a borrow panic.
//! 4. The same listener `Rc` may be registered under several events; it is
//!    one callable, not a copy per event.
//!
//! # Failure Modes
//!
//! - Listener returns `Err`: dispatch stops, later listeners of that event
//!   are skipped, and the error is returned as a [`DispatchError`].
//! - Emitter dropped while subscriptions are alive: dropping them is a no-op.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ahash::AHashMap;
use optmix_core::{DispatchError, HandlerError, Value};

/// A shared event listener.
pub type Listener = Rc<dyn Fn(&Value) -> Result<(), HandlerError>>;

struct EmitterInner {
    next_id: u64,
    listeners: AHashMap<String, Vec<(u64, Listener)>>,
}

/// Single-threaded event emitter with RAII subscriptions.
///
/// Cloning an `Emitter` creates a new handle to the **same** listener table.
#[derive(Clone)]
pub struct Emitter {
    inner: Rc<RefCell<EmitterInner>>,
}

impl Emitter {
    /// Create an emitter with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(EmitterInner {
                next_id: 0,
                listeners: AHashMap::new(),
            })),
        }
    }

    /// Subscribe a closure to `event`.
    pub fn on(
        &self,
        event: impl Into<String>,
        listener: impl Fn(&Value) -> Result<(), HandlerError> + 'static,
    ) -> Subscription {
        self.on_listener(event, Rc::new(listener))
    }

    /// Subscribe an existing shared listener to `event`.
    pub fn on_listener(&self, event: impl Into<String>, listener: Listener) -> Subscription {
        let event = event.into();
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner
                .listeners
                .entry(event.clone())
                .or_default()
                .push((id, listener));
            id
        };
        tracing::trace!(event = %event, id, "listener subscribed");
        Subscription {
            emitter: Rc::downgrade(&self.inner),
            event,
            id,
        }
    }

    /// Call every listener of `event` with `payload`.
    ///
    /// Returns the number of listeners called.
    ///
    /// # Errors
    ///
    /// Returns the first listener failure; listeners after it are not called.
    pub fn trigger(&self, event: &str, payload: &Value) -> Result<usize, DispatchError> {
        let snapshot = self.listeners(event);
        tracing::trace!(event, listeners = snapshot.len(), "dispatch");
        for listener in &snapshot {
            listener(payload).map_err(|source| DispatchError {
                event: event.to_owned(),
                source,
            })?;
        }
        Ok(snapshot.len())
    }

    /// Listeners currently registered for `event`, in order.
    #[must_use]
    pub fn listeners(&self, event: &str) -> Vec<Listener> {
        self.inner
            .borrow()
            .listeners
            .get(event)
            .map(|entries| entries.iter().map(|(_, l)| Rc::clone(l)).collect())
            .unwrap_or_default()
    }

    /// Number of listeners registered for `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.inner
            .borrow()
            .listeners
            .get(event)
            .map_or(0, Vec::len)
    }

    /// Whether no listener is registered for any event.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().listeners.values().all(Vec::is_empty)
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        let total: usize = inner.listeners.values().map(Vec::len).sum();
        f.debug_struct("Emitter")
            .field("events", &inner.listeners.len())
            .field("listeners", &total)
            .finish()
    }
}

/// RAII guard for an emitter listener. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    emitter: Weak<RefCell<EmitterInner>>,
    event: String,
    id: u64,
}

impl Subscription {
    /// Event this subscription listens to.
    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(inner) = self.emitter.upgrade() else {
            return;
        };
        let mut inner = inner.borrow_mut();
        if let Some(entries) = inner.listeners.get_mut(&self.event) {
            entries.retain(|(id, _)| *id != self.id);
            if entries.is_empty() {
                inner.listeners.remove(&self.event);
            }
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.event)
            .field("id", &self.id)
            .finish()
    }
}
