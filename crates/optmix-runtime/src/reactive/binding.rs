#![forbid(unsafe_code)]

//! Lifecycle holder for handler subscriptions.
//!
//! Each component instance owns one [`BindingScope`]. The event binder puts
//! every subscription it creates for a declared handler into that scope, so
//! the subscriptions live exactly as long as the instance.
//!
//! # Invariants
//!
//! 1. Subscriptions are released in reverse registration order on drop.
//! 2. After drop or [`clear`](BindingScope::clear), no listener from this
//!    scope fires again.
//! 3. [`binding_count`](BindingScope::binding_count) is always accurate.

use super::emitter::{Emitter, Listener, Subscription};

/// Collects subscriptions for one logical owner (a component instance).
pub struct BindingScope {
    subscriptions: Vec<Subscription>,
}

impl BindingScope {
    /// Create an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
        }
    }

    /// Subscribe a shared listener to `event` within this scope.
    pub fn subscribe_listener(
        &mut self,
        emitter: &Emitter,
        event: impl Into<String>,
        listener: Listener,
    ) -> &mut Self {
        let sub = emitter.on_listener(event, listener);
        self.subscriptions.push(sub);
        self
    }

    /// Number of held subscriptions.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Release all subscriptions now. The scope stays usable.
    pub fn clear(&mut self) {
        while self.subscriptions.pop().is_some() {}
    }
}

impl Drop for BindingScope {
    fn drop(&mut self) {
        self.clear();
    }
}

impl Default for BindingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BindingScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingScope")
            .field("binding_count", &self.subscriptions.len())
            .finish()
    }
}
