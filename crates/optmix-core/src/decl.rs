#![forbid(unsafe_code)]

//! Ordered declaration tables.
//!
//! [`Defaults`] maps option names to default values; [`Events`] maps handler
//! names to event specs. Both keep declaration order and resolve duplicate
//! names by keeping the last value in the first position.

use indexmap::IndexMap;

use crate::value::{Options, Value};

/// Declared options of a component, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Defaults {
    entries: IndexMap<String, Value>,
}

impl Defaults {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an option. Returns the default it replaced, if any.
    pub fn insert(&mut self, name: impl Into<String>, default: impl Into<Value>) -> Option<Value> {
        self.entries.insert(name.into(), default.into())
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.insert(name, default);
        self
    }

    /// Default value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Whether `name` is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of declared options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no option is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declared names, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// `(name, default)` pairs, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge `other` into `self`; entries of `other` win.
    pub fn extend(&mut self, other: &Defaults) {
        for (name, value) in other.iter() {
            self.entries.insert(name.to_owned(), value.clone());
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Defaults {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut defaults = Self::new();
        for (name, value) in iter {
            defaults.insert(name, value);
        }
        defaults
    }
}

impl From<Options> for Defaults {
    fn from(map: Options) -> Self {
        map.into_iter().collect()
    }
}

/// Declared event bindings: handler name to event spec.
///
/// The spec is kept as written; it is parsed when the events are installed
/// on a class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Events {
    entries: IndexMap<String, String>,
}

impl Events {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to `spec`. Returns the spec it replaced, if any.
    pub fn insert(
        &mut self,
        handler: impl Into<String>,
        spec: impl Into<String>,
    ) -> Option<String> {
        self.entries.insert(handler.into(), spec.into())
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, handler: impl Into<String>, spec: impl Into<String>) -> Self {
        self.insert(handler, spec);
        self
    }

    /// Spec bound to `handler`.
    #[must_use]
    pub fn get(&self, handler: &str) -> Option<&str> {
        self.entries.get(handler).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(handler, spec)` pairs, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Events {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut events = Self::new();
        for (handler, spec) in iter {
            events.insert(handler, spec);
        }
        events
    }
}
