#![forbid(unsafe_code)]

//! Option values.
//!
//! Options are dynamically typed: a default may be a number, a string, a
//! list, or anything else a component author wants to expose. JSON values
//! cover that range and deserialize directly from config documents.

pub use serde_json::Value;

/// Options passed to a component at construction time, keyed by option name.
pub type Options = serde_json::Map<String, Value>;
