#![forbid(unsafe_code)]

//! Declaration types for optmix.
//!
//! This crate provides:
//! - [`Defaults`] and [`Events`], the ordered declaration tables a component
//!   class is augmented from
//! - [`EventSpec`] parsing for `"width debounce:height"` style event specs
//! - the error taxonomy shared by the runtime ([`ConfigError`],
//!   [`OptionError`], [`HandlerError`], [`DispatchError`])

pub mod decl;
pub mod error;
pub mod event;
pub mod value;

pub use decl::{Defaults, Events};
pub use error::{ComponentError, ConfigError, DispatchError, HandlerError, OptionError};
pub use event::{CHANGE_PREFIX, DebounceRequest, EventSpec, EventToken, change_event};
pub use value::{Options, Value};
