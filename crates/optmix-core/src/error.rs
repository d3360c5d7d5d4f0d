#![forbid(unsafe_code)]

//! Error types.
//!
//! # Failure Modes
//!
//! | Failure | Raised by | Behavior |
//! |---------|-----------|----------|
//! | Handler name with no method | event setup | [`ConfigError::UnresolvedHandler`], nothing bound |
//! | Empty or whitespace-only event spec | event setup | [`ConfigError::EmptyEventToken`] |
//! | Unparseable `debounce(<ms>)` wait | event setup | [`ConfigError::InvalidDebounceWait`] |
//! | Two different waits for one handler | event setup | [`ConfigError::ConflictingDebounce`] |
//! | Get/set of an undeclared option | accessor call | [`OptionError::Unknown`] |
//! | Handler returns an error | change dispatch | [`DispatchError`], remaining listeners skipped |
//!
//! Redeclaring an option or handler is not an error; the last declaration
//! wins.

use thiserror::Error;

/// Errors detected while augmenting a component class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An event declaration names a handler the class does not define.
    #[error("component '{class}' declares events for handler '{handler}', which is not a method")]
    UnresolvedHandler { class: String, handler: String },

    /// An event spec (or one of its tokens) names no option.
    #[error("handler '{handler}' has an empty event token")]
    EmptyEventToken { handler: String },

    /// A `debounce(<ms>):` token carries a wait that is not a millisecond count.
    #[error("handler '{handler}' has an invalid debounce wait in '{token}'")]
    InvalidDebounceWait { handler: String, token: String },

    /// Tokens of one handler request different explicit debounce waits.
    #[error("handler '{handler}' requests conflicting debounce waits ({first_ms}ms vs {second_ms}ms)")]
    ConflictingDebounce {
        handler: String,
        first_ms: u64,
        second_ms: u64,
    },

    /// A declaration document could not be parsed.
    #[error("failed to parse {format} component declaration: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },
}

/// Errors from option accessors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    /// The option was never declared on the component class.
    #[error("component '{class}' has no option '{option}'")]
    Unknown { class: String, option: String },
}

/// Failure reported by a change handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError {
    handler: Option<String>,
    message: String,
}

impl HandlerError {
    /// Create a handler error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            handler: None,
            message: message.into(),
        }
    }

    /// Attach the name of the handler that failed, unless one is already set.
    #[must_use]
    pub fn in_handler(mut self, handler: &str) -> Self {
        if self.handler.is_none() {
            self.handler = Some(handler.to_owned());
        }
        self
    }

    /// Name of the failing handler, when known.
    #[must_use]
    pub fn handler(&self) -> Option<&str> {
        self.handler.as_deref()
    }

    /// The failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.handler {
            Some(handler) => write!(f, "handler '{handler}' failed: {}", self.message),
            None => write!(f, "handler failed: {}", self.message),
        }
    }
}

impl std::error::Error for HandlerError {}

impl From<DispatchError> for HandlerError {
    fn from(err: DispatchError) -> Self {
        Self::new(format!("{err}: {}", err.source))
    }
}

impl From<OptionError> for HandlerError {
    fn from(err: OptionError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<ComponentError> for HandlerError {
    fn from(err: ComponentError) -> Self {
        match err {
            ComponentError::Option(err) => err.into(),
            ComponentError::Dispatch(err) => err.into(),
        }
    }
}

/// A listener failed while an event was being dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dispatch of '{event}' failed")]
pub struct DispatchError {
    /// The event being dispatched, e.g. `change:width`.
    pub event: String,
    /// The failure returned by the listener.
    #[source]
    pub source: HandlerError,
}

/// Errors from mutating a component option.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComponentError {
    #[error(transparent)]
    Option(#[from] OptionError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_error_display_with_and_without_name() {
        let err = HandlerError::new("boom");
        assert_eq!(err.to_string(), "handler failed: boom");

        let err = err.in_handler("on_resize");
        assert_eq!(err.to_string(), "handler 'on_resize' failed: boom");
        assert_eq!(err.handler(), Some("on_resize"));
    }

    #[test]
    fn in_handler_keeps_first_name() {
        let err = HandlerError::new("boom")
            .in_handler("inner")
            .in_handler("outer");
        assert_eq!(err.handler(), Some("inner"));
    }

    #[test]
    fn dispatch_error_exposes_source() {
        use std::error::Error as _;

        let err = DispatchError {
            event: "change:width".into(),
            source: HandlerError::new("bad width"),
        };
        assert_eq!(err.to_string(), "dispatch of 'change:width' failed");
        let source = err.source().expect("source is set");
        assert_eq!(source.to_string(), "handler failed: bad width");
    }

    #[test]
    fn nested_dispatch_error_keeps_inner_message() {
        let err = DispatchError {
            event: "change:height".into(),
            source: HandlerError::new("too tall").in_handler("relayout"),
        };
        let converted = HandlerError::from(ComponentError::from(err));
        assert_eq!(
            converted.message(),
            "dispatch of 'change:height' failed: handler 'relayout' failed: too tall"
        );
        assert_eq!(converted.handler(), None);
    }

    #[test]
    fn unresolved_handler_message_names_both_sides() {
        let err = ConfigError::UnresolvedHandler {
            class: "Chart".into(),
            handler: "redraw".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Chart"));
        assert!(msg.contains("redraw"));
    }
}
