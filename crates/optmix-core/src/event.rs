#![forbid(unsafe_code)]

//! Change event names and event spec parsing.
//!
//! An event spec is the right-hand side of an event declaration: one or more
//! whitespace separated tokens, each naming an option whose change should
//! invoke the handler.
//!
//! ```text
//! "width height"                  plain, fires synchronously
//! "debounce:width debounce:height" trailing-edge debounced
//! "debounce(250):data"            debounced with a 250ms wait
//! ```
//!
//! The `debounce` prefix is matched case-insensitively.
//!
//! # Invariants
//!
//! 1. A parsed [`EventSpec`] has at least one token and no token has an
//!    empty option name.
//! 2. Token order follows the spec text; duplicates are kept (each one is a
//!    separate subscription).
//! 3. At most one explicit wait is recorded per spec; two different explicit
//!    waits are rejected.

use std::time::Duration;

use crate::error::ConfigError;

/// Prefix of every option change event.
pub const CHANGE_PREFIX: &str = "change:";

const DEBOUNCE_KEYWORD: &str = "debounce";

/// Name of the event fired when `option` changes: `change:<option>`.
#[must_use]
pub fn change_event(option: &str) -> String {
    let mut name = String::with_capacity(CHANGE_PREFIX.len() + option.len());
    name.push_str(CHANGE_PREFIX);
    name.push_str(option);
    name
}

/// Debounce requested by a single token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceRequest {
    /// `debounce:<option>`: use the class-wide wait.
    Default,
    /// `debounce(<ms>):<option>`: use this wait.
    Wait(Duration),
}

/// One token of an event spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventToken {
    /// Option whose change event the handler subscribes to.
    pub option: String,
    /// Debounce requested by this token, if any.
    pub debounce: Option<DebounceRequest>,
}

impl EventToken {
    /// Name of the change event this token subscribes to.
    #[must_use]
    pub fn event_name(&self) -> String {
        change_event(&self.option)
    }
}

/// A parsed event spec for one handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSpec {
    tokens: Vec<EventToken>,
    wait: Option<Duration>,
}

impl EventSpec {
    /// Parse the spec declared for `handler`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EmptyEventToken`] if the spec is blank or a token
    ///   names no option (`"debounce:"`).
    /// - [`ConfigError::InvalidDebounceWait`] if a `debounce(<ms>)` wait is
    ///   not an unsigned integer.
    /// - [`ConfigError::ConflictingDebounce`] if two tokens request different
    ///   explicit waits.
    pub fn parse(handler: &str, spec: &str) -> Result<Self, ConfigError> {
        let mut tokens = Vec::new();
        let mut wait: Option<Duration> = None;

        for raw in spec.split_whitespace() {
            let token = parse_token(handler, raw)?;
            if let Some(DebounceRequest::Wait(requested)) = token.debounce {
                match wait {
                    Some(existing) if existing != requested => {
                        return Err(ConfigError::ConflictingDebounce {
                            handler: handler.to_owned(),
                            first_ms: millis(existing),
                            second_ms: millis(requested),
                        });
                    }
                    _ => wait = Some(requested),
                }
            }
            tokens.push(token);
        }

        if tokens.is_empty() {
            return Err(ConfigError::EmptyEventToken {
                handler: handler.to_owned(),
            });
        }

        Ok(Self { tokens, wait })
    }

    /// Parsed tokens, in spec order.
    #[must_use]
    pub fn tokens(&self) -> &[EventToken] {
        &self.tokens
    }

    /// Option names referenced by the spec, in order.
    pub fn options(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|t| t.option.as_str())
    }

    /// Whether any token asks for debouncing.
    ///
    /// A handler has a single bound callable, so one debounced token makes
    /// every subscription of the handler go through the debouncer.
    #[must_use]
    pub fn is_debounced(&self) -> bool {
        self.tokens.iter().any(|t| t.debounce.is_some())
    }

    /// Explicit wait requested with `debounce(<ms>):`, if any.
    #[must_use]
    pub fn wait(&self) -> Option<Duration> {
        self.wait
    }
}

fn parse_token(handler: &str, raw: &str) -> Result<EventToken, ConfigError> {
    let empty = || ConfigError::EmptyEventToken {
        handler: handler.to_owned(),
    };

    let Some(rest) = strip_prefix_ignore_case(raw, DEBOUNCE_KEYWORD) else {
        return Ok(EventToken {
            option: raw.to_owned(),
            debounce: None,
        });
    };

    let (debounce, option) = if let Some(option) = rest.strip_prefix(':') {
        (DebounceRequest::Default, option)
    } else if let Some(args) = rest.strip_prefix('(') {
        let invalid = || ConfigError::InvalidDebounceWait {
            handler: handler.to_owned(),
            token: raw.to_owned(),
        };
        let (ms, option) = args.split_once("):").ok_or_else(invalid)?;
        let ms: u64 = ms.trim().parse().map_err(|_| invalid())?;
        (DebounceRequest::Wait(Duration::from_millis(ms)), option)
    } else {
        // An option that merely starts with "debounce", e.g. "debounced".
        return Ok(EventToken {
            option: raw.to_owned(),
            debounce: None,
        });
    };

    if option.is_empty() {
        return Err(empty());
    }

    Ok(EventToken {
        option: option.to_owned(),
        debounce: Some(debounce),
    })
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(spec: &EventSpec) -> Vec<&str> {
        spec.options().collect()
    }

    #[test]
    fn change_event_name() {
        assert_eq!(change_event("width"), "change:width");
        assert_eq!(change_event(""), "change:");
    }

    #[test]
    fn plain_tokens() {
        let spec = EventSpec::parse("on_resize", "width height").unwrap();
        assert_eq!(opts(&spec), ["width", "height"]);
        assert!(!spec.is_debounced());
        assert_eq!(spec.wait(), None);
    }

    #[test]
    fn arbitrary_whitespace_separates_tokens() {
        let spec = EventSpec::parse("h", "  width\t\theight\n data ").unwrap();
        assert_eq!(opts(&spec), ["width", "height", "data"]);
    }

    #[test]
    fn debounce_prefix() {
        let spec = EventSpec::parse("on_resize", "debounce:width debounce:height").unwrap();
        assert_eq!(opts(&spec), ["width", "height"]);
        assert!(spec.is_debounced());
        assert!(
            spec.tokens()
                .iter()
                .all(|t| t.debounce == Some(DebounceRequest::Default))
        );
    }

    #[test]
    fn debounce_prefix_is_case_insensitive() {
        let spec = EventSpec::parse("h", "DEBOUNCE:width Debounce:height").unwrap();
        assert_eq!(opts(&spec), ["width", "height"]);
        assert!(spec.tokens().iter().all(|t| t.debounce.is_some()));
    }

    #[test]
    fn mixed_tokens_mark_handler_debounced() {
        let spec = EventSpec::parse("h", "width debounce:height").unwrap();
        assert!(spec.is_debounced());
        assert_eq!(spec.tokens()[0].debounce, None);
    }

    #[test]
    fn explicit_wait() {
        let spec = EventSpec::parse("h", "debounce(250):data debounce:width").unwrap();
        assert_eq!(spec.wait(), Some(Duration::from_millis(250)));
        assert_eq!(
            spec.tokens()[0].debounce,
            Some(DebounceRequest::Wait(Duration::from_millis(250)))
        );
        assert_eq!(opts(&spec), ["data", "width"]);
    }

    #[test]
    fn repeated_equal_waits_are_fine() {
        let spec = EventSpec::parse("h", "debounce(10):a debounce(10):b").unwrap();
        assert_eq!(spec.wait(), Some(Duration::from_millis(10)));
    }

    #[test]
    fn conflicting_waits_rejected() {
        let err = EventSpec::parse("h", "debounce(10):a debounce(20):b").unwrap_err();
        assert_eq!(
            err,
            ConfigError::ConflictingDebounce {
                handler: "h".into(),
                first_ms: 10,
                second_ms: 20,
            }
        );
    }

    #[test]
    fn invalid_wait_rejected() {
        for raw in ["debounce(x):a", "debounce(10)a", "debounce(-1):a", "debounce(:a"] {
            let err = EventSpec::parse("h", raw).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidDebounceWait { .. }),
                "{raw} gave {err:?}"
            );
        }
    }

    #[test]
    fn empty_spec_rejected() {
        for raw in ["", "   ", "\t\n"] {
            assert_eq!(
                EventSpec::parse("h", raw).unwrap_err(),
                ConfigError::EmptyEventToken { handler: "h".into() }
            );
        }
    }

    #[test]
    fn bare_debounce_prefix_rejected() {
        assert!(matches!(
            EventSpec::parse("h", "width debounce:").unwrap_err(),
            ConfigError::EmptyEventToken { .. }
        ));
        assert!(matches!(
            EventSpec::parse("h", "debounce(5):").unwrap_err(),
            ConfigError::EmptyEventToken { .. }
        ));
    }

    #[test]
    fn options_starting_with_keyword_are_plain() {
        let spec = EventSpec::parse("h", "debounced debounce").unwrap();
        assert_eq!(opts(&spec), ["debounced", "debounce"]);
        assert!(!spec.is_debounced());
    }

    #[test]
    fn multibyte_token_does_not_panic() {
        let spec = EventSpec::parse("h", "débounce:x ü").unwrap();
        assert_eq!(opts(&spec), ["débounce:x", "ü"]);
    }

    #[test]
    fn token_event_name() {
        let spec = EventSpec::parse("h", "debounce:width").unwrap();
        assert_eq!(spec.tokens()[0].event_name(), "change:width");
    }
}
