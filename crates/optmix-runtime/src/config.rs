#![forbid(unsafe_code)]

//! Component declarations loaded from TOML or JSON.
//!
//! Requires the `config` feature.
//!
//! ```toml
//! [defaults]
//! width = 960
//! height = 480
//!
//! [events]
//! redraw = "width height"
//! reload = "debounce:data"
//!
//! [debounce]
//! wait_ms = 100
//! edge = "trailing"
//! ```
//!
//! Every table is optional. Handler names in `[events]` still have to be
//! methods defined in code; [`ComponentSpec::apply`] resolves them exactly
//! like [`initialize_defaults`] does.

use optmix_core::{ConfigError, Defaults, Events};
use serde::Deserialize;
use web_time::Duration;

use crate::compose::initialize_defaults;
use crate::component::ComponentClass;
use crate::debounce::{DebounceConfig, DebounceEdge};

/// Debounce policy as written in a declaration document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebounceSettings {
    pub wait_ms: u64,
    pub edge: DebounceEdge,
}

impl From<DebounceSettings> for DebounceConfig {
    fn from(settings: DebounceSettings) -> Self {
        Self {
            wait: Duration::from_millis(settings.wait_ms),
            edge: settings.edge,
        }
    }
}

/// Declarations for one component class.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComponentSpec {
    pub defaults: Defaults,
    pub events: Events,
    pub debounce: Option<DebounceSettings>,
}

impl ComponentSpec {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] if the document is malformed.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse {
            format: "TOML",
            message: e.to_string(),
        })
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] if the document is malformed.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(source).map_err(|e| ConfigError::Parse {
            format: "JSON",
            message: e.to_string(),
        })
    }

    /// Install these declarations on `class`.
    ///
    /// The debounce policy, if present, replaces the class policy before
    /// events are installed.
    ///
    /// # Errors
    ///
    /// Propagates [`ConfigError`] from [`initialize_defaults`].
    pub fn apply<S: 'static>(&self, class: &mut ComponentClass<S>) -> Result<(), ConfigError> {
        if let Some(settings) = self.debounce {
            class.set_debounce_config(settings.into());
        }
        initialize_defaults(class, &self.defaults, &self.events)
    }
}
