#![forbid(unsafe_code)]

//! Default-initialization composer.

use optmix_core::{ConfigError, Defaults, Events};

use crate::component::ComponentClass;
use crate::defaults::install_defaults;
use crate::events::install_events;

/// Augment `class` with option accessors for `defaults` and handler bindings
/// for `events`.
///
/// Options are declared before events are installed, so specs may refer to
/// options declared in the same call. Empty tables are skipped; a class
/// given neither constructs exactly as before.
///
/// # Errors
///
/// Propagates [`ConfigError`] from [`install_events`]. Defaults installed
/// before the failure stay declared.
pub fn initialize_defaults<S: 'static>(
    class: &mut ComponentClass<S>,
    defaults: &Defaults,
    events: &Events,
) -> Result<(), ConfigError> {
    let _span = tracing::debug_span!(
        "initialize_defaults",
        class = class.name(),
        options = defaults.len(),
        handlers = events.len()
    )
    .entered();

    install_defaults(class, defaults);
    install_events(class, events)
}
