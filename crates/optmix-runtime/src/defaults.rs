#![forbid(unsafe_code)]

//! Accessor generator.
//!
//! [`install_defaults`] declares options on a [`ComponentClass`]. Every
//! instance of the class then answers [`Component::get`],
//! [`Component::set`] and [`Component::accessor`] for those names, and
//! `set` fires `change:<name>`.
//!
//! Values passed in the construction options are seeded before the
//! initializer runs. Seeding writes the instance state directly: it fires no
//! change event, so handlers only ever observe changes made after
//! construction.

use std::rc::Rc;

use optmix_core::{Defaults, Options};

use crate::component::{Component, ComponentClass, HookPhase};

/// Declare `defaults` on `class` and seed them from construction options.
///
/// Redeclared names overwrite the earlier default. With no defaults this is
/// a no-op and no hook is registered.
pub fn install_defaults<S: 'static>(class: &mut ComponentClass<S>, defaults: &Defaults) {
    if defaults.is_empty() {
        return;
    }

    for (name, value) in defaults.iter() {
        if let Some(previous) = class.declare_option(name, value.clone()) {
            tracing::debug!(
                class = class.name(),
                option = name,
                %previous,
                "option redeclared, last declaration wins"
            );
        }
    }

    class.add_hook(HookPhase::BeforeInit, seed_from_options);
}

/// Copy construction options that name declared options into the instance.
fn seed_from_options<S>(component: &Rc<Component<S>>, options: &Options) {
    for (name, value) in options {
        if component.declares(name) {
            component.seed(name, value.clone());
        }
    }
}
