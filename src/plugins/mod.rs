//! Builtin plugins.
//!
//! Plugins are compiled in rather than discovered on disk: `builtin`
//! returns a factory per enabled plugin, and the host constructs them
//! sequentially at startup. A factory that fails takes only its own
//! plugin down.

pub mod debug;
pub mod denon;
pub mod errors;
pub mod media;
pub mod rcswitch;

use crate::config::HubConfig;
use crate::host::PluginFactory;

/// Factories for every plugin enabled in the config, in load order.
pub fn builtin(config: &HubConfig) -> Vec<(&'static str, PluginFactory)> {
    let mut factories: Vec<(&'static str, PluginFactory)> = Vec::new();
    if config.plugins.denon {
        factories.push(("denon", Box::new(denon::build)));
    }
    if config.plugins.rcswitch {
        factories.push(("rcswitch", Box::new(rcswitch::build)));
    }
    if config.plugins.errors {
        factories.push(("errors", Box::new(errors::build)));
    }
    if config.plugins.media {
        factories.push(("media", Box::new(media::build)));
    }
    if config.plugins.debug {
        factories.push(("debug", Box::new(debug::build)));
    }
    factories
}
