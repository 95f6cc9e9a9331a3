//! Plugin contract.
//!
//! Plugins are compiled in: each one exposes a factory function that is
//! called exactly once at startup with the registration window and the
//! host's shared services. Everything an endpoint needs (queues, sockets,
//! config) is wired up inside the factory.

use std::sync::Arc;
use thiserror::Error;

use crate::config::HubConfig;
use crate::errors::ErrorStack;
use crate::host::Registrar;

/// Why a plugin failed to load. A failing plugin is discarded; the others
/// keep serving.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("{0}")]
    Init(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A loaded plugin instance.
///
/// The `shutdown` hook is optional in spirit: the default implementation is
/// a no-op, and a failing hook is logged, never propagated.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn shutdown(&self) -> Result<(), PluginError> {
        Ok(())
    }
}

/// Shared services handed to plugin factories.
#[derive(Clone)]
pub struct HostServices {
    /// Process-wide fault channel; plugins and their queues report here.
    pub errors: Arc<ErrorStack>,

    /// Immutable configuration loaded at startup.
    pub config: Arc<HubConfig>,
}

/// Constructor for one plugin. May call `register_endpoint` on the
/// registrar only while it runs.
pub type PluginFactory =
    Box<dyn FnOnce(&Registrar, &HostServices) -> Result<Box<dyn Plugin>, PluginError>>;
