//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → HubConfig (immutable)
//!     → CLI overrides applied (--port)
//!     → shared via Arc to the host and all plugins
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so running without a config file works

pub mod loader;
pub mod schema;

pub use loader::{load_config, ConfigError};
pub use schema::{DenonConfig, HubConfig, MediaConfig, PluginToggles, RcSwitchConfig, ServerConfig};
