//! homehub: a minimal extensible HTTP hub.
//!
//! Requests are routed to compiled-in handler plugins by longest-prefix
//! path matching; plugins offload long-running side effects onto
//! single-consumer background work queues and report failures to a
//! process-wide error stack.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client request
//!        │
//!        ▼
//!   ┌─────────┐    ┌──────────┐    ┌───────────────┐
//!   │  http   │───▶│ routing  │───▶│  plugin verb  │
//!   │  shim   │    │ (prefix) │    │   handler     │
//!   └─────────┘    └──────────┘    └──────┬────────┘
//!                                         │ append()
//!                                         ▼
//!                                  ┌──────────────┐
//!                                  │  WorkQueue   │── consume ──▶ external
//!                                  │ (one worker) │               commands
//!                                  └──────┬───────┘
//!                                         │ failures
//!                                         ▼
//!                                  ┌──────────────┐
//!                                  │  ErrorStack  │◀── GET /sys/errors
//!                                  └──────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod host;
pub mod http;
pub mod routing;

// Shared infrastructure
pub mod errors;
pub mod work;

// Builtins & outer surface
pub mod cli;
pub mod plugins;

pub use config::HubConfig;
pub use errors::ErrorStack;
pub use host::PluginHost;
pub use http::HttpServer;
