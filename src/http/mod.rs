//! HTTP boundary subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, fallback handler)
//!     → exchange.rs (buffered request, handler-produced response)
//!     → PluginHost::dispatch
//!     → Send response to client
//! ```

pub mod exchange;
pub mod server;

pub use exchange::{EndpointRequest, EndpointResponse};
pub use server::{AppState, HttpServer};
