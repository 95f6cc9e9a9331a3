//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs (candidate walk, longest-prefix match)
//!     → endpoint.rs (verb capability lookup)
//!     → Return: matched Endpoint + route remainder, or no match
//!
//! Endpoint registration (at startup):
//!     plugin constructors
//!     → registration window (host)
//!     → Router::register (identity-checked, append-only)
//! ```
//!
//! # Design Decisions
//! - Registry is written only during sequential plugin loading
//! - Deterministic: same path always resolves to the same endpoint
//! - Most specific registered prefix wins; root `/` is the last resort

pub mod endpoint;
pub mod router;

pub use endpoint::{Endpoint, EndpointBuilder, HandlerFn, VerbHandlers};
pub use router::{Resolved, Router};
