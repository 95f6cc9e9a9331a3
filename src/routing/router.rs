//! Endpoint registry and longest-prefix path resolution.
//!
//! # Responsibilities
//! - Store registered endpoints (write-once during startup)
//! - Resolve a request path to the single best-matching endpoint
//! - Hand the unmatched path suffix back as the route remainder
//!
//! # Design Decisions
//! - Longest-prefix, not exact-match: `/a/b/c` matches a registered `/a/b`
//!   unless something more specific is registered
//! - A root endpoint (`/`) matches every path as fallback of last resort
//! - Duplicate registration (same endpoint object) is logged and ignored
//! - Explicit `None` on no match rather than a silent default

use std::sync::Arc;

use crate::routing::endpoint::{normalize_path, Endpoint};

/// Outcome of a successful path resolution.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub endpoint: Arc<Endpoint>,

    /// Path suffix beyond the endpoint's own path, without a leading slash.
    pub remainder: String,
}

/// Ordered collection of registered endpoints.
///
/// Populated sequentially during plugin loading, then read concurrently
/// without locking for the rest of the process lifetime.
#[derive(Debug, Default)]
pub struct Router {
    endpoints: Vec<Arc<Endpoint>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an endpoint. Duplicates (by object identity) are rejected and
    /// logged; registration order does not affect match outcomes.
    pub fn register(&mut self, endpoint: Arc<Endpoint>) -> bool {
        if self.endpoints.iter().any(|e| Arc::ptr_eq(e, &endpoint)) {
            tracing::error!(path = %endpoint.path(), "Endpoint already registered");
            return false;
        }
        tracing::info!(path = %endpoint.path(), "Registered endpoint");
        self.endpoints.push(endpoint);
        true
    }

    pub fn endpoints(&self) -> &[Arc<Endpoint>] {
        &self.endpoints
    }

    /// Find the endpoint that matches `path` best.
    ///
    /// Walks the path segment by segment, keeping a candidate set of all
    /// endpoints still consistent with the prefix seen so far. An endpoint
    /// whose whole path is consumed is recorded as a match; a mismatching
    /// segment retires a candidate. Among recorded matches the strictly
    /// longest endpoint path wins.
    pub fn resolve(&self, path: &str) -> Option<Resolved> {
        let normalized = normalize_path(path);
        let request: Vec<&str> = if normalized == "/" {
            Vec::new()
        } else {
            normalized[1..].split('/').collect()
        };

        let mut candidates: Vec<&Arc<Endpoint>> = self.endpoints.iter().collect();
        let mut matches: Vec<&Arc<Endpoint>> = Vec::new();

        let mut i = 0;
        while i <= request.len() && !candidates.is_empty() {
            candidates.retain(|candidate| {
                let segments = candidate.segments();
                if segments.len() == i {
                    // Whole endpoint path consumed before the request ends.
                    matches.push(*candidate);
                    false
                } else if i == request.len() {
                    // Request exhausted but the endpoint path is longer.
                    false
                } else if segments[i] != request[i] {
                    false
                } else if i == segments.len() - 1 {
                    // Endpoint path consumed exactly at this segment.
                    matches.push(*candidate);
                    false
                } else {
                    true
                }
            });
            i += 1;
        }

        let mut best: Option<&Arc<Endpoint>> = None;
        for m in matches {
            match best {
                Some(b) if m.segments().len() <= b.segments().len() => {}
                _ => best = Some(m),
            }
        }

        best.map(|endpoint| Resolved {
            endpoint: Arc::clone(endpoint),
            remainder: request[endpoint.segments().len()..].join("/"),
        })
    }
}
