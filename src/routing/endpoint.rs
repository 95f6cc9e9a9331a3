//! Endpoint contract: a path-anchored handler exposing a subset of verbs.
//!
//! # Design Decisions
//! - Paths are normalized once at construction (leading `/`, no trailing
//!   `/`); `segments` is always derived from the normalized path
//! - The root path `/` has an empty segment list
//! - Verb handlers are an explicit capability record (an `Option` per
//!   verb), checked for presence rather than inferred
//! - Endpoint identity is object identity (`Arc::ptr_eq`), not path
//!   equality, so duplicate registration is detected by reference

use axum::http::Method;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::http::exchange::{EndpointRequest, EndpointResponse};

/// A verb handler: runs on the dispatching task and produces the full
/// response itself.
pub type HandlerFn =
    Arc<dyn Fn(EndpointRequest) -> BoxFuture<'static, EndpointResponse> + Send + Sync>;

/// Capability record of optional per-verb handlers.
#[derive(Clone, Default)]
pub struct VerbHandlers {
    pub get: Option<HandlerFn>,
    pub post: Option<HandlerFn>,
    pub put: Option<HandlerFn>,
    pub head: Option<HandlerFn>,
}

/// A registered, path-anchored request handler.
pub struct Endpoint {
    path: String,
    segments: Vec<String>,
    handlers: VerbHandlers,
}

impl Endpoint {
    pub fn builder(path: &str) -> EndpointBuilder {
        EndpointBuilder {
            path: normalize_path(path),
            handlers: VerbHandlers::default(),
        }
    }

    /// Normalized path this endpoint is anchored at.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Handler for the given verb, if the endpoint supports it.
    pub fn handler_for(&self, method: &Method) -> Option<&HandlerFn> {
        let slot = if *method == Method::GET {
            &self.handlers.get
        } else if *method == Method::POST {
            &self.handlers.post
        } else if *method == Method::PUT {
            &self.handlers.put
        } else if *method == Method::HEAD {
            &self.handlers.head
        } else {
            return None;
        };
        slot.as_ref()
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut verbs = Vec::new();
        if self.handlers.get.is_some() {
            verbs.push("GET");
        }
        if self.handlers.post.is_some() {
            verbs.push("POST");
        }
        if self.handlers.put.is_some() {
            verbs.push("PUT");
        }
        if self.handlers.head.is_some() {
            verbs.push("HEAD");
        }
        f.debug_struct("Endpoint")
            .field("path", &self.path)
            .field("verbs", &verbs)
            .finish()
    }
}

/// Builder attaching verb handlers to a path.
pub struct EndpointBuilder {
    path: String,
    handlers: VerbHandlers,
}

macro_rules! verb_setter {
    ($name:ident, $slot:ident) => {
        pub fn $name<F, Fut>(mut self, handler: F) -> Self
        where
            F: Fn(EndpointRequest) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = EndpointResponse> + Send + 'static,
        {
            self.handlers.$slot = Some(Arc::new(move |req| handler(req).boxed()));
            self
        }
    };
}

impl EndpointBuilder {
    verb_setter!(on_get, get);
    verb_setter!(on_post, post);
    verb_setter!(on_put, put);
    verb_setter!(on_head, head);

    pub fn build(self) -> Arc<Endpoint> {
        let segments = split_segments(&self.path);
        Arc::new(Endpoint {
            path: self.path,
            segments,
            handlers: self.handlers,
        })
    }
}

/// Add a leading `/` and strip trailing `/`; `"/"` stays `"/"`.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn split_segments(normalized: &str) -> Vec<String> {
    if normalized == "/" {
        Vec::new()
    } else {
        normalized[1..].split('/').map(str::to_string).collect()
    }
}
