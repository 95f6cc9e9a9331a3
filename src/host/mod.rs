//! Plugin host: loading, registration, dispatch, shutdown.
//!
//! # Data Flow
//! ```text
//! startup (sequential):
//!     for each enabled factory:
//!         open registration window
//!         run factory  ──register_endpoint──▶ pending buffer
//!         close window
//!         Ok  → commit buffer into Router, keep plugin
//!         Err → log, discard plugin entirely
//!
//! per request (concurrent):
//!     dispatch(method, path, ...)
//!         → Router::resolve       (no match → RouteNotFound)
//!         → Endpoint::handler_for (missing verb → MethodNotSupported)
//!         → run handler on the calling task, return its response as-is
//! ```
//!
//! # Design Decisions
//! - One broken plugin must never prevent the others from serving
//! - The router is append-only during loading, lock-free afterwards
//! - Shutdown hooks are best-effort: failures logged, never propagated

pub mod plugin;
pub mod registrar;

pub use plugin::{HostServices, Plugin, PluginError, PluginFactory};
pub use registrar::Registrar;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use std::sync::Arc;
use thiserror::Error;

use crate::config::HubConfig;
use crate::errors::ErrorStack;
use crate::http::exchange::{EndpointRequest, EndpointResponse};
use crate::routing::Router;

/// Request failures surfaced at the HTTP boundary. These never reach
/// plugin code.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("no endpoint matches the request path")]
    RouteNotFound,

    #[error("endpoint does not support this method")]
    MethodNotSupported,
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::RouteNotFound => StatusCode::NOT_FOUND,
            DispatchError::MethodNotSupported => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

struct LoadedPlugin {
    plugin: Box<dyn Plugin>,
    endpoints: usize,
}

/// Owns the router, the error stack, and every loaded plugin.
pub struct PluginHost {
    router: Router,
    services: HostServices,
    plugins: Vec<LoadedPlugin>,
}

impl PluginHost {
    pub fn new(config: Arc<HubConfig>) -> Self {
        Self {
            router: Router::new(),
            services: HostServices {
                errors: Arc::new(ErrorStack::new()),
                config,
            },
            plugins: Vec::new(),
        }
    }

    pub fn errors(&self) -> &Arc<ErrorStack> {
        &self.services.errors
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Construct one plugin inside a fresh registration window.
    ///
    /// On success the pending registrations are committed into the router;
    /// on failure they are discarded along with the plugin, and loading of
    /// the remaining plugins continues.
    pub fn load(&mut self, name: &str, factory: PluginFactory) {
        let registrar = Registrar::open();
        match factory(&registrar, &self.services) {
            Ok(plugin) => {
                let mut committed = 0;
                for endpoint in registrar.close() {
                    if self.router.register(endpoint) {
                        committed += 1;
                    }
                }
                tracing::info!(plugin = plugin.name(), endpoints = committed, "Loaded plugin");
                self.plugins.push(LoadedPlugin {
                    plugin,
                    endpoints: committed,
                });
            }
            Err(e) => {
                registrar.close();
                tracing::error!(plugin = name, error = %e, "Unable to load plugin");
            }
        }
    }

    /// Number of successfully loaded plugins.
    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// Resolve and run the verb handler for one request.
    ///
    /// The handler executes on the calling task and produces the complete
    /// response itself; the host does not post-process it.
    pub async fn dispatch(
        &self,
        method: Method,
        path: String,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<EndpointResponse, DispatchError> {
        let resolved = self
            .router
            .resolve(&path)
            .ok_or(DispatchError::RouteNotFound)?;

        let handler = resolved
            .endpoint
            .handler_for(&method)
            .ok_or(DispatchError::MethodNotSupported)?
            .clone();

        tracing::debug!(
            method = %method,
            path = %path,
            endpoint = %resolved.endpoint.path(),
            "Dispatching request"
        );

        let request = EndpointRequest {
            method,
            path,
            remainder: resolved.remainder,
            headers,
            body,
        };
        Ok(handler(request).await)
    }

    /// Invoke every plugin's shutdown hook; failures are logged and skipped.
    pub fn shutdown(&self) {
        for loaded in &self.plugins {
            if let Err(e) = loaded.plugin.shutdown() {
                tracing::error!(
                    plugin = loaded.plugin.name(),
                    error = %e,
                    "Plugin failed to shut down"
                );
            } else {
                tracing::debug!(
                    plugin = loaded.plugin.name(),
                    endpoints = loaded.endpoints,
                    "Plugin shut down"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::Endpoint;

    struct TestPlugin {
        name: &'static str,
    }

    impl Plugin for TestPlugin {
        fn name(&self) -> &str {
            self.name
        }
    }

    fn host() -> PluginHost {
        PluginHost::new(Arc::new(HubConfig::default()))
    }

    fn echo_factory(name: &'static str, path: &'static str) -> PluginFactory {
        Box::new(move |registrar, _services| {
            let endpoint = Endpoint::builder(path)
                .on_get(|req| async move {
                    EndpointResponse::text(StatusCode::OK, req.remainder)
                })
                .build();
            registrar.register_endpoint(endpoint);
            Ok(Box::new(TestPlugin { name }) as Box<dyn Plugin>)
        })
    }

    fn failing_factory() -> PluginFactory {
        Box::new(|registrar, _services| {
            // Registers something, then fails: nothing may be committed.
            registrar.register_endpoint(Endpoint::builder("/broken").build());
            Err(PluginError::Init("constructor exploded".into()))
        })
    }

    #[tokio::test]
    async fn test_broken_plugin_does_not_affect_others() {
        let mut host = host();
        host.load("a", echo_factory("a", "/a"));
        host.load("b", failing_factory());
        host.load("c", echo_factory("c", "/c"));

        assert_eq!(host.plugin_count(), 2);
        assert!(host.router().resolve("/a").is_some());
        assert!(host.router().resolve("/c").is_some());
        // The failed plugin's partial registrations were discarded.
        assert!(host.router().resolve("/broken").is_none());
    }

    #[tokio::test]
    async fn test_registration_after_construction_rejected() {
        let mut host = host();
        let stashed: Arc<std::sync::Mutex<Option<Registrar>>> = Arc::default();
        let stash = stashed.clone();
        host.load(
            "sneaky",
            Box::new(move |registrar, _services| {
                *stash.lock().unwrap() = Some(registrar.clone());
                Ok(Box::new(TestPlugin { name: "sneaky" }) as Box<dyn Plugin>)
            }),
        );

        let registrar = stashed.lock().unwrap().take().unwrap();
        registrar.register_endpoint(Endpoint::builder("/late").build());
        assert!(host.router().resolve("/late").is_none());
    }

    #[tokio::test]
    async fn test_dispatch_not_found_and_method_not_allowed() {
        let mut host = host();
        host.load("a", echo_factory("a", "/a"));

        let err = host
            .dispatch(Method::GET, "/nope".into(), HeaderMap::new(), Bytes::new())
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::RouteNotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = host
            .dispatch(Method::POST, "/a".into(), HeaderMap::new(), Bytes::new())
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::MethodNotSupported);
        assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_dispatch_passes_route_remainder() {
        let mut host = host();
        host.load("denon", echo_factory("denon", "/denon"));

        let response = host
            .dispatch(
                Method::GET,
                "/denon/switch/on".into(),
                HeaderMap::new(),
                Bytes::new(),
            )
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(&response.body[..], b"switch/on");
    }
}
