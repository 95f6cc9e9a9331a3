//! HTTP boundary: per-connection shim between axum and the plugin host.
//!
//! # Responsibilities
//! - Build the axum router (fallback handler, trace and timeout layers)
//! - Buffer the request body and translate into a dispatch call
//! - Map dispatch failures to 404/405 without touching plugin code
//! - Serve with graceful shutdown on ctrl-c

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::HubConfig;
use crate::host::PluginHost;

/// State injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub host: Arc<PluginHost>,
    pub max_body_size: usize,
}

/// HTTP server for the hub.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &HubConfig, host: Arc<PluginHost>) -> Self {
        let state = AppState {
            host,
            max_body_size: config.server.max_body_size,
        };
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the axum router. Every path falls through to the plugin host;
    /// axum itself routes nothing.
    fn build_router(config: &HubConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// The assembled router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Per-request shim: buffer the body, hand everything to the host.
async fn dispatch_handler(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let path = parts.uri.path().to_string();
    let method = parts.method;

    let body = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Failed to buffer request body");
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };

    match state.host.dispatch(method, path, parts.headers, body).await {
        Ok(response) => response.into_response(),
        Err(e) => {
            tracing::debug!(error = %e, "Request not dispatched");
            (e.status(), Body::empty()).into_response()
        }
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}
