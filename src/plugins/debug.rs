//! Root echo endpoint for poking at the hub.
//!
//! Registers `/`, which matches every otherwise-unmatched path, so this
//! plugin is disabled unless `[plugins] debug = true`.

use axum::http::StatusCode;

use crate::host::{HostServices, Plugin, PluginError, Registrar};
use crate::http::exchange::{EndpointRequest, EndpointResponse};
use crate::routing::Endpoint;

struct DebugPlugin;

impl Plugin for DebugPlugin {
    fn name(&self) -> &str {
        "debug"
    }
}

pub fn build(
    registrar: &Registrar,
    _services: &HostServices,
) -> Result<Box<dyn Plugin>, PluginError> {
    let endpoint = Endpoint::builder("/")
        .on_get(|req| async move { echo(&req) })
        .on_post(|req| async move {
            tracing::debug!(body_len = req.body.len(), "POST data received");
            echo(&req)
        })
        .build();
    registrar.register_endpoint(endpoint);

    Ok(Box::new(DebugPlugin))
}

fn echo(req: &EndpointRequest) -> EndpointResponse {
    EndpointResponse::text(
        StatusCode::OK,
        format!("{} {} ({})", req.method, req.path, req.remainder),
    )
}
