//! Radio-controlled outlet switching via an external command.
//!
//! ```text
//! GET /rcswitch/{a|b|c|d}/{on|off}
//! ```

use axum::http::StatusCode;
use std::sync::Arc;
use tokio::process::Command;

use crate::errors::ErrorStack;
use crate::host::{HostServices, Plugin, PluginError, Registrar};
use crate::http::exchange::{EndpointRequest, EndpointResponse};
use crate::routing::Endpoint;

const CHANNELS: [&str; 4] = ["a", "b", "c", "d"];

struct RcSwitchPlugin;

impl Plugin for RcSwitchPlugin {
    fn name(&self) -> &str {
        "rcswitch"
    }
}

pub fn build(
    registrar: &Registrar,
    services: &HostServices,
) -> Result<Box<dyn Plugin>, PluginError> {
    let command = services.config.rcswitch.command.clone();
    let errors = services.errors.clone();

    let endpoint = Endpoint::builder("/rcswitch")
        .on_get(move |req| {
            let command = command.clone();
            let errors = errors.clone();
            async move { handle_get(req, command, errors).await }
        })
        .build();
    registrar.register_endpoint(endpoint);

    Ok(Box::new(RcSwitchPlugin))
}

async fn handle_get(
    req: EndpointRequest,
    command: String,
    errors: Arc<ErrorStack>,
) -> EndpointResponse {
    let route: Vec<String> = req
        .remainder_segments()
        .iter()
        .map(|s| s.to_lowercase())
        .collect();

    if route.len() < 2 {
        tracing::info!(remainder = %req.remainder, "Incorrect rcswitch access");
        return EndpointResponse::status(StatusCode::NOT_FOUND);
    }

    let (channel, toggle) = (route[0].as_str(), route[1].as_str());
    if !CHANNELS.contains(&channel) {
        tracing::warn!(channel = %channel, "Invalid channel");
        return EndpointResponse::status(StatusCode::NOT_FOUND);
    }
    if toggle != "on" && toggle != "off" {
        tracing::info!(toggle = %toggle, "Invalid toggle value");
        return EndpointResponse::status(StatusCode::NOT_FOUND);
    }

    match Command::new(&command).arg(channel).arg(toggle).status().await {
        Ok(status) if status.success() => EndpointResponse::status(StatusCode::OK),
        Ok(status) => {
            errors.report("rcswitch", format!("{} exited with {}", command, status));
            EndpointResponse::status(StatusCode::INTERNAL_SERVER_ERROR)
        }
        Err(e) => {
            errors.report("rcswitch", format!("failed to run {}: {}", command, e));
            EndpointResponse::status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
