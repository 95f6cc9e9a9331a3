//! AV receiver control over its telnet port.
//!
//! ```text
//! GET /denon/switch/{on|off}
//! GET /denon/source/{rpi|pc|tv}
//! ```
//!
//! Each route sends one raw command to the receiver and reports the
//! outcome; a failed send is pushed onto the error stack and answered
//! with a 500.

use axum::http::StatusCode;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::errors::ErrorStack;
use crate::host::{HostServices, Plugin, PluginError, Registrar};
use crate::http::exchange::{EndpointRequest, EndpointResponse};
use crate::routing::Endpoint;

struct DenonPlugin;

impl Plugin for DenonPlugin {
    fn name(&self) -> &str {
        "denon"
    }
}

pub fn build(
    registrar: &Registrar,
    services: &HostServices,
) -> Result<Box<dyn Plugin>, PluginError> {
    let address = services.config.denon.address.clone();
    let errors = services.errors.clone();

    let endpoint = Endpoint::builder("/denon")
        .on_get(move |req| {
            let address = address.clone();
            let errors = errors.clone();
            async move { handle_get(req, address, errors).await }
        })
        .build();
    registrar.register_endpoint(endpoint);

    Ok(Box::new(DenonPlugin))
}

async fn handle_get(
    req: EndpointRequest,
    address: String,
    errors: Arc<ErrorStack>,
) -> EndpointResponse {
    let route: Vec<String> = req
        .remainder_segments()
        .iter()
        .map(|s| s.to_lowercase())
        .collect();

    if route.len() < 2 {
        tracing::info!(remainder = %req.remainder, "Incorrect denon access");
        return EndpointResponse::status(StatusCode::NOT_FOUND);
    }

    let payload = match command_for(&route[0], &route[1]) {
        Some(payload) => payload,
        None => return EndpointResponse::status(StatusCode::NOT_FOUND),
    };

    match send_command(&address, payload).await {
        Ok(()) => EndpointResponse::status(StatusCode::OK),
        Err(e) => {
            errors.report("denon", e.to_string());
            EndpointResponse::status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn command_for(action: &str, argument: &str) -> Option<&'static [u8]> {
    match (action, argument) {
        ("switch", "on") => Some(b"PWON"),
        ("switch", "off") => Some(b"PWSTANDBY\nZ2OFF"),
        ("source", "rpi") => Some(b"SIMPLAY"),
        ("source", "pc") => Some(b"SIBD"),
        ("source", "tv") => Some(b"SITV"),
        _ => None,
    }
}

async fn send_command(address: &str, payload: &[u8]) -> std::io::Result<()> {
    let mut stream = TcpStream::connect(address).await?;
    stream.write_all(payload).await?;
    stream.shutdown().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_mapping() {
        assert_eq!(command_for("switch", "on"), Some(&b"PWON"[..]));
        assert_eq!(command_for("switch", "off"), Some(&b"PWSTANDBY\nZ2OFF"[..]));
        assert_eq!(command_for("source", "tv"), Some(&b"SITV"[..]));
        assert_eq!(command_for("source", "vhs"), None);
        assert_eq!(command_for("volume", "up"), None);
    }

    #[tokio::test]
    async fn test_receiver_receives_payload() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            tokio::io::AsyncReadExt::read_to_end(&mut socket, &mut buf)
                .await
                .unwrap();
            buf
        });

        send_command(&addr.to_string(), b"PWON").await.unwrap();
        assert_eq!(server.await.unwrap(), b"PWON");
    }

    #[tokio::test]
    async fn test_unreachable_receiver_reports_error() {
        let errors = Arc::new(ErrorStack::new());
        let req = EndpointRequest {
            method: axum::http::Method::GET,
            path: "/denon/switch/on".into(),
            remainder: "switch/on".into(),
            headers: axum::http::HeaderMap::new(),
            body: axum::body::Bytes::new(),
        };

        // Reserved port with nothing listening.
        let response = handle_get(req, "127.0.0.1:1".into(), errors.clone()).await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(errors.pop().unwrap().source, "denon");
    }

    #[tokio::test]
    async fn test_short_route_is_not_found() {
        let errors = Arc::new(ErrorStack::new());
        let req = EndpointRequest {
            method: axum::http::Method::GET,
            path: "/denon/switch".into(),
            remainder: "switch".into(),
            headers: axum::http::HeaderMap::new(),
            body: axum::body::Bytes::new(),
        };

        let response = handle_get(req, "127.0.0.1:1".into(), errors.clone()).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert!(errors.is_empty());
    }
}
