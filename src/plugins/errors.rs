//! Diagnostic endpoint exposing the error stack.
//!
//! ```text
//! GET /sys/errors/all    drain every queued record (destructive)
//! GET /sys/errors/last   most recent record, left in place
//! ```

use axum::http::StatusCode;
use std::sync::Arc;

use crate::errors::{ErrorRecord, ErrorStack};
use crate::host::{HostServices, Plugin, PluginError, Registrar};
use crate::http::exchange::{EndpointRequest, EndpointResponse};
use crate::routing::Endpoint;

struct ErrorsPlugin;

impl Plugin for ErrorsPlugin {
    fn name(&self) -> &str {
        "errors"
    }
}

pub fn build(
    registrar: &Registrar,
    services: &HostServices,
) -> Result<Box<dyn Plugin>, PluginError> {
    let errors = services.errors.clone();

    let endpoint = Endpoint::builder("/sys/errors")
        .on_get(move |req| {
            let errors = errors.clone();
            async move { handle_get(&req, &errors) }
        })
        .build();
    registrar.register_endpoint(endpoint);

    Ok(Box::new(ErrorsPlugin))
}

fn handle_get(req: &EndpointRequest, errors: &Arc<ErrorStack>) -> EndpointResponse {
    match req.remainder_segments().as_slice() {
        ["all"] => {
            let drained: Vec<ErrorRecord> = errors.drain().collect();
            EndpointResponse::json(StatusCode::OK, &drained)
        }
        ["last"] => match errors.peek() {
            Some(record) => EndpointResponse::json(StatusCode::OK, &record),
            None => EndpointResponse::status(StatusCode::NOT_FOUND),
        },
        _ => {
            tracing::info!(remainder = %req.remainder, "Incorrect error reporting access");
            EndpointResponse::status(StatusCode::NOT_FOUND)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, Method};

    fn request(remainder: &str) -> EndpointRequest {
        EndpointRequest {
            method: Method::GET,
            path: format!("/sys/errors/{}", remainder),
            remainder: remainder.to_string(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    #[test]
    fn test_all_drains_most_recent_first() {
        let errors = Arc::new(ErrorStack::new());
        errors.report("a", "first");
        errors.report("b", "second");

        let response = handle_get(&request("all"), &errors);
        assert_eq!(response.status, StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body[0]["message"], "second");
        assert_eq!(body[1]["message"], "first");
        // Destructive read.
        assert!(errors.is_empty());
    }

    #[test]
    fn test_all_on_empty_stack_is_empty_array() {
        let errors = Arc::new(ErrorStack::new());
        let response = handle_get(&request("all"), &errors);
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(&response.body[..], b"[]");
    }

    #[test]
    fn test_last_is_non_destructive() {
        let errors = Arc::new(ErrorStack::new());
        errors.report("denon", "boom");

        let response = handle_get(&request("last"), &errors);
        assert_eq!(response.status, StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["source"], "denon");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_last_on_empty_stack() {
        let errors = Arc::new(ErrorStack::new());
        let response = handle_get(&request("last"), &errors);
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_unknown_subroute() {
        let errors = Arc::new(ErrorStack::new());
        assert_eq!(
            handle_get(&request("everything"), &errors).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(handle_get(&request(""), &errors).status, StatusCode::NOT_FOUND);
    }
}
