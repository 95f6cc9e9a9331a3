//! Request/response shapes handed across the plugin boundary.
//!
//! # Responsibilities
//! - Present the in-flight request to a verb handler (method, path, route
//!   remainder, headers, buffered body)
//! - Let handlers produce a complete response (status, headers, body)
//!
//! # Design Decisions
//! - Bodies are buffered before dispatch; handlers never stream
//! - The host does not post-process handler responses

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// The in-flight request as seen by an endpoint's verb handler.
#[derive(Debug, Clone)]
pub struct EndpointRequest {
    pub method: Method,

    /// Full normalized request path.
    pub path: String,

    /// The part of the path beyond the matched endpoint's own path,
    /// without a leading slash. Empty when the match was exact.
    pub remainder: String,

    pub headers: HeaderMap,

    /// Buffered request body.
    pub body: Bytes,
}

impl EndpointRequest {
    /// Route remainder split on `/`; empty when there is no remainder.
    pub fn remainder_segments(&self) -> Vec<&str> {
        if self.remainder.is_empty() {
            Vec::new()
        } else {
            self.remainder.split('/').collect()
        }
    }

    /// Deserialize the buffered body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// A complete response produced by a verb handler.
#[derive(Debug)]
pub struct EndpointResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl EndpointResponse {
    /// Status-only response with an empty body.
    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Plain-text response.
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        Self {
            status,
            headers,
            body: Bytes::from(body.into()),
        }
    }

    /// JSON response; serialization failure degrades to a 500.
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => {
                let mut headers = HeaderMap::new();
                headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                Self {
                    status,
                    headers,
                    body: Bytes::from(body),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response body");
                Self::status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

impl IntoResponse for EndpointResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(remainder: &str) -> EndpointRequest {
        EndpointRequest {
            method: Method::GET,
            path: format!("/ep/{}", remainder),
            remainder: remainder.to_string(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    #[test]
    fn test_remainder_segments() {
        assert_eq!(request("switch/on").remainder_segments(), vec!["switch", "on"]);
        assert_eq!(request("all").remainder_segments(), vec!["all"]);
        assert!(request("").remainder_segments().is_empty());
    }

    #[test]
    fn test_json_body() {
        let mut req = request("");
        req.body = Bytes::from_static(br#"{"link": "x"}"#);
        let value: serde_json::Value = req.json().unwrap();
        assert_eq!(value["link"], "x");

        req.body = Bytes::from_static(b"not json");
        assert!(req.json::<serde_json::Value>().is_err());
    }
}
