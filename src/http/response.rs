//! Response handling.
//!
//! # Responsibilities
//! - Relay upstream responses: status, headers and body unchanged
//! - Strip hop-by-hop headers on the way back
//!
//! # Design Decisions
//! - Streaming responses avoid buffering the entire body
//! - Upstream 4xx/5xx bodies are relayed, never reinterpreted

use axum::{body::Body, http::Response};
use hyper::body::Incoming;

use crate::security::headers::strip_hop_by_hop;

/// Convert an upstream response into the response sent to the client.
pub fn relay(response: Response<Incoming>) -> Response<Body> {
    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}
