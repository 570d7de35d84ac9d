//! Errors synthesized by the gateway itself.
//!
//! Upstream error responses are never represented here: they are relayed
//! verbatim. Only failures local to the gateway produce a body of the form
//! `{"message": "..."}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::routing::RouteError;
use crate::upstream::{RegistryError, Upstream};

/// Request-level failures produced by the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Route not found")]
    RouteNotFound,

    #[error("Malformed request path: {0}")]
    MalformedPath(String),

    #[error("request body exceeds the configured limit")]
    PayloadTooLarge,

    #[error("upstream `{upstream}` unreachable: {reason}")]
    UpstreamUnreachable { upstream: Upstream, reason: String },

    #[error("upstream `{upstream}` timed out after {secs}s")]
    UpstreamTimeout { upstream: Upstream, secs: u64 },

    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::RouteNotFound => StatusCode::NOT_FOUND,
            GatewayError::MalformedPath(_) => StatusCode::BAD_REQUEST,
            GatewayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::UpstreamUnreachable { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message; upstream details stay in the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            GatewayError::RouteNotFound => "Route not found",
            GatewayError::MalformedPath(_) => "Malformed request path",
            GatewayError::PayloadTooLarge => "Request body too large",
            GatewayError::UpstreamUnreachable { .. } => "Upstream service unavailable",
            GatewayError::UpstreamTimeout { .. } => "Upstream service timed out",
            GatewayError::Internal(_) => "Internal gateway error",
        }
    }
}

impl From<RouteError> for GatewayError {
    fn from(err: RouteError) -> Self {
        match err {
            RouteError::NotFound => GatewayError::RouteNotFound,
            RouteError::MalformedPath(e) => GatewayError::MalformedPath(e.to_string()),
        }
    }
}

impl From<RegistryError> for GatewayError {
    fn from(err: RegistryError) -> Self {
        GatewayError::Internal(err.to_string())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(json!({ "message": self.public_message() })),
        )
            .into_response()
    }
}
