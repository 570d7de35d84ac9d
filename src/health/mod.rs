//! Gateway health endpoint.
//!
//! Answered locally; it reports the gateway process only and never probes
//! the upstream services.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Name reported by the health endpoint.
pub const SERVICE_NAME: &str = "api-gateway";

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
}

pub fn health_response() -> Response {
    Json(HealthStatus {
        status: "ok",
        service: SERVICE_NAME,
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_body() {
        let body = serde_json::to_string(&HealthStatus {
            status: "ok",
            service: SERVICE_NAME,
        })
        .unwrap();
        assert_eq!(body, r#"{"status":"ok","service":"api-gateway"}"#);
    }
}
