//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, upstream
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_upstream_failures_total` (counter): unreachable / timed out
//!
//! Recording is a no-op until a recorder is installed, so tests and a
//! gateway with metrics disabled pay almost nothing.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Label used when no upstream was involved (local or rejected requests).
pub const NO_UPSTREAM: &str = "none";

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished request.
pub fn record_request(method: &str, status: u16, upstream: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("upstream", upstream.to_string()),
    ];
    counter!("gateway_requests_total", &labels).increment(1);
    histogram!("gateway_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record an upstream that could not answer.
pub fn record_upstream_failure(upstream: &str, kind: &'static str) {
    counter!(
        "gateway_upstream_failures_total",
        "upstream" => upstream.to_string(),
        "kind" => kind
    )
    .increment(1);
}
