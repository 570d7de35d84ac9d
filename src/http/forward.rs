//! Forwarding engine.
//!
//! # Responsibilities
//! - Build the upstream request: same method, headers and streamed body,
//!   absolute URI on the chosen upstream, `Host` rewritten
//! - Bound the wait for the upstream response
//! - Map transport failures to 502 and deadlines to 504
//! - Report a chunked body that outgrows the body limit mid-stream as 413
//!
//! # Design Decisions
//! - Exactly one attempt per request; nothing is retried
//! - If the client goes away, axum drops the handler future and with it
//!   the pending upstream call
//! - Upstream requests always use HTTP/1.1, whatever the client spoke

use std::error::Error as StdError;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, Response, Version},
};
use http_body_util::LengthLimitError;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::error::GatewayError;
use crate::http::response::relay;
use crate::observability::metrics;
use crate::resilience::{with_deadline, TimedOut, UpstreamTimeouts};
use crate::routing::Forward;
use crate::security::headers::prepare_upstream_headers;
use crate::upstream::UpstreamRegistry;

/// Pooled HTTP client used for every upstream.
pub type HttpClient = Client<HttpConnector, Body>;

/// Build the shared upstream client.
pub fn build_client(timeouts: &UpstreamTimeouts) -> HttpClient {
    let mut connector = HttpConnector::new();
    connector.set_connect_timeout(Some(timeouts.connect));
    connector.set_nodelay(true);

    Client::builder(TokioExecutor::new())
        .pool_idle_timeout(timeouts.idle)
        .build(connector)
}

/// Sends routed requests to their upstream and relays the answer.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: HttpClient,
    registry: Arc<UpstreamRegistry>,
    timeouts: UpstreamTimeouts,
    forwarded_headers: bool,
}

impl Forwarder {
    pub fn new(
        registry: Arc<UpstreamRegistry>,
        timeouts: UpstreamTimeouts,
        forwarded_headers: bool,
    ) -> Self {
        Self {
            client: build_client(&timeouts),
            registry,
            timeouts,
            forwarded_headers,
        }
    }

    /// Forward `request` according to `decision`.
    pub async fn forward(
        &self,
        decision: &Forward,
        request: Request<Body>,
        client_addr: SocketAddr,
    ) -> Result<Response<Body>, GatewayError> {
        let upstream = decision.upstream;
        let target = self.registry.get(upstream).ok_or_else(|| {
            GatewayError::Internal(format!("upstream `{}` missing from registry", upstream))
        })?;
        let uri = target.uri_for(&decision.path_and_query)?;

        let (mut parts, body) = request.into_parts();
        prepare_upstream_headers(
            &mut parts.headers,
            client_addr,
            target.authority(),
            self.forwarded_headers,
        );

        let mut upstream_request = Request::new(body);
        *upstream_request.method_mut() = parts.method;
        *upstream_request.uri_mut() = uri;
        *upstream_request.version_mut() = Version::HTTP_11;
        *upstream_request.headers_mut() = parts.headers;

        tracing::debug!(
            upstream = %upstream,
            uri = %upstream_request.uri(),
            "Forwarding request"
        );

        match with_deadline(self.timeouts.response, self.client.request(upstream_request)).await {
            Ok(Ok(response)) => Ok(relay(response)),
            Ok(Err(e)) if exceeds_body_limit(&e) => {
                tracing::debug!(upstream = %upstream, "Request body over limit while forwarding");
                Err(GatewayError::PayloadTooLarge)
            }
            Ok(Err(e)) => {
                let kind = if e.is_connect() { "connect" } else { "request" };
                let reason = match std::error::Error::source(&e) {
                    Some(source) => format!("{}: {}", e, source),
                    None => e.to_string(),
                };
                metrics::record_upstream_failure(upstream.name(), kind);
                Err(GatewayError::UpstreamUnreachable { upstream, reason })
            }
            Err(TimedOut(limit)) => {
                metrics::record_upstream_failure(upstream.name(), "timeout");
                Err(GatewayError::UpstreamTimeout {
                    upstream,
                    secs: limit.as_secs(),
                })
            }
        }
    }
}

/// The body limit layer can only refuse a declared `Content-Length` up
/// front; an oversized chunked body fails later, inside the client call.
fn exceeds_body_limit(err: &(dyn StdError + 'static)) -> bool {
    std::iter::successors(Some(err), |&e| e.source()).any(|e| e.is::<LengthLimitError>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::{BodyExt, Full, Limited};

    #[tokio::test]
    async fn test_body_limit_error_found_in_source_chain() {
        let err = Limited::new(Full::new(&b"0123456789"[..]), 4)
            .collect()
            .await
            .unwrap_err();
        let wrapped = axum::Error::new(err);
        assert!(exceeds_body_limit(&wrapped));

        let reset = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(!exceeds_body_limit(&reset));
    }
}
