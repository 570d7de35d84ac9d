//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the single gateway handler
//! - Wire up middleware (request ID, tracing, CORS, body limit)
//! - Bind server to listener, stop on the shutdown signal
//! - Dispatch requests to the routing engine
//! - Answer local endpoints, forward everything else upstream

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Method, Request},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::health::health_response;
use crate::http::forward::Forwarder;
use crate::http::request::{request_id, MakeGatewayRequestId, X_REQUEST_ID};
use crate::observability::metrics;
use crate::resilience::UpstreamTimeouts;
use crate::routing::{gateway_router, LocalEndpoint, RouteDecision, Router as GatewayRouter};
use crate::security::limits::{body_limit_layer, cors_layer};
use crate::upstream::{RegistryError, UpstreamRegistry};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<GatewayRouter>,
    pub forwarder: Arc<Forwarder>,
}

/// HTTP server for the API gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails if any upstream base URL is missing or invalid.
    pub fn new(config: GatewayConfig) -> Result<Self, RegistryError> {
        let registry = Arc::new(UpstreamRegistry::from_config(&config.upstreams)?);
        let forwarder = Forwarder::new(
            registry,
            UpstreamTimeouts::from(&config.timeouts),
            config.security.forwarded_headers,
        );

        let state = AppState {
            router: Arc::new(gateway_router()),
            forwarder: Arc::new(forwarder),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .fallback(gateway_handler)
            .with_state(state)
            .layer(body_limit_layer(&config.security));

        if let Some(cors) = cors_layer(&config.security) {
            router = router.layer(cors);
        }

        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeGatewayRequestId))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id(request.headers()),
                    )
                }))
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
        )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Main gateway handler: route, then answer locally or forward.
async fn gateway_handler(
    State(state): State<AppState>,
    ConnectInfo(client_addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let request_id = request_id(request.headers()).to_string();
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let decision = match state.router.resolve(&target) {
        Ok(decision) => decision,
        Err(e) => {
            tracing::warn!(request_id = %request_id, target = %target, error = %e, "Request not routed");
            return finish(&method, metrics::NO_UPSTREAM, start_time, GatewayError::from(e).into_response());
        }
    };

    let forward = match decision {
        RouteDecision::Local(LocalEndpoint::Health)
            if method == Method::GET || method == Method::HEAD =>
        {
            return finish(&method, metrics::NO_UPSTREAM, start_time, health_response());
        }
        RouteDecision::Local(endpoint) => {
            tracing::debug!(request_id = %request_id, ?endpoint, method = %method, "Method not served locally");
            return finish(
                &method,
                metrics::NO_UPSTREAM,
                start_time,
                GatewayError::RouteNotFound.into_response(),
            );
        }
        RouteDecision::Forward(forward) => forward,
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        route = forward.route,
        upstream = %forward.upstream,
        path = %forward.path_and_query,
        "Routing request"
    );

    let response = match state.forwarder.forward(&forward, request, client_addr).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                route = forward.route,
                error = %e,
                "Upstream error"
            );
            e.into_response()
        }
    };

    finish(&method, forward.upstream.name(), start_time, response)
}

fn finish(method: &Method, upstream: &str, start_time: Instant, response: Response) -> Response {
    metrics::record_request(method.as_str(), response.status().as_u16(), upstream, start_time);
    response
}
