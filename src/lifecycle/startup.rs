//! Startup orchestration.
//!
//! Order: metrics exporter, HTTP server (upstream registry), listener
//! bind, then serve until a termination signal arrives. Any failure before
//! serving is fatal.

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{ConfigError, GatewayConfig};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::upstream::RegistryError;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("upstreams: {0}")]
    Registry(#[from] RegistryError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Bind the configured listener address.
pub async fn bind(config: &GatewayConfig) -> Result<TcpListener, StartupError> {
    let addr = &config.listener.bind_address;
    TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind {
            addr: addr.clone(),
            source,
        })
}

/// Run the gateway until SIGINT/SIGTERM.
pub async fn run(config: GatewayConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = HttpServer::new(config.clone())?;
    let listener = bind(&config).await?;

    tracing::info!(
        address = %listener.local_addr()?,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_termination().await;
        trigger.trigger();
    });

    server.run(listener, server_shutdown).await?;
    Ok(())
}
