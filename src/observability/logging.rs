//! Structured logging.
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies to the
//! gateway and to tower-http's request spans.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Filter directives derived from the configured level.
pub fn default_directives(config: &ObservabilityConfig) -> String {
    format!(
        "mymovierate_gateway={level},tower_http={level}",
        level = config.log_level
    )
}

/// Install the global subscriber. Safe to call once per process.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config)));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init();

    if let Err(e) = result {
        eprintln!("logging already initialized: {}", e);
    }
}
