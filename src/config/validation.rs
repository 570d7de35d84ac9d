//! Configuration validation.
//!
//! Serde handles syntax; this module checks meaning. Every problem is
//! reported, not just the first, so an operator can fix a config in one go.

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("upstreams.{0} is required")]
    MissingUpstream(&'static str),

    #[error("upstreams.{name} `{value}` is not a valid base URL: {reason}")]
    InvalidUpstream {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    let upstreams = &config.upstreams;
    for (name, value) in [
        ("auth", &upstreams.auth),
        ("film", &upstreams.film),
        ("actor", &upstreams.actor),
        ("review", &upstreams.review),
        ("user", &upstreams.user),
        ("bot", &upstreams.bot),
    ] {
        match value {
            None => errors.push(ValidationError::MissingUpstream(name)),
            Some(raw) => {
                if let Err(reason) = check_base_url(raw) {
                    errors.push(ValidationError::InvalidUpstream {
                        name,
                        value: raw.clone(),
                        reason,
                    });
                }
            }
        }
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream_secs"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// An upstream base URL must be plain `http(s)://host[:port][/base]`.
pub(crate) fn check_base_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme `{}`", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("query and fragment are not allowed".to_string());
    }
    Ok(url)
}
