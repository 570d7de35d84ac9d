//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid environment variable {name}: {reason}")]
    Env { name: &'static str, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: optional TOML file, then environment overrides,
/// then validation.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a TOML document into a configuration without validating it.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Overlay environment variables on top of a configuration.
///
/// `lookup` abstracts `std::env::var` so the mapping can be tested without
/// touching the process environment.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(addr) = lookup("GATEWAY_BIND_ADDRESS") {
        config.listener.bind_address = addr;
    }
    if let Some(port) = lookup("GATEWAY_PORT") {
        let port: u16 = port.trim().parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::Env {
                name: "GATEWAY_PORT",
                reason: e.to_string(),
            }
        })?;
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{}:{}", host, port);
    }
    if let Some(level) = lookup("GATEWAY_LOG_LEVEL") {
        config.observability.log_level = level;
    }

    let upstreams = &mut config.upstreams;
    for (name, slot) in [
        ("AUTH_SERVICE_URL", &mut upstreams.auth),
        ("FILM_SERVICE_URL", &mut upstreams.film),
        ("ACTOR_SERVICE_URL", &mut upstreams.actor),
        ("REVIEW_SERVICE_URL", &mut upstreams.review),
        ("USER_SERVICE_URL", &mut upstreams.user),
        ("BOT_SERVICE_URL", &mut upstreams.bot),
    ] {
        if let Some(value) = lookup(name) {
            *slot = Some(value);
        }
    }

    Ok(())
}
