//! Upstream registry.
//!
//! # Responsibilities
//! - Hold the validated base URL of every upstream service
//! - Build the absolute URI a forwarded request is sent to
//! - Provide the authority used to rewrite the `Host` header

use std::collections::HashMap;

use axum::http::{HeaderValue, Uri};
use url::Url;

use crate::config::validation::check_base_url;
use crate::config::UpstreamsConfig;
use crate::upstream::Upstream;

/// Errors raised while building the registry or a target URI.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("upstream `{0}` is not configured")]
    Missing(Upstream),

    #[error("upstream `{upstream}` has an invalid base URL: {reason}")]
    InvalidBase { upstream: Upstream, reason: String },

    #[error("cannot build target URI `{0}`")]
    InvalidTarget(String),
}

/// A single upstream service endpoint.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    /// The configured base URL.
    pub base_url: Url,
    /// `scheme://authority[/base]` without trailing slash.
    prefix: String,
    /// Value for the `Host` header of forwarded requests.
    authority: HeaderValue,
}

impl UpstreamTarget {
    fn new(upstream: Upstream, base_url: Url) -> Result<Self, RegistryError> {
        let invalid = |reason: String| RegistryError::InvalidBase { upstream, reason };

        let host = base_url
            .host_str()
            .ok_or_else(|| invalid("missing host".to_string()))?;
        let authority = match base_url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let authority =
            HeaderValue::from_str(&authority).map_err(|e| invalid(e.to_string()))?;
        let prefix = base_url.as_str().trim_end_matches('/').to_string();

        Ok(Self {
            base_url,
            prefix,
            authority,
        })
    }

    /// Absolute URI for a forwarded `path_and_query` (always rooted).
    pub fn uri_for(&self, path_and_query: &str) -> Result<Uri, RegistryError> {
        let target = format!("{}{}", self.prefix, path_and_query);
        target
            .parse()
            .map_err(|_| RegistryError::InvalidTarget(target))
    }

    pub fn authority(&self) -> &HeaderValue {
        &self.authority
    }
}

/// Immutable map of upstream → endpoint, built once at startup.
#[derive(Debug, Clone)]
pub struct UpstreamRegistry {
    targets: HashMap<Upstream, UpstreamTarget>,
}

impl UpstreamRegistry {
    /// Build the registry; every upstream must be present and valid.
    pub fn from_config(config: &UpstreamsConfig) -> Result<Self, RegistryError> {
        let mut targets = HashMap::new();

        for upstream in Upstream::ALL {
            let raw = match upstream {
                Upstream::Auth => &config.auth,
                Upstream::Film => &config.film,
                Upstream::Actor => &config.actor,
                Upstream::Review => &config.review,
                Upstream::User => &config.user,
                Upstream::Bot => &config.bot,
            }
            .as_deref()
            .ok_or(RegistryError::Missing(upstream))?;

            let base_url = check_base_url(raw)
                .map_err(|reason| RegistryError::InvalidBase { upstream, reason })?;
            targets.insert(upstream, UpstreamTarget::new(upstream, base_url)?);
        }

        Ok(Self { targets })
    }

    /// Look up an upstream. Always present once constructed.
    pub fn get(&self, upstream: Upstream) -> Option<&UpstreamTarget> {
        self.targets.get(&upstream)
    }
}
