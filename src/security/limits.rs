//! Request limits and browser-facing policies.
//!
//! # Responsibilities
//! - Enforce maximum request body size (413 Payload Too Large)
//! - Answer CORS for the single-page frontend
//!
//! # Design Decisions
//! - The body limit streams: requests are never buffered to be measured
//! - CORS is permissive, like the frontend expects; it can be switched off

use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};

use crate::config::SecurityConfig;

pub fn body_limit_layer(config: &SecurityConfig) -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(config.max_body_size)
}

/// `None` when CORS handling is disabled.
pub fn cors_layer(config: &SecurityConfig) -> Option<CorsLayer> {
    config.cors_enabled.then(CorsLayer::permissive)
}
