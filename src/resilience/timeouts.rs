//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound connection establishment and the wait for an upstream response
//! - Cancel the pending call cleanly on timeout (the future is dropped)
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - Timed-out requests return 504 Gateway Timeout

use std::future::Future;
use std::time::Duration;

use crate::config::TimeoutConfig;

/// Resolved upstream deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamTimeouts {
    pub connect: Duration,
    pub response: Duration,
    pub idle: Duration,
}

impl From<&TimeoutConfig> for UpstreamTimeouts {
    fn from(config: &TimeoutConfig) -> Self {
        Self {
            connect: Duration::from_secs(config.connect_secs),
            response: Duration::from_secs(config.upstream_secs),
            idle: Duration::from_secs(config.idle_secs),
        }
    }
}

/// The deadline passed before the operation completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("deadline of {0:?} elapsed")]
pub struct TimedOut(pub Duration);

/// Run `fut`, giving up after `limit`.
pub async fn with_deadline<F, T>(limit: Duration, fut: F) -> Result<T, TimedOut>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| TimedOut(limit))
}
