//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → connect bounded by timeouts.connect
//!     → response head bounded by timeouts.response
//!     → refused / failed: 502, elapsed: 504
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - No retries: a non-idempotent request is never sent twice

pub mod timeouts;

pub use timeouts::{with_deadline, TimedOut, UpstreamTimeouts};
