//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (body size, CORS)
//!     → routing::path (reject traversal and empty segments)
//!     → headers.rs (strip hop-by-hop, rewrite Host, add X-Forwarded-*)
//!     → Forward upstream
//! ```
//!
//! # Design Decisions
//! - Fail closed: malformed paths never reach an upstream
//! - No trust in client input

pub mod headers;
pub mod limits;
