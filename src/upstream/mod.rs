//! Upstream services subsystem.
//!
//! # Data Flow
//! ```text
//! UpstreamsConfig (six base URLs)
//!     → registry.rs (validate, precompute URI prefix and Host authority)
//!     → UpstreamRegistry (immutable, shared via Arc)
//!
//! Route decided → Upstream
//!     → registry.get(upstream).uri_for(path_and_query)
//! ```
//!
//! # Design Decisions
//! - One endpoint per service; no load balancing across replicas
//! - Built once at startup; a missing URL aborts startup

pub mod registry;
pub mod service;

pub use registry::{RegistryError, UpstreamRegistry, UpstreamTarget};
pub use service::Upstream;
