//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! gateway.toml (optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (*_SERVICE_URL, GATEWAY_PORT, ...)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; there is no reload path
//! - Every field but the upstream URLs has a default
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::GatewayConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::SecurityConfig;
pub use schema::TimeoutConfig;
pub use schema::UpstreamsConfig;
