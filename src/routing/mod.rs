//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request target ("/films/5/acteurs/9?x=1")
//!     → path.rs (sanitize, split into segments)
//!     → router.rs (ordered rule scan, first match wins)
//!     → matcher.rs (prefix and shape conditions)
//!     → Return: Local endpoint, Forward decision, or RouteError
//!
//! Route table (at startup):
//!     table.rs builds the ordered rules
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes built at startup, immutable at runtime
//! - No regex in hot path (segment matching only)
//! - Deterministic: same input always matches same route
//! - First match wins (table order)

pub mod matcher;
pub mod path;
pub mod router;
pub mod table;

pub use router::{Forward, LocalEndpoint, RouteDecision, RouteError, Router};
pub use table::gateway_router;
