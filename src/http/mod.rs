//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → routing (decide local / upstream)
//!     → forward.rs (upstream call with deadline)
//!     → response.rs (strip hop-by-hop, stream body back)
//!     → Send to client
//! ```

pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use forward::Forwarder;
pub use request::{MakeGatewayRequestId, X_REQUEST_ID};
pub use server::HttpServer;
