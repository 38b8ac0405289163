//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, image handler)
//!     → request.rs (request ID generation and lookup)
//!     → [security: identifier validation]
//!     → [fetch: race fetch + selection]
//!     → response.rs (image or error response, CORS preflight)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdExt, UuidRequestId, X_REQUEST_ID};
pub use response::ProxyError;
pub use server::HttpServer;
