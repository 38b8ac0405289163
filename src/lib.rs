//! Image race proxy library.
//!
//! Resolves an opaque image identifier against an upstream store by fetching
//! every candidate extension concurrently and serving the highest-priority
//! image that came back.

pub mod config;
pub mod fetch;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::ProxyConfig;
pub use fetch::RaceFetcher;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
