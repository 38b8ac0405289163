//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handler and race fetcher produce:
//!     → logging.rs (structured log events, request ID in every handler event)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (human or JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
