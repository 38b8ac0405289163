//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → identifier.rs (validate the image identifier)
//!     → headers.rs (CORS headers on the way out)
//!     → Pass to the race fetcher
//! ```
//!
//! # Design Decisions
//! - Fail closed: an identifier that fails any check never reaches upstream
//! - No trust in client input

pub mod headers;
pub mod identifier;

pub use identifier::{validate, Identifier, InvalidIdentifier};
