//! Upstream race fetch subsystem.
//!
//! # Data Flow
//! ```text
//! Identifier
//!     → candidate.rs (one URL per extension, priority order)
//!     → race.rs (concurrent GETs under one shared deadline)
//!     → outcome.rs (per-candidate success or classified failure)
//!     → select.rs (first image by priority, or NoCandidateFound)
//! ```
//!
//! # Design Decisions
//! - Join-then-select: arrival order never decides the winner
//! - Selection is a pure function, tested without a network
//! - Per-candidate failures are kept for logs but collapse to "not found"

pub mod candidate;
pub mod outcome;
pub mod race;
pub mod select;

pub use candidate::Candidate;
pub use outcome::{
    CandidateError, FetchOutcome, FetchedImage, ImageHit, NoCandidateFound, SelectionResult,
    DEFAULT_CONTENT_TYPE,
};
pub use race::RaceFetcher;
pub use select::select;
