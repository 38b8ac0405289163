//! Image identifier validation.
//!
//! # Responsibilities
//! - Reject identifiers that are empty or longer than the configured limit
//! - Allow only `[A-Za-z0-9_-]`
//! - Reject path traversal sequences (`/`, `\`, `..`) independently of the
//!   character allow-list
//!
//! # Design Decisions
//! - `validate` is pure and total; it never errors, only answers yes/no
//! - `Identifier` can only be constructed through validation, so the race
//!   fetcher never interpolates unchecked input into an upstream URL

use std::fmt;
use thiserror::Error;

/// Returned when a raw identifier fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid image identifier")]
pub struct InvalidIdentifier;

/// Check whether `id` is safe to use as an upstream path segment.
pub fn validate(id: &str, max_len: usize) -> bool {
    if id.is_empty() || id.chars().count() > max_len {
        return false;
    }

    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return false;
    }

    !(id.contains('/') || id.contains('\\') || id.contains(".."))
}

/// A validated image identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Validate `raw` and wrap it.
    pub fn parse(raw: &str, max_len: usize) -> Result<Self, InvalidIdentifier> {
        if validate(raw, max_len) {
            Ok(Self(raw.to_string()))
        } else {
            Err(InvalidIdentifier)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
