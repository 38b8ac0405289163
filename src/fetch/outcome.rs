//! Per-candidate fetch outcomes and the failure taxonomy.

use axum::body::Bytes;
use axum::http::{HeaderValue, StatusCode};
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Content type assumed when upstream sends none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A successfully downloaded upstream body.
///
/// The content type is kept as the raw header value so it can be sent back
/// to the client byte for byte, even when it is not valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub bytes: Bytes,
    pub content_type: HeaderValue,
}

impl FetchedImage {
    /// Build from a raw `Content-Type` value, falling back to the default.
    pub fn new(bytes: Bytes, content_type: Option<HeaderValue>) -> Self {
        let content_type = match content_type {
            Some(ct) if !ct.is_empty() => ct,
            _ => HeaderValue::from_static(DEFAULT_CONTENT_TYPE),
        };
        Self { bytes, content_type }
    }

    pub fn is_image(&self) -> bool {
        self.content_type.as_bytes().starts_with(b"image/")
    }

    /// Content type for logs and error messages.
    pub fn content_type_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.content_type.as_bytes())
    }
}

/// Why a single candidate did not produce a usable image.
#[derive(Debug, Error)]
pub enum CandidateError {
    /// Connection refused, DNS failure, connect timeout and the like.
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    #[error("upstream rejected with status {0}")]
    Rejected(StatusCode),

    #[error("upstream body unreadable: {0}")]
    Unreadable(String),

    #[error("upstream content type '{0}' is not an image")]
    NotAnImage(String),

    /// Still in flight when the race deadline elapsed.
    #[error("abandoned at race deadline")]
    Abandoned,
}

impl CandidateError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CandidateError::Unavailable(_) => "unavailable",
            CandidateError::Rejected(_) => "rejected",
            CandidateError::Unreadable(_) => "unreadable",
            CandidateError::NotAnImage(_) => "not_image",
            CandidateError::Abandoned => "abandoned",
        }
    }
}

/// Result of fetching one candidate.
pub type FetchOutcome = Result<FetchedImage, CandidateError>;

/// The winning candidate of a race.
#[derive(Debug, Clone)]
pub struct ImageHit {
    pub extension: String,
    pub url: String,
    pub image: FetchedImage,
}

/// No candidate produced an image.
///
/// Keeps each candidate's failure for logging; callers only see "not found".
#[derive(Debug, Error)]
#[error("no valid image found")]
pub struct NoCandidateFound {
    pub failures: Vec<(String, CandidateError)>,
}

impl NoCandidateFound {
    /// Compact `ext=reason` summary for log lines.
    pub fn summary(&self) -> String {
        Summary(&self.failures).to_string()
    }
}

struct Summary<'a>(&'a [(String, CandidateError)]);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (ext, err)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}={}", ext, err)?;
        }
        Ok(())
    }
}

/// Result of a whole race.
pub type SelectionResult = Result<ImageHit, NoCandidateFound>;
