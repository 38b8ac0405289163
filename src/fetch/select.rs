//! Priority selection over completed race outcomes.
//!
//! Selection is by candidate order only. Arrival order never matters because
//! the fetcher collects every outcome (or the deadline) before calling this.

use super::candidate::Candidate;
use super::outcome::{CandidateError, FetchOutcome, ImageHit, NoCandidateFound, SelectionResult};

/// Pick the first candidate, in priority order, whose outcome is an image.
///
/// `outcomes[i]` belongs to `candidates[i]`; a `None` slot is a candidate
/// that never reported and counts as abandoned.
pub fn select(candidates: Vec<Candidate>, outcomes: Vec<Option<FetchOutcome>>) -> SelectionResult {
    let mut failures = Vec::with_capacity(candidates.len());
    let mut outcomes = outcomes.into_iter();

    for candidate in candidates {
        let outcome = outcomes.next().flatten().unwrap_or(Err(CandidateError::Abandoned));
        match outcome {
            Ok(image) if image.is_image() => {
                return Ok(ImageHit {
                    extension: candidate.extension,
                    url: candidate.url,
                    image,
                });
            }
            Ok(image) => {
                let content_type = image.content_type_lossy().into_owned();
                failures.push((candidate.extension, CandidateError::NotAnImage(content_type)));
            }
            Err(err) => failures.push((candidate.extension, err)),
        }
    }

    Err(NoCandidateFound { failures })
}
