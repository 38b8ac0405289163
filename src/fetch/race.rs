//! Concurrent race fetch across candidate extensions.
//!
//! # Responsibilities
//! - Spawn one upstream GET per candidate
//! - Bound the whole race by a single shared deadline
//! - Collect every outcome (or stop at the deadline) before selecting
//! - Abort stragglers so no task or socket outlives the race

use axum::http::header::CONTENT_TYPE;
use std::time::Instant;
use tokio::task::JoinSet;

use super::candidate::Candidate;
use super::outcome::{CandidateError, FetchOutcome, FetchedImage, SelectionResult};
use super::select::select;
use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::security::Identifier;

/// Fetches an identifier from every candidate extension at once.
#[derive(Debug, Clone)]
pub struct RaceFetcher {
    client: reqwest::Client,
    config: UpstreamConfig,
}

impl RaceFetcher {
    /// Build a fetcher with its own pooled HTTP client.
    pub fn new(config: UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .no_proxy()
            .build()?;
        Ok(Self { client, config })
    }

    /// Race all candidates for `id` and pick the best image by priority.
    pub async fn fetch_first(&self, id: &Identifier) -> SelectionResult {
        let started = Instant::now();
        let deadline = tokio::time::Instant::now() + self.config.race_timeout();
        let candidates =
            Candidate::for_identifier(id, &self.config.extensions, &self.config.base_url);

        let mut tasks = JoinSet::new();
        for (slot, candidate) in candidates.iter().enumerate() {
            let client = self.client.clone();
            let url = candidate.url.clone();
            let max_body = self.config.max_body_bytes;
            tasks.spawn(async move { (slot, fetch_candidate(&client, &url, max_body).await) });
        }

        let mut outcomes: Vec<Option<FetchOutcome>> = candidates.iter().map(|_| None).collect();
        loop {
            let next = tokio::time::timeout_at(deadline, tasks.join_next()).await;
            match next {
                Ok(Some(Ok((slot, outcome)))) => {
                    if let Err(e) = &outcome {
                        tracing::debug!(
                            url = %candidates[slot].url,
                            error = %e,
                            "Candidate failed"
                        );
                    }
                    outcomes[slot] = Some(outcome);
                }
                Ok(Some(Err(e))) => {
                    tracing::error!(
                        identifier = %id,
                        error = %e,
                        "Candidate task did not complete"
                    );
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        identifier = %id,
                        pending = tasks.len(),
                        timeout_ms = self.config.race_timeout_ms,
                        "Race deadline elapsed, abandoning pending candidates"
                    );
                    tasks.abort_all();
                    break;
                }
            }
        }

        for (candidate, outcome) in candidates.iter().zip(&outcomes) {
            metrics::record_candidate(&candidate.extension, outcome_label(outcome.as_ref()));
        }
        metrics::record_race(started);

        select(candidates, outcomes)
    }
}

/// GET one candidate URL and capture its body and content type.
async fn fetch_candidate(client: &reqwest::Client, url: &str, max_body: usize) -> FetchOutcome {
    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| CandidateError::Unavailable(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CandidateError::Rejected(status));
    }

    let content_type = response.headers().get(CONTENT_TYPE).cloned();

    if response.content_length().is_some_and(|len| len > max_body as u64) {
        return Err(CandidateError::Unreadable(format!("body exceeds {} bytes", max_body)));
    }

    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| CandidateError::Unreadable(e.to_string()))?
    {
        if body.len() + chunk.len() > max_body {
            return Err(CandidateError::Unreadable(format!("body exceeds {} bytes", max_body)));
        }
        body.extend_from_slice(&chunk);
    }

    Ok(FetchedImage::new(body.into(), content_type))
}

fn outcome_label(outcome: Option<&FetchOutcome>) -> &'static str {
    match outcome {
        Some(Ok(image)) if image.is_image() => "ok",
        Some(Ok(_)) => "not_image",
        Some(Err(e)) => e.kind(),
        None => "abandoned",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::HeaderValue;

    #[test]
    fn labels_cover_every_outcome() {
        let png = Some(HeaderValue::from_static("image/png"));
        let image: FetchOutcome = Ok(FetchedImage::new(Bytes::new(), png));
        let html = Some(HeaderValue::from_static("text/html"));
        let html: FetchOutcome = Ok(FetchedImage::new(Bytes::new(), html));
        let refused: FetchOutcome = Err(CandidateError::Unavailable("refused".into()));

        assert_eq!(outcome_label(Some(&image)), "ok");
        assert_eq!(outcome_label(Some(&html)), "not_image");
        assert_eq!(outcome_label(Some(&refused)), "unavailable");
        assert_eq!(outcome_label(None), "abandoned");
    }

    #[tokio::test]
    async fn unreachable_upstream_reports_not_found() {
        let config = UpstreamConfig {
            // nothing listens on the discard port
            base_url: "http://127.0.0.1:9/u/".into(),
            race_timeout_ms: 2_000,
            ..UpstreamConfig::default()
        };
        let fetcher = RaceFetcher::new(config).unwrap();
        let id = Identifier::parse("abc", 100).unwrap();

        let err = fetcher.fetch_first(&id).await.unwrap_err();
        assert_eq!(err.failures.len(), 3);
        assert!(err
            .failures
            .iter()
            .all(|(_, e)| matches!(e, CandidateError::Unavailable(_) | CandidateError::Abandoned)));
    }
}
