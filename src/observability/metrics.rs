//! Metrics collection and exposition.
//!
//! # Metrics
//! - `image_proxy_requests_total` (counter): inbound requests by method, status
//! - `image_proxy_request_duration_seconds` (histogram): inbound latency
//! - `image_proxy_candidate_outcomes_total` (counter): per-candidate outcome by extension
//! - `image_proxy_race_duration_seconds` (histogram): time spent in a race
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

/// Record one finished inbound request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("image_proxy_requests_total", &labels).increment(1);
    metrics::histogram!("image_proxy_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record how a single candidate ended.
pub fn record_candidate(extension: &str, outcome: &'static str) {
    metrics::counter!(
        "image_proxy_candidate_outcomes_total",
        "extension" => extension.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record the wall time of one race.
pub fn record_race(start: Instant) {
    metrics::histogram!("image_proxy_race_duration_seconds").record(start.elapsed().as_secs_f64());
}
