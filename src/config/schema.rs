//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

/// Root configuration for the image proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream content store and race settings.
    pub upstream: UpstreamConfig,

    /// Identifier validation limits.
    pub identifier: IdentifierConfig,

    /// Response header settings.
    pub response: ResponseConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream content store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL the identifier is appended to. Must end with `/`.
    pub base_url: String,

    /// Candidate extensions, highest priority first.
    pub extensions: Vec<String>,

    /// Shared deadline for the whole race in milliseconds.
    pub race_timeout_ms: u64,

    /// TCP connect timeout for a single candidate in milliseconds.
    pub connect_timeout_ms: u64,

    /// Largest upstream body accepted for a candidate.
    pub max_body_bytes: usize,
}

impl UpstreamConfig {
    pub fn race_timeout(&self) -> Duration {
        Duration::from_millis(self.race_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://cdn_zipline:3000/u/".to_string(),
            extensions: vec!["webp".to_string(), "png".to_string(), "jpg".to_string()],
            race_timeout_ms: 10_000,
            connect_timeout_ms: 2_000,
            max_body_bytes: 25 * 1024 * 1024, // 25MB
        }
    }
}

/// Identifier validation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentifierConfig {
    /// Maximum identifier length in characters.
    pub max_length: usize,
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self { max_length: 100 }
    }
}

/// Response header configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// `max-age` advertised in `Cache-Control` for served images.
    pub cache_max_age_secs: u64,
}

impl ResponseConfig {
    pub fn cache_control(&self) -> String {
        format!("public, max-age={}", self.cache_max_age_secs)
    }
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            cache_max_age_secs: 3600,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines instead of the human format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// Address for the metrics endpoint, or `None` when metrics are off.
    pub fn metrics_socket(&self) -> Result<Option<SocketAddr>, AddrParseError> {
        if !self.metrics_enabled {
            return Ok(None);
        }
        self.metrics_address.parse().map(Some)
    }
}
