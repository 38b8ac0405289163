//! Configuration validation.
//!
//! Semantic checks on top of what serde already enforces. All problems are
//! collected and reported together.

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// Upper bound on `identifier.max_length`.
pub const MAX_IDENTIFIER_LENGTH_LIMIT: usize = 1024;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("upstream.base_url '{url}' is invalid: {reason}")]
    BaseUrl { url: String, reason: String },

    #[error("upstream.extensions must not be empty")]
    NoExtensions,

    #[error("upstream.extensions entry '{0}' must be non-empty ASCII alphanumeric")]
    Extension(String),

    #[error("upstream.extensions lists '{0}' more than once")]
    DuplicateExtension(String),

    #[error("upstream.race_timeout_ms must be greater than zero")]
    RaceTimeout,

    #[error("timeouts.request_secs must exceed the upstream race timeout")]
    RequestTimeout,

    #[error("identifier.max_length must be between 1 and {MAX_IDENTIFIER_LENGTH_LIMIT}")]
    MaxLength,

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Validate a configuration, returning every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if let Err(reason) = check_base_url(&config.upstream.base_url) {
        errors.push(ValidationError::BaseUrl {
            url: config.upstream.base_url.clone(),
            reason,
        });
    }

    let extensions = &config.upstream.extensions;
    if extensions.is_empty() {
        errors.push(ValidationError::NoExtensions);
    }
    for (i, ext) in extensions.iter().enumerate() {
        if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            errors.push(ValidationError::Extension(ext.clone()));
        } else if extensions[..i].contains(ext) {
            errors.push(ValidationError::DuplicateExtension(ext.clone()));
        }
    }

    if config.upstream.race_timeout_ms == 0 {
        errors.push(ValidationError::RaceTimeout);
    } else if config.timeouts.request_secs.saturating_mul(1000) <= config.upstream.race_timeout_ms {
        errors.push(ValidationError::RequestTimeout);
    }

    if config.identifier.max_length == 0
        || config.identifier.max_length > MAX_IDENTIFIER_LENGTH_LIMIT
    {
        errors.push(ValidationError::MaxLength);
    }

    if config.observability.metrics_socket().is_err() {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_base_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if !raw.ends_with('/') {
        return Err("must end with '/'".to_string());
    }
    Ok(())
}
