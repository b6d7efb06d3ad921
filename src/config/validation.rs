//! Configuration validation.
//!
//! Serde handles syntax; this module checks values that would otherwise only
//! fail once traffic arrives. Validation is a pure function that returns every
//! problem found, not just the first.

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};
use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("listener.max_body_bytes must be greater than zero")]
    MaxBodyBytes,

    #[error("upstream.origin '{origin}' is invalid: {reason}")]
    Origin { origin: String, reason: String },

    #[error("upstream.path_prefix '{0}' must start with '/' and must not end with '/'")]
    PathPrefix(String),

    #[error("upstream.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("streaming.trigger_header '{0}' is not a valid header name")]
    TriggerHeader(String),

    #[error("streaming.chunk_size must be greater than zero")]
    ChunkSize,

    #[error("cors.{0} is not a valid header value")]
    CorsValue(&'static str),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Validate a configuration, collecting all errors.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::MaxBodyBytes);
    }

    if let Err(reason) = check_origin(&config.upstream.origin) {
        errors.push(ValidationError::Origin {
            origin: config.upstream.origin.clone(),
            reason,
        });
    }

    let prefix = &config.upstream.path_prefix;
    if !prefix.starts_with('/') || prefix.ends_with('/') {
        errors.push(ValidationError::PathPrefix(prefix.clone()));
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeout_secs"));
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_timeout_secs"));
    }

    if HeaderName::from_bytes(config.streaming.trigger_header.as_bytes()).is_err() {
        errors.push(ValidationError::TriggerHeader(
            config.streaming.trigger_header.clone(),
        ));
    }
    if config.streaming.chunk_size == 0 {
        errors.push(ValidationError::ChunkSize);
    }

    for (field, value) in [
        ("allow_origin", config.cors.allow_origin.as_str()),
        ("allow_methods", config.cors.allow_methods.as_str()),
        ("allow_headers", config.cors.allow_headers.as_str()),
    ] {
        if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::CorsValue(field));
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
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

/// The origin is concatenated with the caller's path, so it must be a bare
/// `scheme://host[:port]`.
fn check_origin(origin: &str) -> Result<(), String> {
    let url = Url::parse(origin).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if !origin
        .trim_end_matches('/')
        .eq_ignore_ascii_case(&url.origin().ascii_serialization())
    {
        return Err("must not contain a path, query or credentials".to_string());
    }
    Ok(())
}
