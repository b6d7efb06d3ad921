//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the CORS proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Fixed upstream the proxy forwards to.
    pub upstream: UpstreamConfig,

    /// Streaming-mode trigger and chunk relay settings.
    pub streaming: StreamingConfig,

    /// CORS header values attached to every response.
    pub cors: CorsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3001").
    pub bind_address: String,

    /// Largest inbound request body accepted, in bytes.
    pub max_body_bytes: usize,

    /// How long in-flight requests may keep running after a shutdown signal.
    pub shutdown_grace_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3001".to_string(),
            max_body_bytes: 10 * 1024 * 1024,
            shutdown_grace_secs: 5,
        }
    }
}

/// Upstream configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Scheme and host of the proxied API, without a path.
    pub origin: String,

    /// Local path prefix stripped before forwarding.
    pub path_prefix: String,

    /// Deadline for the upstream response head, in seconds.
    pub timeout_secs: u64,

    /// TCP/TLS connect timeout, in seconds.
    pub connect_timeout_secs: u64,

    /// Skip certificate and hostname verification toward the upstream.
    ///
    /// Development only. Never enable this for a proxy reachable by others.
    pub insecure_skip_verify: bool,

    /// Honour HTTP(S)_PROXY environment variables for outbound calls.
    pub use_system_proxy: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            origin: "https://dashscope.aliyuncs.com".to_string(),
            path_prefix: "/api/dashscope".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            insecure_skip_verify: false,
            use_system_proxy: true,
        }
    }
}

/// Streaming relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Request header that asks for a streamed relay.
    pub trigger_header: String,

    /// Exact header value that enables streaming.
    pub trigger_value: String,

    /// Largest chunk written to the caller in one frame.
    pub chunk_size: usize,

    /// Log a short preview of every relayed chunk at DEBUG.
    pub log_chunk_previews: bool,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            trigger_header: "X-DashScope-SSE".to_string(),
            trigger_value: "enable".to_string(),
            chunk_size: 1024,
            log_chunk_previews: false,
        }
    }
}

/// CORS response header values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allow_origin: String,
    pub allow_methods: String,
    pub allow_headers: String,
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
            allow_methods: "GET, POST, PUT, DELETE, OPTIONS".to_string(),
            allow_headers: "Content-Type, Authorization, X-DashScope-SSE".to_string(),
            max_age_secs: 86400,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
