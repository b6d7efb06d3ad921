//! Error types for request handling and startup.

use axum::{
    http::{header::InvalidHeaderName, header::InvalidHeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::observability::metrics;
use crate::upstream::UpstreamError;

/// Failures that end a request before any response headers were sent.
///
/// Once a streamed relay has started nothing here can be produced any more;
/// see [`crate::upstream::ChunkRelay`].
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Path outside the configured prefix.
    #[error("no route for {0}")]
    RouteNotFound(String),

    /// Path is ours but the method is not POST.
    #[error("method {0} not implemented")]
    MethodNotImplemented(String),

    /// The upstream could not be reached or its response could not be read.
    #[error("Request failed: {0}")]
    Upstream(#[from] UpstreamError),

    /// The upstream answered with an error status whose body was unreadable.
    #[error("HTTP {}: {}", .0.as_u16(), .0.canonical_reason().unwrap_or("Unknown"))]
    UpstreamStatus(StatusCode),

    /// Anything else that went wrong inside the proxy.
    #[error("Proxy error: {0}")]
    Internal(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            ProxyError::MethodNotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            ProxyError::UpstreamStatus(status) => *status,
            ProxyError::Upstream(_) | ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ProxyError::RouteNotFound(_) | ProxyError::MethodNotImplemented(_) => {
                tracing::warn!(status = %status, "{}", self);
                status.into_response()
            }
            ProxyError::Upstream(err) => {
                metrics::record_upstream_error(match err {
                    UpstreamError::Timeout(_) => "timeout",
                    UpstreamError::Transport(_) => "transport",
                });
                tracing::error!(status = %status, "{}", self);
                (status, Json(json!({ "error": self.to_string() }))).into_response()
            }
            ProxyError::UpstreamStatus(_) | ProxyError::Internal(_) => {
                tracing::error!(status = %status, "{}", self);
                (status, Json(json!({ "error": self.to_string() }))).into_response()
            }
        }
    }
}

/// Errors turning a validated config into a running server.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid CORS header value: {0}")]
    CorsHeader(#[from] InvalidHeaderValue),

    #[error("invalid streaming trigger header: {0}")]
    TriggerHeader(#[from] InvalidHeaderName),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to install metrics exporter: {0}")]
    Metrics(String),
}
