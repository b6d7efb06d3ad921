//! The HTTP client capability the forwarding handler depends on.
//!
//! The handler never talks to a concrete HTTP library. It builds an
//! [`OutboundRequest`], hands it to an [`UpstreamClient`], and gets back the
//! status, headers and a lazy body stream. Buffering versus streaming is
//! decided by the caller of `send`, not by the transport.

use std::time::Duration;

use async_trait::async_trait;
use axum::http::{HeaderMap, StatusCode};
use bytes::{Bytes, BytesMut};
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use thiserror::Error;

/// Upstream body as it arrives, one chunk at a time.
pub type UpstreamBody = BoxStream<'static, Result<Bytes, UpstreamError>>;

/// Transport-level failure talking to the upstream.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// DNS, TLS, connection refused, reset, malformed response.
    #[error("{0}")]
    Transport(String),

    /// No response head within the configured deadline.
    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),
}

/// Request sent to the upstream, derived 1:1 from the inbound request.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    /// Absolute target URL (origin + rewritten path and query).
    pub url: String,
    /// Inbound headers minus the request denylist.
    pub headers: HeaderMap,
    /// Inbound body, untouched.
    pub body: Bytes,
    /// The caller asked for a streamed relay.
    pub streaming: bool,
}

/// Upstream response head plus its not-yet-consumed body.
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: UpstreamBody,
}

impl UpstreamResponse {
    /// Drain the body into a single buffer.
    pub async fn collect_body(self) -> Result<(StatusCode, HeaderMap, Bytes), UpstreamError> {
        let Self {
            status,
            headers,
            mut body,
        } = self;
        let mut buf = BytesMut::new();
        while let Some(chunk) = body.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok((status, headers, buf.freeze()))
    }
}

impl std::fmt::Debug for UpstreamResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Something that can POST an [`OutboundRequest`] to the upstream.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Send the request and return as soon as the response head is available.
    async fn send(&self, request: OutboundRequest) -> Result<UpstreamResponse, UpstreamError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    #[tokio::test]
    async fn collect_body_concatenates_chunks() {
        let response = UpstreamResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: stream::iter(vec![
                Ok(Bytes::from_static(b"data: a\n\n")),
                Ok(Bytes::new()),
                Ok(Bytes::from_static(b"data: b\n\n")),
            ])
            .boxed(),
        };
        let (status, _, body) = response.collect_body().await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"data: a\n\ndata: b\n\n");
    }

    #[tokio::test]
    async fn collect_body_surfaces_read_errors() {
        let response = UpstreamResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: stream::iter(vec![
                Ok(Bytes::from_static(b"partial")),
                Err(UpstreamError::Transport("connection reset".into())),
            ])
            .boxed(),
        };
        let err = response.collect_body().await.unwrap_err();
        assert_eq!(err.to_string(), "connection reset");
    }
}
