//! Request handling and inspection.
//!
//! # Responsibilities
//! - Assign every request a unique ID for log correlation
//! - Decide whether the caller asked for a streamed relay
//!
//! # Design Decisions
//! - The ID lives in request extensions only; it is never forwarded upstream,
//!   so the outbound header set stays exactly the caller's minus the denylist
//! - Request ID added as early as possible (outermost layer) for tracing

use std::fmt;
use std::task::{Context, Poll};

use axum::http::{header::InvalidHeaderName, HeaderMap, HeaderName, Request};
use tower::{Layer, Service};
use uuid::Uuid;

use crate::config::StreamingConfig;

/// Unique identifier for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Read the request ID assigned by [`RequestIdLayer`].
pub trait RequestIdExt {
    fn request_id(&self) -> Option<RequestId>;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<RequestId> {
        self.extensions().get::<RequestId>().copied()
    }
}

/// Layer that stores a fresh [`RequestId`] in each request's extensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        request.extensions_mut().insert(RequestId::new());
        self.inner.call(request)
    }
}

/// The header/value pair that switches a request into streaming mode.
#[derive(Debug, Clone)]
pub struct StreamTrigger {
    header: HeaderName,
    value: String,
}

impl StreamTrigger {
    pub fn new(header: HeaderName, value: impl Into<String>) -> Self {
        Self {
            header,
            value: value.into(),
        }
    }

    pub fn from_config(config: &StreamingConfig) -> Result<Self, InvalidHeaderName> {
        let header = HeaderName::from_bytes(config.trigger_header.as_bytes())?;
        Ok(Self::new(header, config.trigger_value.clone()))
    }

    /// Header names match case-insensitively; the value must match exactly.
    pub fn is_streaming(&self, headers: &HeaderMap) -> bool {
        headers
            .get_all(&self.header)
            .iter()
            .any(|value| value.as_bytes() == self.value.as_bytes())
    }
}
