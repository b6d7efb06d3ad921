//! Response relay.
//!
//! # Responsibilities
//! - Turn an upstream response into the caller's response
//! - Strip denylisted upstream headers
//! - Choose between a single-write body and a chunk-per-frame body
//!
//! # Design Decisions
//! - Bodies are passed through byte for byte; nothing is parsed
//! - Buffered bodies get a content length computed from the bytes actually
//!   relayed, not the upstream's claim
//! - CORS headers are added later by the middleware, for every response

use axum::{
    body::Body,
    http::{header::CONTENT_LENGTH, HeaderMap, StatusCode},
    response::Response,
};
use bytes::Bytes;

use crate::http::request::RequestId;
use crate::security::filter_response_headers;
use crate::upstream::{ChunkRelay, RelayOptions, UpstreamResponse};

/// Relay a fully read upstream body in one write.
pub fn relay_buffered(status: StatusCode, headers: &HeaderMap, body: Bytes) -> Response {
    let mut headers = filter_response_headers(headers);
    headers.remove(CONTENT_LENGTH);
    build(status, headers, Body::from(body))
}

/// Relay the upstream body as it arrives. The status line and headers go out
/// with the first poll of the body, before any chunk is read.
pub fn relay_streaming(
    upstream: UpstreamResponse,
    options: RelayOptions,
    request_id: RequestId,
) -> Response {
    let headers = filter_response_headers(&upstream.headers);
    let relay = ChunkRelay::new(upstream.body, options, request_id);
    build(upstream.status, headers, Body::from_stream(relay))
}

fn build(status: StatusCode, headers: HeaderMap, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
