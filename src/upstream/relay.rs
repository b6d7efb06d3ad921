//! Chunk-by-chunk relay of a streamed upstream body.
//!
//! [`ChunkRelay`] sits between the upstream body and the caller's response
//! body. Hyper writes and flushes every item it yields as its own frame, so
//! each upstream chunk reaches the caller before the next one is requested.
//!
//! # Behaviour
//! - Order is preserved; empty upstream chunks are skipped
//! - Chunks longer than `chunk_size` are split, shorter ones are never merged
//! - An upstream error ends the relay cleanly; headers are already committed
//! - Dropping the relay early (caller went away) drops the upstream body,
//!   which releases the upstream connection

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use bytes::Bytes;
use futures_util::Stream;

use crate::http::request::RequestId;
use crate::observability::metrics;
use crate::upstream::client::UpstreamBody;

const PREVIEW_CHARS: usize = 100;

/// Relay settings taken from `[streaming]`.
#[derive(Debug, Clone, Copy)]
pub struct RelayOptions {
    pub chunk_size: usize,
    pub log_previews: bool,
}

/// Stream adapter that forwards upstream chunks and never fails.
pub struct ChunkRelay {
    upstream: UpstreamBody,
    pending: Bytes,
    options: RelayOptions,
    request_id: RequestId,
    chunks: u64,
    bytes: u64,
    done: bool,
}

impl ChunkRelay {
    pub fn new(upstream: UpstreamBody, options: RelayOptions, request_id: RequestId) -> Self {
        Self {
            upstream,
            pending: Bytes::new(),
            options: RelayOptions {
                chunk_size: options.chunk_size.max(1),
                ..options
            },
            request_id,
            chunks: 0,
            bytes: 0,
            done: false,
        }
    }

    fn emit(&mut self) -> Bytes {
        let take = self.pending.len().min(self.options.chunk_size);
        let chunk = self.pending.split_to(take);

        self.chunks += 1;
        self.bytes += chunk.len() as u64;
        metrics::record_stream_chunk(chunk.len());

        tracing::trace!(
            request_id = %self.request_id,
            chunk = self.chunks,
            size = chunk.len(),
            "Forwarding chunk"
        );
        if self.options.log_previews {
            let preview: String = String::from_utf8_lossy(&chunk)
                .chars()
                .take(PREVIEW_CHARS)
                .collect();
            tracing::debug!(
                request_id = %self.request_id,
                chunk = self.chunks,
                %preview,
                "Chunk preview"
            );
        }

        chunk
    }
}

impl Stream for ChunkRelay {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if !this.pending.is_empty() {
                return Poll::Ready(Some(Ok(this.emit())));
            }
            if this.done {
                return Poll::Ready(None);
            }

            match ready!(this.upstream.as_mut().poll_next(cx)) {
                Some(Ok(chunk)) => this.pending = chunk,
                Some(Err(err)) => {
                    this.done = true;
                    metrics::record_upstream_error("stream");
                    tracing::warn!(
                        request_id = %this.request_id,
                        error = %err,
                        chunks = this.chunks,
                        bytes = this.bytes,
                        "Streaming error, ending relay"
                    );
                    return Poll::Ready(None);
                }
                None => {
                    this.done = true;
                    tracing::info!(
                        request_id = %this.request_id,
                        chunks = this.chunks,
                        bytes = this.bytes,
                        "Streaming response completed"
                    );
                    return Poll::Ready(None);
                }
            }
        }
    }
}

impl Drop for ChunkRelay {
    fn drop(&mut self) {
        if !self.done {
            tracing::debug!(
                request_id = %self.request_id,
                chunks = self.chunks,
                "Caller disconnected mid-stream, releasing upstream"
            );
        }
    }
}
