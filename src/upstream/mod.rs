//! Upstream subsystem.
//!
//! # Data Flow
//! ```text
//! OutboundRequest
//!     → client.rs (UpstreamClient trait)
//!     → reqwest_client.rs (TLS, connect timeout, decompression)
//!     → UpstreamResponse { status, headers, body stream }
//!     → buffered: collect_body()   streaming: relay.rs (ChunkRelay)
//! ```
//!
//! # Design Decisions
//! - The handler depends on the trait only; tests plug in doubles
//! - The transport always returns a lazy body; buffering is the caller's call

pub mod client;
pub mod reqwest_client;
pub mod relay;

pub use client::{OutboundRequest, UpstreamBody, UpstreamClient, UpstreamError, UpstreamResponse};
pub use relay::{ChunkRelay, RelayOptions};
pub use reqwest_client::ReqwestUpstream;
