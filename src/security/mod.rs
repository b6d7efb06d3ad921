//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request headers
//!     → headers.rs (drop host/origin/referer/content-length)
//!     → forwarded upstream
//!
//! Upstream response headers
//!     → headers.rs (drop CORS origin and transfer framing)
//!     → CORS middleware adds the proxy's own values
//! ```
//!
//! # Design Decisions
//! - Fixed denylists, never allowlists: provider-specific headers pass as-is
//! - Matching is case-insensitive on names; values are never touched

pub mod headers;

pub use headers::{filter_request_headers, filter_response_headers};
