//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (deadline on the response head)
//!     → On expiry: UpstreamError::Timeout → 500 "Request failed: ..."
//! ```
//!
//! # Design Decisions
//! - Every upstream call has a deadline
//! - No retries: the forwarded method is POST and not idempotent

pub mod timeouts;

pub use timeouts::with_deadline;
