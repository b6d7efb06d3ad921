//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request URI (path + query)
//!     → router.rs (UpstreamRoute::target_url)
//!     → matcher.rs (prefix check on the path, strip once)
//!     → Return: absolute upstream URL or NoMatch (404)
//! ```
//!
//! # Design Decisions
//! - One fixed upstream per process; no host-based or arbitrary-target routing
//! - Deterministic: same input always yields the same URL
//! - The proxy never re-encodes or normalises the caller's path

pub mod matcher;
pub mod router;

pub use matcher::PathPrefixMatcher;
pub use router::UpstreamRoute;
