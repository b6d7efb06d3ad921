//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Bind listener → Announce → Serve
//!
//! Shutdown (shutdown.rs + signals.rs):
//!     SIGINT/SIGTERM → broadcast → stop accepting → drain in-flight → exit 0
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and exits non-zero
//! - Listener binds last, after every fallible setup step

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
