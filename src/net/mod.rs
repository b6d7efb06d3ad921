//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! listener.rs (bind) → HttpServer::run (axum accept loop)
//!     → one task per connection, no shared mutable state
//! ```

pub mod listener;

pub use listener::{Listener, ListenerError};
