//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all handler)
//!     → request.rs (request ID, streaming trigger)
//!     → [routing decides target URL]
//!     → [upstream client sends]
//!     → response.rs (filter headers, buffered or chunked body)
//!     → middleware/cors.rs (CORS headers on everything)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, RequestIdExt, RequestIdLayer, StreamTrigger};
pub use server::{AppState, HttpServer};
