//! CORS development proxy library.
//!
//! Forwards `POST <prefix>/...` to a fixed upstream origin, relays the answer
//! (buffered or chunk-by-chunk), and adds permissive CORS headers to every
//! response so a browser app can call the upstream API directly.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod security;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use error::{ProxyError, StartupError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use upstream::{ReqwestUpstream, UpstreamClient};
