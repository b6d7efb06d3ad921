//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)          CLI overrides
//!     → loader.rs (parse)          │
//!     → ProxyConfig ◀──────────────┘
//!     → validation.rs (semantic checks, all errors at once)
//!     → handed to HttpServer, immutable afterwards
//! ```
//!
//! # Design Decisions
//! - All fields have defaults; an empty file reproduces the DashScope setup
//! - Validation separates syntactic (serde) from semantic checks
//! - Insecure TLS is an explicit field, never implied

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    CorsConfig, ListenerConfig, LogFormat, ObservabilityConfig, ProxyConfig, StreamingConfig,
    UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
