//! TCP listener setup.
//!
//! # Responsibilities
//! - Parse and bind the configured address
//! - Report bind failures (port in use, permission) as a distinct error

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("Invalid bind address '{address}': {source}")]
    Address {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// The proxy's listening socket. Owned by the server; connections are
/// handed to independent tasks by axum.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Bind to the configured address.
    pub async fn bind(config: &ListenerConfig) -> Result<Self, ListenerError> {
        let address: SocketAddr = config.bind_address.parse().map_err(|source| {
            ListenerError::Address {
                address: config.bind_address.clone(),
                source,
            }
        })?;

        let inner = TcpListener::bind(address)
            .await
            .map_err(|source| ListenerError::Bind { address, source })?;
        let local_addr = inner
            .local_addr()
            .map_err(|source| ListenerError::Bind { address, source })?;

        tracing::info!(address = %local_addr, "Listener bound");

        Ok(Self { inner, local_addr })
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn into_inner(self) -> TcpListener {
        self.inner
    }
}
