//! Startup reporting.
//!
//! Tells the developer where to point their frontend and whether TLS
//! verification toward the upstream is off.

use std::net::SocketAddr;

use crate::config::ProxyConfig;

/// Address a local browser should use to reach `bound`.
pub fn local_base_url(bound: SocketAddr) -> String {
    if bound.ip().is_unspecified() {
        format!("http://localhost:{}", bound.port())
    } else {
        format!("http://{bound}")
    }
}

pub fn announce(config: &ProxyConfig, bound: SocketAddr) {
    let base = local_base_url(bound);
    tracing::info!(
        address = %bound,
        upstream = %config.upstream.origin,
        "CORS proxy running on {base}"
    );
    tracing::info!(
        "Use {base}{prefix}/... instead of {origin}/...",
        prefix = config.upstream.path_prefix,
        origin = config.upstream.origin,
    );
    if config.upstream.insecure_skip_verify {
        tracing::warn!(
            "TLS certificate verification toward the upstream is disabled (development only)"
        );
    }
}
