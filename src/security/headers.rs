//! Header denylists applied in both directions.
//!
//! Outbound: connection-identifying headers are dropped so the upstream sees
//! the proxy's own host and a content length computed from the real body.
//! Inbound: the upstream's CORS origin and transfer framing are dropped so the
//! relay's own values take effect.

use axum::http::HeaderMap;

/// Caller headers never forwarded upstream.
pub const REQUEST_HEADER_DENYLIST: &[&str] = &["host", "origin", "referer", "content-length"];

/// Upstream headers never relayed to the caller.
pub const RESPONSE_HEADER_DENYLIST: &[&str] = &[
    "access-control-allow-origin",
    "content-encoding",
    "transfer-encoding",
];

pub fn filter_request_headers(headers: &HeaderMap) -> HeaderMap {
    filter(headers, REQUEST_HEADER_DENYLIST)
}

pub fn filter_response_headers(headers: &HeaderMap) -> HeaderMap {
    filter(headers, RESPONSE_HEADER_DENYLIST)
}

fn is_denied(name: &str, denylist: &[&str]) -> bool {
    denylist.iter().any(|denied| name.eq_ignore_ascii_case(denied))
}

/// Copy every header not on the denylist, keeping repeated values in order.
fn filter(headers: &HeaderMap, denylist: &[&str]) -> HeaderMap {
    let mut filtered = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if !is_denied(name.as_str(), denylist) {
            filtered.append(name.clone(), value.clone());
        }
    }
    filtered
}
