//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): every request by method, status and
//!   mode (`buffered`, `streaming`, or `local` for preflights, 404s and 501s)
//! - `proxy_request_duration_seconds` (histogram): time to response head
//! - `proxy_upstream_errors_total` (counter): transport failures by kind
//! - `proxy_stream_chunks_total` / `proxy_stream_bytes_total` (counters)
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, mode: &'static str, start: Instant) {
    ::metrics::counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "mode" => mode
    )
    .increment(1);
    ::metrics::histogram!(
        "proxy_request_duration_seconds",
        "method" => method.to_string(),
        "mode" => mode
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_error(kind: &'static str) {
    ::metrics::counter!("proxy_upstream_errors_total", "kind" => kind).increment(1);
}

pub fn record_stream_chunk(len: usize) {
    ::metrics::counter!("proxy_stream_chunks_total").increment(1);
    ::metrics::counter!("proxy_stream_bytes_total").increment(len as u64);
}
