//! HTTP server setup and the forwarding handler.
//!
//! # Responsibilities
//! - Create the Axum Router with the single catch-all handler
//! - Wire up middleware (request ID, tracing, CORS)
//! - Answer preflights locally
//! - Forward `POST <prefix>/...` to the upstream and relay the answer
//!
//! # Per-request states
//! ```text
//! RECEIVED ─┬─ OPTIONS ───────────────────────────────▶ PREFLIGHT_OK
//!           ├─ path outside prefix ───────────────────▶ NOT_FOUND (404)
//!           ├─ method other than POST ────────────────▶ NOT_IMPLEMENTED (501)
//!           └─ FORWARDING ─┬─ upstream error ─────────▶ ERROR_RESPONSE (500)
//!                          └─ RELAYING ─ buffered | chunk loop ─▶ DONE
//! ```

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::config::ProxyConfig;
use crate::error::{ProxyError, StartupError};
use crate::http::middleware::{apply_cors, CorsHeaders};
use crate::http::request::{RequestId, RequestIdExt, RequestIdLayer, StreamTrigger};
use crate::http::response;
use crate::observability::metrics;
use crate::resilience::with_deadline;
use crate::routing::UpstreamRoute;
use crate::security::filter_request_headers;
use crate::upstream::{OutboundRequest, RelayOptions, ReqwestUpstream, UpstreamClient};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub route: Arc<UpstreamRoute>,
    pub client: Arc<dyn UpstreamClient>,
    pub trigger: Arc<StreamTrigger>,
    pub relay: RelayOptions,
    pub upstream_timeout: Duration,
    pub max_body_bytes: usize,
}

/// HTTP server for the CORS proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a server that talks to the upstream through reqwest.
    pub fn new(config: ProxyConfig) -> Result<Self, StartupError> {
        let client = ReqwestUpstream::from_config(&config.upstream)?;
        Self::with_client(config, Arc::new(client))
    }

    /// Create a server around any [`UpstreamClient`].
    pub fn with_client(
        config: ProxyConfig,
        client: Arc<dyn UpstreamClient>,
    ) -> Result<Self, StartupError> {
        let state = AppState {
            route: Arc::new(UpstreamRoute::from_config(&config.upstream)),
            client,
            trigger: Arc::new(StreamTrigger::from_config(&config.streaming)?),
            relay: RelayOptions {
                chunk_size: config.streaming.chunk_size,
                log_previews: config.streaming.log_chunk_previews,
            },
            upstream_timeout: Duration::from_secs(config.upstream.timeout_secs),
            max_body_bytes: config.listener.max_body_bytes,
        };
        let cors = Arc::new(CorsHeaders::from_config(&config.cors)?);

        let router = Self::build_router(state, cors);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState, cors: Arc<CorsHeaders>) -> Router {
        Router::new()
            .route("/", any(proxy_handler))
            .route("/{*path}", any(proxy_handler))
            .with_state(state)
            .layer(middleware::map_response_with_state(cors, apply_cors))
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(RequestIdLayer)
    }

    /// The fully layered router, e.g. for driving it without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve connections from `listener` until `shutdown` fires, then give
    /// in-flight requests `listener.shutdown_grace_secs` to finish. Requests
    /// still running after that (typically open streams) are abandoned.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let grace = Duration::from_secs(self.config.listener.shutdown_grace_secs);
        tracing::info!(address = %addr, "HTTP server starting");

        let (draining_tx, draining_rx) = oneshot::channel();
        let serve = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
                let _ = draining_tx.send(());
            })
            .into_future();

        let grace_expired = async move {
            if draining_rx.await.is_err() {
                std::future::pending::<()>().await;
            }
            tokio::time::sleep(grace).await;
        };

        tokio::select! {
            result = serve => result?,
            _ = grace_expired => {
                tracing::warn!(grace = ?grace, "Requests still in flight, stopping anyway");
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn request_span(request: &Request<Body>) -> Span {
    let request_id = request.request_id().unwrap_or_default();
    tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
    )
}

/// Single entry point for every method and path.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();

    let (response, mode) = dispatch(&state, request).await;

    metrics::record_request(method.as_str(), response.status().as_u16(), mode, start);
    response
}

/// Answer locally or forward; the second value is the relay mode label.
async fn dispatch(state: &AppState, request: Request<Body>) -> (Response, &'static str) {
    let request_id = request.request_id().unwrap_or_default();
    let method = request.method();

    if method == Method::OPTIONS {
        tracing::debug!(request_id = %request_id, path = %request.uri().path(), "Preflight");
        return (StatusCode::OK.into_response(), "local");
    }

    let Some(target) = state.route.target_url(request.uri()) else {
        let err = ProxyError::RouteNotFound(request.uri().path().to_string());
        return (err.into_response(), "local");
    };
    if method != Method::POST {
        let err = ProxyError::MethodNotImplemented(method.to_string());
        return (err.into_response(), "local");
    }

    let streaming = state.trigger.is_streaming(request.headers());
    let mode = if streaming { "streaming" } else { "buffered" };
    tracing::info!(request_id = %request_id, target = %target, mode, "Proxying POST");

    let response = forward(state, request, target, streaming, request_id)
        .await
        .unwrap_or_else(|err| err.into_response());
    (response, mode)
}

async fn forward(
    state: &AppState,
    request: Request<Body>,
    url: String,
    streaming: bool,
    request_id: RequestId,
) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, state.max_body_bytes)
        .await
        .map_err(|e| ProxyError::Internal(format!("failed to read request body: {e}")))?;

    let outbound = OutboundRequest {
        url,
        headers: filter_request_headers(&parts.headers),
        body,
        streaming,
    };
    let upstream = with_deadline(state.upstream_timeout, state.client.send(outbound)).await?;
    let status = upstream.status;
    tracing::info!(request_id = %request_id, status = %status, "Upstream responded");

    if streaming {
        return Ok(response::relay_streaming(upstream, state.relay, request_id));
    }

    match with_deadline(state.upstream_timeout, upstream.collect_body()).await {
        Ok((status, headers, body)) => Ok(response::relay_buffered(status, &headers, body)),
        Err(err) if status.is_success() => Err(err.into()),
        Err(err) => {
            tracing::warn!(
                request_id = %request_id,
                status = %status,
                error = %err,
                "Upstream error body unreadable"
            );
            Err(ProxyError::UpstreamStatus(status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use ::metrics::{
        Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
    };
    use async_trait::async_trait;
    use tower::ServiceExt;

    use crate::upstream::{UpstreamError, UpstreamResponse};

    struct NoUpstream;

    #[async_trait]
    impl UpstreamClient for NoUpstream {
        async fn send(&self, request: OutboundRequest) -> Result<UpstreamResponse, UpstreamError> {
            panic!("unexpected upstream call to {}", request.url);
        }
    }

    /// Keeps the label set of every `proxy_requests_total` increment.
    #[derive(Default)]
    struct RequestCounter {
        seen: Mutex<Vec<String>>,
    }

    impl Recorder for RequestCounter {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
            if key.name() == "proxy_requests_total" {
                let labels: Vec<String> = key
                    .labels()
                    .map(|label| format!("{}={}", label.key(), label.value()))
                    .collect();
                self.seen.lock().unwrap().push(labels.join(","));
            }
            Counter::noop()
        }

        fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::noop()
        }

        fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::noop()
        }
    }

    #[tokio::test]
    async fn locally_answered_requests_are_counted() {
        let recorder = RequestCounter::default();
        let _guard = ::metrics::set_default_local_recorder(&recorder);
        let server = HttpServer::with_client(ProxyConfig::default(), Arc::new(NoUpstream)).unwrap();

        for (method, path) in [
            (Method::OPTIONS, "/api/dashscope/v1"),
            (Method::GET, "/elsewhere"),
            (Method::GET, "/api/dashscope/v1"),
        ] {
            let request = Request::builder()
                .method(method)
                .uri(path)
                .body(Body::empty())
                .unwrap();
            server.router().oneshot(request).await.unwrap();
        }

        assert_eq!(
            *recorder.seen.lock().unwrap(),
            vec![
                "method=OPTIONS,status=200,mode=local",
                "method=GET,status=404,mode=local",
                "method=GET,status=501,mode=local",
            ]
        );
    }
}
