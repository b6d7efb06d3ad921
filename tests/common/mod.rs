//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, Request, Response, StatusCode};
use bytes::Bytes;
use futures_util::{stream, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower::ServiceExt;

use cors_dev_proxy::config::ProxyConfig;
use cors_dev_proxy::upstream::{OutboundRequest, UpstreamClient, UpstreamError, UpstreamResponse};
use cors_dev_proxy::HttpServer;

/// Defaults with the dashscope prefix, suitable for router-level tests.
pub fn test_config() -> ProxyConfig {
    ProxyConfig::default()
}

/// Drive a single request through the fully layered router, no socket involved.
pub async fn send(
    config: ProxyConfig,
    client: Arc<dyn UpstreamClient>,
    request: Request<Body>,
) -> Response<Body> {
    let server = HttpServer::with_client(config, client).unwrap();
    server.router().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
}

pub fn assert_cors(headers: &HeaderMap) {
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(
        headers["access-control-allow-methods"],
        "GET, POST, PUT, DELETE, OPTIONS"
    );
    assert_eq!(
        headers["access-control-allow-headers"],
        "Content-Type, Authorization, X-DashScope-SSE"
    );
    assert_eq!(headers["access-control-max-age"], "86400");
}

/// Upstream double that records every request and answers with a canned response.
pub struct RecordingUpstream {
    status: StatusCode,
    headers: HeaderMap,
    chunks: Vec<Bytes>,
    seen: Mutex<Vec<OutboundRequest>>,
}

impl RecordingUpstream {
    pub fn new(status: StatusCode, body: &'static str) -> Self {
        Self::with_chunks(status, vec![body])
    }

    pub fn with_chunks(status: StatusCode, chunks: Vec<&'static str>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            chunks: chunks
                .into_iter()
                .map(|c| Bytes::from_static(c.as_bytes()))
                .collect(),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.insert(name, HeaderValue::from_static(value));
        self
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamClient for RecordingUpstream {
    async fn send(&self, request: OutboundRequest) -> Result<UpstreamResponse, UpstreamError> {
        self.seen.lock().unwrap().push(request);
        Ok(UpstreamResponse {
            status: self.status,
            headers: self.headers.clone(),
            body: stream::iter(self.chunks.clone().into_iter().map(Ok)).boxed(),
        })
    }
}

/// Upstream double for requests that must be answered locally.
pub struct UnreachableUpstream;

#[async_trait]
impl UpstreamClient for UnreachableUpstream {
    async fn send(&self, request: OutboundRequest) -> Result<UpstreamResponse, UpstreamError> {
        panic!("upstream must not be contacted, got {}", request.url);
    }
}

/// Upstream double that fails every call at the transport level.
pub struct FailingUpstream(pub &'static str);

#[async_trait]
impl UpstreamClient for FailingUpstream {
    async fn send(&self, _request: OutboundRequest) -> Result<UpstreamResponse, UpstreamError> {
        Err(UpstreamError::Transport(self.0.to_string()))
    }
}

/// Upstream double that never produces a response head.
pub struct HangingUpstream;

#[async_trait]
impl UpstreamClient for HangingUpstream {
    async fn send(&self, _request: OutboundRequest) -> Result<UpstreamResponse, UpstreamError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(UpstreamError::Transport("unreachable".into()))
    }
}

/// Upstream double whose body is fed by the test through a channel.
pub struct ChannelUpstream {
    status: StatusCode,
    body: Mutex<Option<mpsc::Receiver<Result<Bytes, UpstreamError>>>>,
}

impl ChannelUpstream {
    pub fn new(status: StatusCode) -> (Self, mpsc::Sender<Result<Bytes, UpstreamError>>) {
        let (tx, rx) = mpsc::channel(16);
        let upstream = Self {
            status,
            body: Mutex::new(Some(rx)),
        };
        (upstream, tx)
    }
}

#[async_trait]
impl UpstreamClient for ChannelUpstream {
    async fn send(&self, _request: OutboundRequest) -> Result<UpstreamResponse, UpstreamError> {
        let rx = self
            .body
            .lock()
            .unwrap()
            .take()
            .expect("channel upstream used twice");
        let body = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })
        .boxed();

        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("text/event-stream"));
        Ok(UpstreamResponse {
            status: self.status,
            headers,
            body,
        })
    }
}

/// Start a raw TCP backend on an ephemeral port. Each connection gets
/// `parts` written in order with a short pause in between, and the raw
/// request (head and body) is sent back to the test.
pub async fn start_mock_backend(
    parts: Vec<&'static str>,
) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let tx = tx.clone();
            let parts = parts.clone();
            tokio::spawn(async move {
                let raw = read_request(&mut socket).await;
                let _ = tx.send(raw);
                for part in parts {
                    if socket.write_all(part.as_bytes()).await.is_err() {
                        return;
                    }
                    let _ = socket.flush().await;
                    tokio::time::sleep(Duration::from_millis(20)).await;
                }
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, rx)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return String::from_utf8_lossy(&buf).into_owned();
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_ascii_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    String::from_utf8_lossy(&buf).into_owned()
}

/// An address nothing is listening on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Plain HTTP client for talking to a running proxy.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
