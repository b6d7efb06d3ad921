//! `reqwest`-backed upstream transport.

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt};

use crate::config::UpstreamConfig;
use crate::upstream::client::{OutboundRequest, UpstreamClient, UpstreamError, UpstreamResponse};

/// Production transport. Compressed bodies are decoded before they reach the
/// relay, which is why `content-encoding` is never passed on.
#[derive(Debug, Clone)]
pub struct ReqwestUpstream {
    client: reqwest::Client,
}

impl ReqwestUpstream {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .danger_accept_invalid_certs(config.insecure_skip_verify)
            .danger_accept_invalid_hostnames(config.insecure_skip_verify);

        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl UpstreamClient for ReqwestUpstream {
    async fn send(&self, request: OutboundRequest) -> Result<UpstreamResponse, UpstreamError> {
        let response = self
            .client
            .post(&request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes_stream().map_err(UpstreamError::from).boxed();

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        UpstreamError::Transport(error_chain(&err))
    }
}

/// reqwest's top-level message hides the interesting part ("connection
/// refused", certificate errors) in the source chain.
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
