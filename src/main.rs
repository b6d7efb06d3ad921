//! CORS development proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────────┐
//!                  │                    CORS PROXY                         │
//!  Browser app     │  ┌─────────┐   ┌──────────┐   ┌──────────────────┐    │
//!  ────────────────┼─▶│   net   │──▶│   http   │──▶│     routing      │    │
//!                  │  │listener │   │  server  │   │ prefix → target  │    │
//!                  │  └─────────┘   └──────────┘   └────────┬─────────┘    │
//!                  │                                         ▼              │
//!                  │  ┌──────────┐   ┌──────────┐   ┌──────────────────┐   │
//!  ◀───────────────┼──│   CORS   │◀──│  relay   │◀──│ upstream client  │◀──┼── Upstream API
//!                  │  │middleware│   │buf/stream│   │ (reqwest, TLS)   │   │
//!                  │  └──────────┘   └──────────┘   └──────────────────┘   │
//!                  └──────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use cors_dev_proxy::config::{load_config, validate_config, ConfigError, ProxyConfig};
use cors_dev_proxy::lifecycle::{startup, Shutdown};
use cors_dev_proxy::net::Listener;
use cors_dev_proxy::observability::{self, metrics};
use cors_dev_proxy::{HttpServer, StartupError};

#[derive(Parser, Debug)]
#[command(name = "cors-dev-proxy")]
#[command(about = "Local proxy that adds CORS headers to a fixed upstream API", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:3001
    #[arg(short, long)]
    bind: Option<String>,

    /// Upstream origin, e.g. https://dashscope.aliyuncs.com
    #[arg(short, long)]
    upstream: Option<String>,

    /// Local path prefix mapped onto the upstream origin
    #[arg(short, long)]
    prefix: Option<String>,

    /// Skip TLS certificate verification toward the upstream (development only)
    #[arg(long)]
    insecure_skip_verify: bool,
}

impl Cli {
    fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ProxyConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(upstream) = self.upstream {
            config.upstream.origin = upstream;
        }
        if let Some(prefix) = self.prefix {
            config.upstream.path_prefix = prefix;
        }
        if self.insecure_skip_verify {
            config.upstream.insecure_skip_verify = true;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    observability::init_logging(&config.observability)?;
    tracing::info!("cors-dev-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr).map_err(|e| StartupError::Metrics(e.to_string()))?;
    }

    let server = HttpServer::new(config.clone())?;

    let listener = Listener::bind(&config.listener).await?;
    startup::announce(&config, listener.local_addr());

    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();
    let signal_task = shutdown.trigger_on_signal();

    server.run(listener.into_inner(), stop).await?;
    signal_task.abort();

    tracing::info!("Server stopped by user");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cors_dev_proxy::config::ValidationError;

    fn dev_config_path() -> String {
        format!("{}/config/dashscope.toml", env!("CARGO_MANIFEST_DIR"))
    }

    #[test]
    fn defaults_without_a_config_file() {
        let config = Cli::try_parse_from(["cors-dev-proxy"])
            .unwrap()
            .into_config()
            .unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:3001");
        assert!(!config.upstream.insecure_skip_verify);

        let config = Cli::try_parse_from(["cors-dev-proxy", "--insecure-skip-verify"])
            .unwrap()
            .into_config()
            .unwrap();
        assert!(config.upstream.insecure_skip_verify);
    }

    #[test]
    fn flags_override_the_file() {
        let path = dev_config_path();
        let config = Cli::try_parse_from([
            "cors-dev-proxy",
            "--config",
            path.as_str(),
            "--bind",
            "127.0.0.1:8080",
            "--upstream",
            "http://localhost:9000",
            "--prefix",
            "/api/local",
        ])
        .unwrap()
        .into_config()
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:8080");
        assert_eq!(config.upstream.origin, "http://localhost:9000");
        assert_eq!(config.upstream.path_prefix, "/api/local");
        // untouched by flags, so the file's value stands
        assert!(config.upstream.insecure_skip_verify);
        assert_eq!(config.streaming.trigger_header, "X-DashScope-SSE");
    }

    #[test]
    fn merged_config_is_validated() {
        let path = dev_config_path();
        let err = Cli::try_parse_from(["cors-dev-proxy", "-c", path.as_str(), "--prefix", "/x/"])
            .unwrap()
            .into_config()
            .unwrap_err();

        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors, vec![ValidationError::PathPrefix("/x/".into())]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_origin_flag_is_rejected() {
        let err = Cli::try_parse_from(["cors-dev-proxy", "--upstream", "dashscope.aliyuncs.com"])
            .unwrap()
            .into_config()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
