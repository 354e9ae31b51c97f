//! Command-line arguments shared by the three server binaries

use crate::config::{HttpServerConfig, ListenConfig, LogLevel, PacedServerConfig, ResponseBody};
use crate::error::StubError;
use crate::load::LoadOptions;
use crate::session::DEFAULT_MAX_SESSIONS;
use clap::{Args, Parser};
use std::net::SocketAddr;

/// Flags every server accepts
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Host to listen on
    #[arg(long, env = "RATESTUB_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "RATESTUB_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Log level: DEBUG, INFO, WARNING or ERROR (RUST_LOG overrides it)
    #[arg(long, env = "RATESTUB_LOGLEVEL", default_value = "INFO")]
    pub loglevel: String,

    /// Expose Prometheus metrics on this address
    #[arg(long, env = "RATESTUB_METRICS_ADDR")]
    pub metrics_addr: Option<SocketAddr>,
}

impl CommonArgs {
    pub fn log_level(&self) -> LogLevel {
        LogLevel::from_name(&self.loglevel)
    }

    fn listen(&self) -> ListenConfig {
        ListenConfig {
            host: self.host.clone(),
            port: self.port,
        }
    }
}

/// Stream a fixed count of numbered messages to every connection at a
/// steady rate, then wait for the peer to disconnect.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct PacedServerArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Messages generated for every connection
    #[arg(
        long,
        env = "RATESTUB_COUNT",
        default_value_t = 3000,
        allow_negative_numbers = true
    )]
    pub count: i64,

    /// Seconds over which each connection's messages are spread
    #[arg(
        long,
        env = "RATESTUB_COST",
        default_value_t = 60,
        allow_negative_numbers = true
    )]
    pub cost: i64,

    /// Concurrent sessions admitted before new ones wait
    #[arg(long, env = "RATESTUB_MAX_SESSIONS", default_value_t = DEFAULT_MAX_SESSIONS)]
    pub max_sessions: usize,
}

impl PacedServerArgs {
    pub fn into_config(self) -> Result<PacedServerConfig, StubError> {
        let config = PacedServerConfig {
            listen: self.common.listen(),
            load: LoadOptions::new(self.count, self.cost)?,
            max_sessions: self.max_sessions,
            metrics_addr: self.common.metrics_addr,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Answer every HTTP request with one fixed body.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct HttpServerArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// JSON response body (served as application/json)
    #[arg(long, env = "RATESTUB_JSON")]
    pub json: Option<String>,

    /// Plain-text response body, used when --json is not given
    #[arg(long, env = "RATESTUB_TEXT", default_value = "")]
    pub text: String,
}

impl HttpServerArgs {
    pub fn into_config(self) -> Result<HttpServerConfig, StubError> {
        Ok(HttpServerConfig {
            listen: self.common.listen(),
            body: ResponseBody::from_flags(self.json, self.text)?,
            metrics_addr: self.common.metrics_addr,
        })
    }
}
