//! Logging and metrics setup for the server binaries

use crate::config::LogLevel;
use crate::error::StubError;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init_tracing(level: LogLevel) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.directive().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Serve Prometheus metrics on `addr`. Must run inside the tokio runtime.
pub fn install_metrics_exporter(addr: SocketAddr) -> Result<(), StubError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| StubError::Metrics(e.to_string()))?;
    info!("Prometheus metrics on http://{}/metrics", addr);
    Ok(())
}
