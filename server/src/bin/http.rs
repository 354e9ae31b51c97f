//! HTTP stub server: one fixed body for every request

use clap::Parser;
use ratestub_server::cli::HttpServerArgs;
use ratestub_server::server::serve_http;
use ratestub_server::telemetry;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = HttpServerArgs::parse();
    telemetry::init_tracing(args.common.log_level());

    let config = args.into_config()?;
    if let Some(addr) = config.metrics_addr {
        telemetry::install_metrics_exporter(addr)?;
    }

    let addr = config.listen.addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(
        "Http server started (listening: {}, content-type: {})",
        addr,
        config.body.content_type()
    );

    serve_http(listener, config.body).await?;
    Ok(())
}
