//! WebSocket stub server: streams numbered text frames to every connection

use clap::Parser;
use ratestub_server::cli::PacedServerArgs;
use ratestub_server::server::{Flavor, run_paced_server};
use ratestub_server::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = PacedServerArgs::parse();
    telemetry::init_tracing(args.common.log_level());

    let config = args.into_config()?;
    if let Some(addr) = config.metrics_addr {
        telemetry::install_metrics_exporter(addr)?;
    }

    run_paced_server(Flavor::WebSocket, config).await?;
    Ok(())
}
