//! bidx auction engine - entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Auction bid-acceptance and lifecycle engine
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via BIDX_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    bidx_telemetry::init_logging()?;

    info!("Starting bidx v{}", env!("CARGO_PKG_VERSION"));

    let config = bidx_app::AppConfig::load(args.config)?;
    info!(
        mode = ?config.mode,
        data_dir = %config.journal.data_dir,
        "Configuration loaded"
    );

    let app = bidx_app::Application::new(config)?;
    app.run().await?;

    Ok(())
}
