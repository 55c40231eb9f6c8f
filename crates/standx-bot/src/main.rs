//! StandX maker bot - entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Unattended market maker for a single StandX perpetual instrument.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via STANDX_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    standx_telemetry::init_logging()?;

    info!("Starting StandX Maker Bot v{}", env!("CARGO_PKG_VERSION"));

    // Config path: CLI arg > STANDX_CONFIG env var > default
    let config = standx_bot::AppConfig::load(args.config.as_deref())?;
    info!(
        symbol = %config.maker.symbol,
        base_url = %config.base_url,
        "Configuration loaded"
    );

    let secrets = standx_bot::Secrets::from_env()?;

    let app = standx_bot::Application::new(config, secrets).await?;
    app.run().await?;

    Ok(())
}
