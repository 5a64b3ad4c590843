//! Over/Under Hedging Bot - Entry Point

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Unattended over/under hedging bot
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via OUHEDGE_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    ouhedge_bot::logging::init_logging();

    info!("Starting ouhedge-bot v{}", env!("CARGO_PKG_VERSION"));

    // An explicit CLI path must exist; otherwise OUHEDGE_CONFIG / the
    // default path are tried with a fallback to built-in defaults.
    let config = match args.config {
        Some(path) => {
            info!(config_path = %path, "Loading configuration");
            ouhedge_bot::AppConfig::from_file(&path)?
        }
        None => ouhedge_bot::AppConfig::load()?,
    };
    info!(
        tick_secs = config.schedule.tick_secs,
        betting_url = %config.exchange.betting_url,
        "Configuration loaded"
    );

    let mut app = ouhedge_bot::Application::new(config)?;
    app.run().await?;

    Ok(())
}
