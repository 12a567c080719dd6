//! Binary serving the weather read API.

use anyhow::Context;
use clap::Parser;
use std::{net::SocketAddr, path::PathBuf};
use weather_api::{AppState, routes};
use weather_core::Config;

#[derive(Debug, Parser)]
#[command(name = "weather-api", version, about = "Weather read API")]
struct Args {
    /// Read configuration from this file instead of the platform config directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured listen address, e.g. 0.0.0.0:8000.
    #[arg(long)]
    bind: Option<String>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    weather_core::logging::init(args.verbose);

    let config = Config::resolve(args.config.as_deref())?;
    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    let addr: SocketAddr =
        bind.parse().with_context(|| format!("Invalid bind address: {bind}"))?;

    tracing::info!(%addr, snapshot = %config.snapshot_path().display(), "starting weather API");
    warp::serve(routes(AppState::from_config(&config))).run(addr).await;

    Ok(())
}
