mod routes;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use unical_core::config::UnicalConfig;

use crate::state::AppState;

/// Serve course lecture timetables as subscribable calendars
#[derive(Parser)]
#[command(name = "unical-server", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = UnicalConfig::load(args.config.as_deref())?;

    let state = AppState::from_config(&config)?;

    let addr: SocketAddr = config
        .server
        .address
        .parse()
        .with_context(|| format!("Invalid server address '{}'", config.server.address))?;

    info!(%addr, "unical-server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, routes::app(state)).await?;

    Ok(())
}
