//! domo-service - background measurement simulator.
//!
//! Run with: `cargo run -p domo-service`

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use domo_service::{AppState, Config, Simulator};
use domo_store::Store;

/// domo-service - background measurement simulator over a shared SQLite store.
#[derive(Parser, Debug)]
#[command(name = "domo-service")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database path (overrides config).
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Simulation interval in seconds (overrides config).
    #[arg(short, long)]
    interval: Option<u64>,

    /// Actuation threshold (overrides config).
    #[arg(short, long)]
    threshold: Option<f64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("domo_service=info".parse()?)
                .add_directive("domo_store=info".parse()?),
        )
        .init();

    let args = Args::parse();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default().unwrap_or_default(),
    };

    // Override config with CLI args
    if let Some(database) = args.database {
        config.storage.path = database;
    }
    if let Some(interval) = args.interval {
        config.simulation.interval_secs = interval;
    }
    if let Some(threshold) = args.threshold {
        config.simulation.threshold = threshold;
    }
    config.validate()?;

    // Open the database
    info!("Opening database at {:?}", config.storage.path);
    let store = Store::open(&config.storage.path)?;

    // Create application state and start the simulator
    let state = AppState::new(store, config);
    let simulator = Simulator::new(Arc::clone(&state));
    let handle = simulator.start();

    // Run until interrupted, then let an in-flight tick finish
    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    state.simulator.request_stop();
    handle.await?;

    Ok(())
}
