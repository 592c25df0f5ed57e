//! netdd daemon entry point.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use netdd::config;
use netdd::lifecycle::{signals, Shutdown, Supervisor};

#[derive(Parser)]
#[command(name = "netdd")]
#[command(about = "Expose local devices as raw TCP write targets", long_about = None)]
struct Cli {
    /// Config file: one `<port> <dd parameters>` record per line.
    #[arg(short, long)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "netdd=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    tracing::info!(config = %cli.config.display(), "netdd starting");

    let records = config::load_config(&cli.config)?;
    if records.is_empty() {
        tracing::warn!("no active config records, quitting immediately");
        return Ok(());
    }
    tracing::info!(records = records.len(), "configuration loaded");

    let shutdown = Shutdown::new();

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        signal_shutdown.trigger();
    });

    let mut supervisor = Supervisor::new(shutdown);
    supervisor.spawn_listeners(records);
    supervisor.join_all().await;

    tracing::info!("shutdown complete");
    Ok(())
}
