//! airlink air-side daemon
//!
//! Listens for channel renegotiation commands from the ground station,
//! applies proposals tentatively, and reverts them unless the ground
//! confirms over the new channel within the confirmation window.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use al_air::{startup_channel, AirState, CommandServer, PendingCoordinator, RevertWatchdog};
use al_core::config::{self, AirConfig};
use al_core::{Bandwidth, FileStore, IwActuator};
use al_protocol::Channel;

#[derive(Parser)]
#[command(name = "al-air")]
#[command(about = "airlink air daemon - channel renegotiation endpoint")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind the command server to (overrides config)
    #[arg(short, long)]
    bind: Option<String>,

    /// Wireless interface to drive (overrides config)
    #[arg(short, long)]
    interface: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| args.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("airlink air daemon starting...");

    // Load configuration
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config::default_config_dir().join("air.toml"));

    let mut config = if config_path.exists() {
        config::load_config(&config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config from {:?}: {}", config_path, e);
            AirConfig::default()
        })
    } else {
        AirConfig::default()
    };

    // Apply command-line overrides
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }
    if let Some(interface) = args.interface {
        config.interface = interface;
    }

    let fallback_channel = Channel::new(config.initial_channel)
        .with_context(|| format!("Invalid initial channel {}", config.initial_channel))?;
    let bandwidth = Bandwidth::from_mhz(config.bandwidth_mhz)
        .with_context(|| format!("Invalid bandwidth {} MHz", config.bandwidth_mhz))?;

    let actuator = Arc::new(IwActuator::single(config.interface.clone()));
    let store = FileStore::new(config.persist_path.clone(), config.persist_key.clone());

    // A channel committed before a restart wins over the configured seed
    let committed = startup_channel(&store, fallback_channel).await;

    tracing::info!(
        "Starting on channel {} ({}), interface {}",
        committed,
        bandwidth,
        config.interface
    );

    let coordinator = Arc::new(PendingCoordinator::new(
        committed,
        bandwidth,
        config.confirmation_window,
        actuator,
        Arc::new(store),
    ));

    let cancel = CancellationToken::new();

    let watchdog = RevertWatchdog::new(config.watchdog_cadence);
    let watchdog_handle = watchdog.spawn(Arc::clone(&coordinator), cancel.clone());

    // Cancel everything on ctrl-c or SIGTERM
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received ctrl-c, shutting down");
            }
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, shutting down");
            }
        }
        signal_cancel.cancel();
    });

    let bind_address = config.bind_address.clone();
    let state = Arc::new(AirState::new(config, coordinator));
    let server = CommandServer::new(state, cancel.clone());

    server.run(&bind_address).await?;

    cancel.cancel();
    let _ = watchdog_handle.await;

    tracing::info!("airlink air daemon stopped");
    Ok(())
}
