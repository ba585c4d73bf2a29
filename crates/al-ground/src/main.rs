//! airlink ground-side CLI
//!
//! Drives channel renegotiation against the air daemon from the ground
//! station. `renegotiate` runs the full handshake; `status` and `send` are
//! for inspection and debugging.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use al_ground::{AirClient, Outcome, RenegotiationDriver, Reply};
use al_core::config::{self, GroundConfig};
use al_core::{Bandwidth, FileStore, IwActuator, PingProbe};
use al_protocol::Channel;

#[derive(Parser)]
#[command(name = "al-ground")]
#[command(about = "airlink ground driver - channel renegotiation initiator")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Air daemon address (overrides config)
    #[arg(short, long)]
    peer: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Renegotiate the link onto a new channel
    Renegotiate {
        /// Target wireless channel
        channel: u32,

        /// Channel the link is currently on (read from the persist file
        /// when omitted)
        #[arg(long)]
        from: Option<u32>,
    },

    /// Query the air daemon's committed and pending channel
    Status,

    /// Send a raw command line and print the reply
    Send {
        /// Raw request line
        line: String,
    },
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

    // Load configuration
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config::default_config_dir().join("ground.toml"));

    let mut config = if config_path.exists() {
        config::load_config(&config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config from {:?}: {}", config_path, e);
            GroundConfig::default()
        })
    } else {
        GroundConfig::default()
    };

    if let Some(peer) = args.peer {
        config.peer_address = peer;
    }

    let client = AirClient::from_config(&config);

    match args.command {
        Commands::Renegotiate { channel, from } => {
            let target = Channel::new(channel)
                .with_context(|| format!("Invalid target channel {}", channel))?;
            let bandwidth = Bandwidth::from_mhz(config.bandwidth_mhz)
                .with_context(|| format!("Invalid bandwidth {} MHz", config.bandwidth_mhz))?;

            let mut store = FileStore::new(config.persist_path.clone(), config.persist_key.clone());
            if let Some(secondary) = &config.secondary_persist_path {
                store = store.with_secondary(secondary.clone());
            }

            let original = match from {
                Some(n) => {
                    Channel::new(n).with_context(|| format!("Invalid current channel {}", n))?
                }
                None => store.load().await.with_context(|| {
                    format!(
                        "Failed to read current channel from {:?} (use --from)",
                        config.persist_path
                    )
                })?,
            };

            let driver = RenegotiationDriver::new(
                client,
                Arc::new(IwActuator::new(config.interfaces.clone())),
                Arc::new(PingProbe::new(config.peer_host())),
                Arc::new(store),
                bandwidth,
                original,
                &config,
            );

            match driver.run(target).await? {
                Outcome::Committed { channel } => {
                    println!("Channel {} committed on both ends", channel);
                }
                Outcome::RejectedByPeer { reply } => {
                    anyhow::bail!("Air daemon rejected the change: {}", reply);
                }
                Outcome::RevertedUnreachable { original } => {
                    anyhow::bail!(
                        "Air endpoint unreachable on channel {}; reverted to {}",
                        target,
                        original
                    );
                }
            }
        }

        Commands::Status => match client.exchange(&al_protocol::Command::Status).await? {
            Reply::Line(line) => println!("{}", line),
            Reply::NoResponse => anyhow::bail!("Air daemon closed without a reply"),
        },

        Commands::Send { line } => match client.exchange_raw(&line).await? {
            Reply::Line(reply) => println!("{}", reply),
            Reply::NoResponse => anyhow::bail!("Air daemon closed without a reply"),
        },
    }

    Ok(())
}
