//! Renegotiation handshake driver
//!
//! Runs the ground half of a channel change as a strict sequence:
//!
//! 1. Propose the channel to the air daemon over the current channel.
//! 2. Retune the local radios to the new channel.
//! 3. Probe the air endpoint until it answers on the new channel.
//! 4. Confirm over the new channel, freezing the change on the air side.
//! 5. Persist the committed channel locally.
//!
//! If the probe never succeeds the driver retunes the local radios back to
//! the original channel and stops. No confirmation is sent in that case;
//! the air side's own watchdog reverts the tentative change, and both ends
//! converge on the original channel.

use std::sync::Arc;
use std::time::Duration;

use al_core::config::GroundConfig;
use al_core::{AlError, Bandwidth, ConfigStore, HardwareActuator, LivenessProbe};
use al_protocol::{reply_indicates_failure, Channel, Command};

use crate::client::{AirClient, Reply};

/// Terminal result of one renegotiation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Both ends are on the new channel and it has been confirmed
    Committed { channel: Channel },
    /// The air daemon rejected the proposal; nothing was changed anywhere
    RejectedByPeer { reply: String },
    /// The air endpoint never answered on the new channel; local radios
    /// were retuned back to the original channel
    RevertedUnreachable { original: Channel },
}

/// Drives one renegotiation handshake against the air daemon
pub struct RenegotiationDriver {
    client: AirClient,
    actuator: Arc<dyn HardwareActuator>,
    probe: Arc<dyn LivenessProbe>,
    store: Arc<dyn ConfigStore>,
    bandwidth: Bandwidth,
    original_channel: Channel,
    probe_attempts: u32,
    probe_interval: Duration,
}

impl RenegotiationDriver {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        client: AirClient,
        actuator: Arc<dyn HardwareActuator>,
        probe: Arc<dyn LivenessProbe>,
        store: Arc<dyn ConfigStore>,
        bandwidth: Bandwidth,
        original_channel: Channel,
        config: &GroundConfig,
    ) -> Self {
        Self {
            client,
            actuator,
            probe,
            store,
            bandwidth,
            original_channel,
            probe_attempts: config.probe_attempts,
            probe_interval: config.probe_interval,
        }
    }

    /// Run the full handshake for one target channel.
    ///
    /// Transport failures while proposing abort before any hardware is
    /// touched, on either end.
    pub async fn run(&self, channel: Channel) -> Result<Outcome, AlError> {
        tracing::info!(
            "Renegotiating from channel {} to {}",
            self.original_channel,
            channel
        );

        match self.client.exchange(&Command::ProposeChannel(channel)).await? {
            Reply::Line(line) if reply_indicates_failure(&line) => {
                tracing::warn!("Proposal rejected: {}", line);
                return Ok(Outcome::RejectedByPeer { reply: line });
            }
            Reply::Line(line) => {
                tracing::info!("Proposal accepted: {}", line);
            }
            Reply::NoResponse => {
                // The air side may already have retuned before its reply
                // could be flushed. Proceed and let the probe settle it.
                tracing::warn!("No response to proposal; proceeding to probe");
            }
        }

        self.actuator.apply(channel, self.bandwidth).await?;
        tracing::info!("Local radios tuned to channel {}", channel);

        if !self.probe_peer().await {
            tracing::warn!(
                "Air endpoint unreachable on channel {}; reverting to {}",
                channel,
                self.original_channel
            );
            self.actuator
                .apply(self.original_channel, self.bandwidth)
                .await?;
            return Ok(Outcome::RevertedUnreachable {
                original: self.original_channel,
            });
        }

        match self.client.exchange(&Command::ConfirmChannel).await {
            Ok(Reply::Line(line)) => {
                tracing::info!("Confirmed: {}", line);
            }
            Ok(Reply::NoResponse) => {
                tracing::warn!("No response to confirmation");
            }
            Err(e) => {
                // The link just passed its probes, so a failed confirm
                // means the air side will revert and the channels diverge.
                // Retune back to stay reachable.
                tracing::error!("Confirmation failed: {}; reverting to {}", e, self.original_channel);
                self.actuator
                    .apply(self.original_channel, self.bandwidth)
                    .await?;
                return Ok(Outcome::RevertedUnreachable {
                    original: self.original_channel,
                });
            }
        }

        if let Err(e) = self.store.persist(channel).await {
            // The link is already committed on both ends; a persistence
            // failure costs durability across reboot, not the session.
            tracing::error!("Failed to persist channel {}: {}", channel, e);
        }

        tracing::info!("Channel {} committed", channel);
        Ok(Outcome::Committed { channel })
    }

    async fn probe_peer(&self) -> bool {
        for attempt in 1..=self.probe_attempts {
            if self.probe.is_reachable().await {
                tracing::info!("Air endpoint reachable (probe {} succeeded)", attempt);
                return true;
            }
            tracing::debug!("Probe {}/{} failed", attempt, self.probe_attempts);
            if attempt < self.probe_attempts {
                tokio::time::sleep(self.probe_interval).await;
            }
        }
        false
    }
}
