//! Hardware actuator seam
//!
//! The renegotiation logic never talks to the radio directly; it goes
//! through [`HardwareActuator`] so tests can swap in a double and the
//! production path can shell out to `iw`.

use async_trait::async_trait;
use tokio::process::Command;

use al_protocol::Channel;

use crate::error::ActuatorError;
use crate::types::Bandwidth;

/// Applies a channel/width setting to the local radio hardware
#[async_trait]
pub trait HardwareActuator: Send + Sync {
    /// Tune every managed interface to the given channel.
    ///
    /// The change takes effect immediately; on a live link this may degrade
    /// or sever connectivity until both sides converge.
    async fn apply(&self, channel: Channel, bandwidth: Bandwidth) -> Result<(), ActuatorError>;
}

/// Production actuator driving `iw dev <if> set channel <n> [<width>]`
pub struct IwActuator {
    interfaces: Vec<String>,
}

impl IwActuator {
    /// Create an actuator managing the given interfaces
    pub fn new(interfaces: Vec<String>) -> Self {
        Self { interfaces }
    }

    /// Convenience constructor for a single interface
    pub fn single(interface: impl Into<String>) -> Self {
        Self {
            interfaces: vec![interface.into()],
        }
    }

    async fn set_channel(
        &self,
        interface: &str,
        channel: Channel,
        bandwidth: Bandwidth,
    ) -> Result<(), ActuatorError> {
        let mut cmd = Command::new("iw");
        cmd.args(["dev", interface, "set", "channel"])
            .arg(channel.to_string());
        let qualifier = bandwidth.qualifier();
        if !qualifier.is_empty() {
            cmd.arg(qualifier);
        }

        let rendered = format!(
            "iw dev {} set channel {}{}{}",
            interface,
            channel,
            if qualifier.is_empty() { "" } else { " " },
            qualifier
        );
        tracing::debug!("Applying channel: {}", rendered);

        let status = cmd.status().await.map_err(|e| ActuatorError::Spawn {
            command: rendered.clone(),
            source: e,
        })?;

        if !status.success() {
            return Err(ActuatorError::CommandFailed {
                command: rendered,
                status: status.code().unwrap_or(-1),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl HardwareActuator for IwActuator {
    async fn apply(&self, channel: Channel, bandwidth: Bandwidth) -> Result<(), ActuatorError> {
        for interface in &self.interfaces {
            self.set_channel(interface, channel, bandwidth).await?;
        }
        Ok(())
    }
}
