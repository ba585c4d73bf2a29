//! Peer liveness probing seam

use async_trait::async_trait;
use tokio::process::Command;

/// A single bounded-latency reachability check against the peer
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// True if the peer answered within the probe's own deadline
    async fn is_reachable(&self) -> bool;
}

/// ICMP echo probe via the system `ping` binary (`ping -c1 -W1 <host>`)
pub struct PingProbe {
    host: String,
}

impl PingProbe {
    /// Create a probe targeting the given host
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }
}

#[async_trait]
impl LivenessProbe for PingProbe {
    async fn is_reachable(&self) -> bool {
        match Command::new("ping")
            .args(["-c1", "-W1", &self.host])
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .await
        {
            Ok(status) => status.success(),
            Err(e) => {
                tracing::warn!("Failed to spawn ping: {}", e);
                false
            }
        }
    }
}
