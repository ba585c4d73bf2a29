//! Ground-side driver configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::serde_utils::duration_secs;

/// Configuration for the ground-side renegotiation driver
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    /// Air daemon address (host:port)
    pub peer_address: String,

    /// Per-attempt connect timeout
    #[serde(with = "duration_secs")]
    pub connect_timeout: Duration,

    /// Bounded number of connect attempts before giving up
    pub connect_attempts: u32,

    /// Fixed delay between connect attempts
    #[serde(with = "duration_secs")]
    pub retry_delay: Duration,

    /// Deadline for reading the peer's response after sending a command
    #[serde(with = "duration_secs")]
    pub receive_timeout: Duration,

    /// Liveness probes issued after the local channel change
    pub probe_attempts: u32,

    /// Spacing between liveness probes
    #[serde(with = "duration_secs")]
    pub probe_interval: Duration,

    /// Local wireless interfaces retuned during renegotiation
    pub interfaces: Vec<String>,

    /// Channel width in MHz (10, 20, 40, or 80)
    pub bandwidth_mhz: u32,

    /// File the committed channel is persisted to
    pub persist_path: PathBuf,

    /// Key rewritten inside the persist file
    pub persist_key: String,

    /// Optional second persist file, updated best-effort when present
    pub secondary_persist_path: Option<PathBuf>,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            peer_address: "10.5.0.10:12355".to_string(),
            connect_timeout: Duration::from_secs(5),
            connect_attempts: 3,
            retry_delay: Duration::from_secs(1),
            receive_timeout: Duration::from_secs(5),
            probe_attempts: 10,
            probe_interval: Duration::from_secs(1),
            interfaces: vec!["wlan0".to_string()],
            bandwidth_mhz: 20,
            persist_path: PathBuf::from("/etc/wifibroadcast.cfg"),
            persist_key: "wifi_channel".to_string(),
            secondary_persist_path: Some(PathBuf::from("/config/gs.conf")),
        }
    }
}

impl GroundConfig {
    /// Peer host without the port, for liveness probing
    pub fn peer_host(&self) -> &str {
        self.peer_address
            .rsplit_once(':')
            .map(|(host, _)| host)
            .unwrap_or(&self.peer_address)
    }
}
