//! Air-side daemon configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::serde_utils::duration_secs;

/// Configuration for the air-side command daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AirConfig {
    /// Address to bind the command server to
    pub bind_address: String,

    /// Wireless interface driven by the actuator
    pub interface: String,

    /// Channel width in MHz (10, 20, 40, or 80)
    pub bandwidth_mhz: u32,

    /// Channel committed at startup, before any renegotiation
    pub initial_channel: u32,

    /// How long an unconfirmed proposal stays live before the watchdog
    /// reverts it
    #[serde(with = "duration_secs")]
    pub confirmation_window: Duration,

    /// Watchdog polling cadence; must be shorter than the window
    #[serde(with = "duration_secs")]
    pub watchdog_cadence: Duration,

    /// Deadline for reading the single request line of a connection
    #[serde(with = "duration_secs")]
    pub read_timeout: Duration,

    /// Maximum connections handled concurrently
    pub max_inflight: usize,

    /// File the committed channel is persisted to
    pub persist_path: PathBuf,

    /// Key rewritten inside the persist file
    pub persist_key: String,
}

impl Default for AirConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:12355".to_string(),
            interface: "wlan0".to_string(),
            bandwidth_mhz: 20,
            initial_channel: 165,
            confirmation_window: Duration::from_secs(15),
            watchdog_cadence: Duration::from_secs(1),
            read_timeout: Duration::from_secs(5),
            max_inflight: 32,
            persist_path: PathBuf::from("/etc/wfb.yaml"),
            persist_key: "channel".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let config = AirConfig::default();
        assert!(config.watchdog_cadence < config.confirmation_window);
        assert!(config.bind_address.ends_with(":12355"));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AirConfig = toml::from_str(
            r#"
            interface = "wlan1"
            confirmation_window = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.interface, "wlan1");
        assert_eq!(config.confirmation_window, Duration::from_secs(30));
        assert_eq!(config.bandwidth_mhz, 20);
    }
}
