//! Global air daemon state

use std::sync::Arc;

use al_core::config::AirConfig;
use al_core::FileStore;
use al_protocol::Channel;

use crate::coordinator::PendingCoordinator;

/// State shared by the command server and the watchdog
pub struct AirState {
    /// Configuration
    pub config: AirConfig,
    /// Pending change coordinator
    pub coordinator: Arc<PendingCoordinator>,
}

impl AirState {
    /// Create new air state
    pub fn new(config: AirConfig, coordinator: Arc<PendingCoordinator>) -> Self {
        Self {
            config,
            coordinator,
        }
    }
}

/// Channel the daemon treats as committed at startup.
///
/// A previously persisted value wins, so a confirmed change survives a
/// daemon restart and later reverts roll back to the channel both ends are
/// actually on. The configured channel only seeds first boot or a missing
/// persist file.
pub async fn startup_channel(store: &FileStore, fallback: Channel) -> Channel {
    match store.load().await {
        Ok(channel) => {
            tracing::info!("Restored committed channel {} from persist file", channel);
            channel
        }
        Err(e) => {
            tracing::warn!(
                "Could not read persisted channel ({}); starting on {}",
                e,
                fallback
            );
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(n: u32) -> Channel {
        Channel::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_startup_channel_restores_persisted_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wfb.yaml");
        tokio::fs::write(&path, "wireless:\n  channel: 44\n")
            .await
            .unwrap();

        let store = FileStore::new(&path, "channel");
        assert_eq!(startup_channel(&store, ch(165)).await, ch(44));
    }

    #[tokio::test]
    async fn test_startup_channel_falls_back_when_file_missing() {
        let store = FileStore::new("/nonexistent/wfb.yaml", "channel");
        assert_eq!(startup_channel(&store, ch(165)).await, ch(165));
    }

    #[tokio::test]
    async fn test_startup_channel_falls_back_when_key_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wfb.yaml");
        tokio::fs::write(&path, "wireless:\n  region: US\n")
            .await
            .unwrap();

        let store = FileStore::new(&path, "channel");
        assert_eq!(startup_channel(&store, ch(165)).await, ch(165));
    }
}
