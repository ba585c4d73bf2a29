//! Revert watchdog
//!
//! Polls the coordinator for an expired, unconfirmed proposal. Polling
//! rather than a one-shot timer keeps recovery independent of the request
//! path: whatever happens to the connection that proposed the change, this
//! task reverts it once the window elapses. Worst-case detection latency is
//! one cadence period beyond the nominal window.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::coordinator::{ExpiryOutcome, PendingCoordinator};

/// Background task reverting unconfirmed proposals after their window
pub struct RevertWatchdog {
    /// Polling cadence; must be shorter than the confirmation window
    pub cadence: Duration,
}

impl RevertWatchdog {
    /// Create a watchdog with the given cadence
    pub fn new(cadence: Duration) -> Self {
        Self { cadence }
    }

    /// Spawn the polling loop. Runs until the token is cancelled.
    pub fn spawn(
        &self,
        coordinator: Arc<PendingCoordinator>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let cadence = self.cadence;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(cadence);
            // The first tick fires immediately; skip it so a proposal made
            // at startup gets a full window.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::debug!("Revert watchdog stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        match coordinator.check_expiry(Instant::now()).await {
                            ExpiryOutcome::Expired { reverted_to } => {
                                tracing::warn!(
                                    "Unconfirmed channel change reverted to {}",
                                    reverted_to
                                );
                            }
                            ExpiryOutcome::NotExpired | ExpiryOutcome::NoPendingChange => {}
                        }
                    }
                }
            }
        })
    }
}
