//! Pending channel change coordinator
//!
//! Owns the single-slot proposal state machine:
//!
//! ```text
//! IDLE --propose(accepted)--> PENDING --confirm--> IDLE (committed)
//!                             PENDING --expiry---> IDLE (reverted)
//! ```
//!
//! All three operations serialize through one async mutex. The actuator and
//! store are awaited while the lock is held, so their latency extends the
//! critical section; contention here is a single peer plus the watchdog, so
//! that cost is accepted in exchange for an un-torn slot.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use al_core::{Bandwidth, ConfigStore, HardwareActuator};
use al_protocol::Channel;

/// The single in-flight proposal
#[derive(Debug, Clone, Copy)]
pub struct PendingChange {
    /// Channel tentatively applied to the radio
    pub proposed: Channel,
    /// Channel to roll back to on expiry
    pub original: Channel,
    /// When the proposal was accepted
    pub proposed_at: Instant,
}

struct Slot {
    committed: Channel,
    pending: Option<PendingChange>,
}

/// Outcome of a propose request
#[derive(Debug)]
pub enum ProposeOutcome {
    /// Slot filled, hardware tentatively retuned
    Accepted { channel: Channel },
    /// A proposal is already awaiting confirmation; the slot is never
    /// overwritten, because that would discard its rollback target
    AlreadyPending { proposed: Channel },
    /// Hardware apply failed; no state was recorded
    ActuatorFailed { reason: String },
}

/// Outcome of a confirm request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Pending value committed and persisted
    Committed(Channel),
    /// Nothing was pending; no state changed
    NoPendingChange,
}

/// Outcome of a watchdog expiry check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryOutcome {
    /// Window elapsed; hardware reverted and slot cleared
    Expired { reverted_to: Channel },
    /// A proposal is pending but still inside its window
    NotExpired,
    /// Nothing pending
    NoPendingChange,
}

/// Snapshot of coordinator state for the `status` verb
#[derive(Debug, Clone, Copy)]
pub struct ChannelStatus {
    /// Durably committed channel
    pub committed: Channel,
    /// In-flight proposal, if any
    pub pending: Option<Channel>,
}

/// Coordinates the tentative-apply / confirm / revert lifecycle on the air
/// side. Shared between the command server and the revert watchdog.
pub struct PendingCoordinator {
    slot: Mutex<Slot>,
    actuator: Arc<dyn HardwareActuator>,
    store: Arc<dyn ConfigStore>,
    bandwidth: Bandwidth,
    confirmation_window: Duration,
}

impl PendingCoordinator {
    /// Create a coordinator with the given committed starting channel
    pub fn new(
        committed: Channel,
        bandwidth: Bandwidth,
        confirmation_window: Duration,
        actuator: Arc<dyn HardwareActuator>,
        store: Arc<dyn ConfigStore>,
    ) -> Self {
        Self {
            slot: Mutex::new(Slot {
                committed,
                pending: None,
            }),
            actuator,
            store,
            bandwidth,
            confirmation_window,
        }
    }

    /// Tentatively apply a new channel and open the confirmation window.
    ///
    /// The hardware change happens before this returns; once it succeeds the
    /// link to the requester may already be degraded or down.
    pub async fn propose(&self, channel: Channel) -> ProposeOutcome {
        let mut slot = self.slot.lock().await;

        if let Some(pending) = &slot.pending {
            tracing::warn!(
                "Rejecting proposal for channel {}: change to {} already pending",
                channel,
                pending.proposed
            );
            return ProposeOutcome::AlreadyPending {
                proposed: pending.proposed,
            };
        }

        if let Err(e) = self.actuator.apply(channel, self.bandwidth).await {
            tracing::warn!("Tentative apply of channel {} failed: {}", channel, e);
            return ProposeOutcome::ActuatorFailed {
                reason: e.to_string(),
            };
        }

        slot.pending = Some(PendingChange {
            proposed: channel,
            original: slot.committed,
            proposed_at: Instant::now(),
        });
        tracing::info!(
            "Channel {} tentatively applied, awaiting confirmation",
            channel
        );
        ProposeOutcome::Accepted { channel }
    }

    /// Commit the pending proposal. Idempotent: with nothing pending this
    /// reports [`ConfirmOutcome::NoPendingChange`] and mutates nothing.
    pub async fn confirm(&self) -> ConfirmOutcome {
        let mut slot = self.slot.lock().await;

        let Some(pending) = slot.pending.take() else {
            return ConfirmOutcome::NoPendingChange;
        };

        slot.committed = pending.proposed;

        // The radio is already on the new channel; persistence is the only
        // remaining side effect and its failure must not undo the commit.
        if let Err(e) = self.store.persist(slot.committed).await {
            tracing::error!("Committed channel {} but persist failed: {}", slot.committed, e);
        }

        tracing::info!("Channel change confirmed. Now on channel {}", slot.committed);
        ConfirmOutcome::Committed(slot.committed)
    }

    /// Revert an expired proposal. Called by the watchdog.
    pub async fn check_expiry(&self, now: Instant) -> ExpiryOutcome {
        let mut slot = self.slot.lock().await;

        let Some(pending) = &slot.pending else {
            return ExpiryOutcome::NoPendingChange;
        };

        if now.duration_since(pending.proposed_at) < self.confirmation_window {
            return ExpiryOutcome::NotExpired;
        }

        let original = pending.original;
        tracing::warn!(
            "Channel change to {} timed out, reverting to {}",
            pending.proposed,
            original
        );

        // Revert is unconditional: even if the actuator fails here the slot
        // is cleared, otherwise the watchdog would retry forever against
        // broken hardware.
        if let Err(e) = self.actuator.apply(original, self.bandwidth).await {
            tracing::error!("Revert to channel {} failed: {}", original, e);
        }

        slot.committed = original;
        slot.pending = None;
        ExpiryOutcome::Expired {
            reverted_to: original,
        }
    }

    /// Snapshot committed and pending channels
    pub async fn status(&self) -> ChannelStatus {
        let slot = self.slot.lock().await;
        ChannelStatus {
            committed: slot.committed,
            pending: slot.pending.as_ref().map(|p| p.proposed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use al_core::error::{ActuatorError, StoreError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex as StdMutex;

    fn ch(n: u32) -> Channel {
        Channel::new(n).unwrap()
    }

    /// Records every applied channel; optionally fails
    struct FakeActuator {
        applied: StdMutex<Vec<u32>>,
        fail: AtomicBool,
    }

    impl FakeActuator {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                applied: StdMutex::new(Vec::new()),
                fail: AtomicBool::new(false),
            })
        }

        fn applied(&self) -> Vec<u32> {
            self.applied.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HardwareActuator for FakeActuator {
        async fn apply(&self, channel: Channel, _bw: Bandwidth) -> Result<(), ActuatorError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ActuatorError::CommandFailed {
                    command: "iw".to_string(),
                    status: 1,
                });
            }
            self.applied.lock().unwrap().push(channel.get());
            Ok(())
        }
    }

    struct FakeStore {
        persisted: StdMutex<Vec<u32>>,
    }

    impl FakeStore {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                persisted: StdMutex::new(Vec::new()),
            })
        }

        fn persisted(&self) -> Vec<u32> {
            self.persisted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ConfigStore for FakeStore {
        async fn persist(&self, channel: Channel) -> Result<(), StoreError> {
            self.persisted.lock().unwrap().push(channel.get());
            Ok(())
        }
    }

    fn coordinator(
        actuator: Arc<FakeActuator>,
        store: Arc<FakeStore>,
        window: Duration,
    ) -> PendingCoordinator {
        PendingCoordinator::new(ch(165), Bandwidth::Standard, window, actuator, store)
    }

    #[tokio::test]
    async fn test_propose_then_confirm_commits_and_persists() {
        let actuator = FakeActuator::new();
        let store = FakeStore::new();
        let coord = coordinator(actuator.clone(), store.clone(), Duration::from_secs(15));

        assert!(matches!(
            coord.propose(ch(149)).await,
            ProposeOutcome::Accepted { .. }
        ));
        assert_eq!(coord.confirm().await, ConfirmOutcome::Committed(ch(149)));

        assert_eq!(actuator.applied(), vec![149]);
        assert_eq!(store.persisted(), vec![149]);
        let status = coord.status().await;
        assert_eq!(status.committed, ch(149));
        assert!(status.pending.is_none());
    }

    #[tokio::test]
    async fn test_confirm_without_pending_is_noop() {
        let actuator = FakeActuator::new();
        let store = FakeStore::new();
        let coord = coordinator(actuator.clone(), store.clone(), Duration::from_secs(15));

        assert_eq!(coord.confirm().await, ConfirmOutcome::NoPendingChange);
        assert_eq!(coord.confirm().await, ConfirmOutcome::NoPendingChange);
        assert!(store.persisted().is_empty());
        assert_eq!(coord.status().await.committed, ch(165));
    }

    #[tokio::test]
    async fn test_actuator_failure_records_no_state() {
        let actuator = FakeActuator::new();
        let store = FakeStore::new();
        let coord = coordinator(actuator.clone(), store.clone(), Duration::from_secs(15));

        actuator.fail.store(true, Ordering::SeqCst);
        assert!(matches!(
            coord.propose(ch(149)).await,
            ProposeOutcome::ActuatorFailed { .. }
        ));

        assert!(coord.status().await.pending.is_none());
        assert_eq!(coord.confirm().await, ConfirmOutcome::NoPendingChange);
    }

    #[tokio::test]
    async fn test_second_proposal_rejected_while_pending() {
        let actuator = FakeActuator::new();
        let store = FakeStore::new();
        let coord = coordinator(actuator.clone(), store.clone(), Duration::from_secs(15));

        assert!(matches!(
            coord.propose(ch(149)).await,
            ProposeOutcome::Accepted { .. }
        ));
        assert!(matches!(
            coord.propose(ch(36)).await,
            ProposeOutcome::AlreadyPending { proposed } if proposed == ch(149)
        ));

        // The rejected proposal must not have touched hardware
        assert_eq!(actuator.applied(), vec![149]);
        // And the original rollback target survives
        assert_eq!(coord.confirm().await, ConfirmOutcome::Committed(ch(149)));
    }

    #[tokio::test]
    async fn test_expiry_reverts_hardware_and_clears_slot() {
        let actuator = FakeActuator::new();
        let store = FakeStore::new();
        let coord = coordinator(actuator.clone(), store.clone(), Duration::from_millis(10));

        coord.propose(ch(149)).await;

        let not_yet = coord.check_expiry(Instant::now()).await;
        assert_eq!(not_yet, ExpiryOutcome::NotExpired);

        tokio::time::sleep(Duration::from_millis(20)).await;
        let expired = coord.check_expiry(Instant::now()).await;
        assert_eq!(
            expired,
            ExpiryOutcome::Expired {
                reverted_to: ch(165)
            }
        );

        assert_eq!(actuator.applied(), vec![149, 165]);
        assert!(store.persisted().is_empty());
        let status = coord.status().await;
        assert_eq!(status.committed, ch(165));
        assert!(status.pending.is_none());
    }

    #[tokio::test]
    async fn test_expiry_with_nothing_pending() {
        let actuator = FakeActuator::new();
        let store = FakeStore::new();
        let coord = coordinator(actuator.clone(), store.clone(), Duration::from_millis(10));

        assert_eq!(
            coord.check_expiry(Instant::now()).await,
            ExpiryOutcome::NoPendingChange
        );
    }

    #[tokio::test]
    async fn test_concurrent_proposals_serialize() {
        let actuator = FakeActuator::new();
        let store = FakeStore::new();
        let coord = Arc::new(coordinator(
            actuator.clone(),
            store.clone(),
            Duration::from_secs(15),
        ));

        let mut handles = Vec::new();
        for n in [36u32, 40, 44, 48] {
            let coord = Arc::clone(&coord);
            handles.push(tokio::spawn(
                async move { coord.propose(ch(n)).await },
            ));
        }

        let mut accepted = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), ProposeOutcome::Accepted { .. }) {
                accepted += 1;
            }
        }

        // Exactly one proposal wins the slot; the rest are rejected whole
        assert_eq!(accepted, 1);
        assert_eq!(actuator.applied().len(), 1);
        assert!(coord.status().await.pending.is_some());
    }
}
