//! al-air: Air-side channel renegotiation daemon
//!
//! Holds the single in-flight channel proposal, applies it tentatively,
//! reverts it if the ground side never confirms, and serves the line-based
//! command protocol over TCP.

pub mod coordinator;
pub mod server;
pub mod state;
pub mod watchdog;

pub use coordinator::{ConfirmOutcome, ExpiryOutcome, PendingCoordinator, ProposeOutcome};
pub use server::CommandServer;
pub use state::{startup_channel, AirState};
pub use watchdog::RevertWatchdog;
