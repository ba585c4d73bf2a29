//! Response lines produced by the air daemon
//!
//! Failures are data, not transport errors: every request that reaches the
//! dispatcher yields exactly one response line. The ground side classifies
//! replies textually: a rejected channel change always carries the
//! `"Failed"` marker, a grammar violation the `"Invalid"` marker.

use std::fmt;

use crate::channel::Channel;

/// Marker substring present in every hardware/state rejection
pub const FAILURE_MARKER: &str = "Failed";

/// Marker substring present in every grammar rejection
pub const INVALID_MARKER: &str = "Invalid";

/// A response line, rendered to the wire via `Display`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Proposal accepted; the tentative change is live and awaiting confirm
    ChannelAccepted { channel: Channel },
    /// Proposal rejected (actuator failure or a change already pending)
    ChannelRejected { reason: String },
    /// Request line failed to parse
    InvalidCommand { reason: String },
    /// Pending change committed and persisted
    ChannelCommitted { channel: Channel },
    /// Confirm arrived with nothing pending
    NoPendingChange,
    /// Committed channel plus any in-flight proposal
    StatusReport {
        committed: Channel,
        pending: Option<Channel>,
    },
}

impl Response {
    /// Whether this response signals a failure to the peer
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Response::ChannelRejected { .. } | Response::InvalidCommand { .. }
        )
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::ChannelAccepted { channel } => {
                write!(f, "Channel change to {} accepted. Awaiting confirmation.", channel)
            }
            Response::ChannelRejected { reason } => {
                write!(f, "Failed to change channel: {}", reason)
            }
            Response::InvalidCommand { reason } => write!(f, "Invalid command: {}", reason),
            Response::ChannelCommitted { channel } => {
                write!(f, "Channel change confirmed. Now on channel {}.", channel)
            }
            Response::NoPendingChange => write!(f, "No pending channel change to confirm."),
            Response::StatusReport { committed, pending } => match pending {
                Some(p) => write!(f, "Current channel: {}. Pending change to {}.", committed, p),
                None => write!(f, "Current channel: {}.", committed),
            },
        }
    }
}

/// Classify a raw reply line from the peer.
///
/// Used by the ground driver, which must abort the handshake on any reply
/// carrying a failure or invalid marker but treats unknown wording as
/// acceptance (the air side may be a newer version with different text).
pub fn reply_indicates_failure(text: &str) -> bool {
    text.contains(FAILURE_MARKER) || text.contains(INVALID_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(n: u32) -> Channel {
        Channel::new(n).unwrap()
    }

    #[test]
    fn test_rejection_carries_failure_marker() {
        let line = Response::ChannelRejected {
            reason: "iw exited with status 1".to_string(),
        }
        .to_string();
        assert!(line.contains(FAILURE_MARKER));
        assert!(reply_indicates_failure(&line));
    }

    #[test]
    fn test_invalid_carries_invalid_marker() {
        let line = Response::InvalidCommand {
            reason: "Unknown command: reboot".to_string(),
        }
        .to_string();
        assert!(line.contains(INVALID_MARKER));
        assert!(reply_indicates_failure(&line));
    }

    #[test]
    fn test_success_lines_are_not_failures() {
        for resp in [
            Response::ChannelAccepted { channel: ch(149) },
            Response::ChannelCommitted { channel: ch(149) },
            Response::NoPendingChange,
            Response::StatusReport {
                committed: ch(165),
                pending: Some(ch(149)),
            },
        ] {
            assert!(!resp.is_failure());
            assert!(!reply_indicates_failure(&resp.to_string()));
        }
    }

    #[test]
    fn test_committed_line_includes_value() {
        let line = Response::ChannelCommitted { channel: ch(44) }.to_string();
        assert!(line.contains("44"));
    }
}
