//! Request commands accepted by the air daemon
//!
//! The grammar is a closed set of line-based verbs. Anything outside it is
//! rejected here, at the boundary, before any handler runs:
//!
//! - `propose_channel <n>`: tentatively change the wireless channel;
//!   starts the confirmation window.
//! - `confirm_channel`: commit a previously proposed channel.
//! - `status`: report the committed channel and any pending proposal.

use std::fmt;
use std::str::FromStr;

use crate::channel::Channel;
use crate::error::ProtocolError;

/// A parsed request line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Tentatively apply a new channel, pending confirmation
    ProposeChannel(Channel),
    /// Commit the pending channel change
    ConfirmChannel,
    /// Report committed and pending channel state
    Status,
}

impl Command {
    /// Parse one request line into a command.
    ///
    /// Leading/trailing whitespace is ignored. The verb and argument are
    /// whitespace-separated; extra tokens are an error rather than being
    /// silently dropped.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let mut tokens = line.split_whitespace();
        let verb = tokens
            .next()
            .ok_or_else(|| ProtocolError::UnknownCommand(String::new()))?;

        let command = match verb {
            "propose_channel" => {
                let arg = tokens
                    .next()
                    .ok_or(ProtocolError::MissingArgument("propose_channel"))?;
                Command::ProposeChannel(arg.parse()?)
            }
            "confirm_channel" => Command::ConfirmChannel,
            "status" => Command::Status,
            other => return Err(ProtocolError::UnknownCommand(other.to_string())),
        };

        if let Some(extra) = tokens.next() {
            return Err(ProtocolError::TrailingInput(extra.to_string()));
        }

        Ok(command)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::ProposeChannel(channel) => write!(f, "propose_channel {}", channel),
            Command::ConfirmChannel => write!(f, "confirm_channel"),
            Command::Status => write!(f, "status"),
        }
    }
}

impl FromStr for Command {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::parse(s)
    }
}
