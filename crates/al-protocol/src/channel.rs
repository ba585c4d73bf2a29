//! Wireless channel identifier

use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;

/// A wireless channel number.
///
/// The protocol only requires the value to be a positive integer; whether a
/// given channel is usable on the local regulatory domain is the operator's
/// concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Channel(u32);

impl Channel {
    /// Create a channel, rejecting zero
    pub fn new(value: u32) -> Result<Self, ProtocolError> {
        if value == 0 {
            return Err(ProtocolError::InvalidChannel("0".to_string()));
        }
        Ok(Self(value))
    }

    /// Get the raw channel number
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Channel {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s
            .parse()
            .map_err(|_| ProtocolError::InvalidChannel(s.to_string()))?;
        Channel::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_parses_positive_integer() {
        let ch: Channel = "149".parse().unwrap();
        assert_eq!(ch.get(), 149);
        assert_eq!(ch.to_string(), "149");
    }

    #[test]
    fn test_channel_rejects_zero() {
        assert!("0".parse::<Channel>().is_err());
        assert!(Channel::new(0).is_err());
    }

    #[test]
    fn test_channel_rejects_garbage() {
        assert!("abc".parse::<Channel>().is_err());
        assert!("-36".parse::<Channel>().is_err());
        assert!("4.5".parse::<Channel>().is_err());
        assert!("".parse::<Channel>().is_err());
    }
}
