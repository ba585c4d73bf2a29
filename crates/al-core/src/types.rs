//! Core domain types

use std::fmt;

use crate::error::ConfigError;

/// Channel width mode for the radio.
///
/// Derived from configuration, not from the protocol: both endpoints keep
/// their own configured width and only the channel number is negotiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bandwidth {
    /// 10 MHz
    Narrow,
    /// 20 MHz
    #[default]
    Standard,
    /// 40 MHz (HT40+)
    Wide,
    /// 80 MHz
    UltraWide,
}

impl Bandwidth {
    /// Map a configured width in MHz to a bandwidth mode
    pub fn from_mhz(mhz: u32) -> Result<Self, ConfigError> {
        match mhz {
            10 => Ok(Bandwidth::Narrow),
            20 => Ok(Bandwidth::Standard),
            40 => Ok(Bandwidth::Wide),
            80 => Ok(Bandwidth::UltraWide),
            other => Err(ConfigError::InvalidBandwidth(other)),
        }
    }

    /// The channel-width qualifier appended to `iw dev <if> set channel`.
    ///
    /// 20 MHz is the hardware default and takes no qualifier.
    pub fn qualifier(&self) -> &'static str {
        match self {
            Bandwidth::Narrow => "10MHz",
            Bandwidth::Standard => "",
            Bandwidth::Wide => "HT40+",
            Bandwidth::UltraWide => "80MHz",
        }
    }
}

impl fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mhz = match self {
            Bandwidth::Narrow => 10,
            Bandwidth::Standard => 20,
            Bandwidth::Wide => 40,
            Bandwidth::UltraWide => 80,
        };
        write!(f, "{}MHz", mhz)
    }
}
