//! Core error types for airlink

use al_protocol::ProtocolError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the airlink ecosystem
#[derive(Error, Debug)]
pub enum AlError {
    /// Protocol error
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Transport error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Hardware actuator error
    #[error("Actuator error: {0}")]
    Actuator(#[from] ActuatorError),

    /// Config store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Transport-level failures on the ground side.
///
/// These are the only errors the driver retries, and none of them ever
/// causes a hardware change.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connect attempt did not complete within the timeout
    #[error("Connection to {0} timed out")]
    ConnectTimeout(String),

    /// Connect attempt was refused or failed outright
    #[error("Connection to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// All connect attempts exhausted
    #[error("Peer unreachable after {attempts} attempts")]
    AttemptsExhausted { attempts: u32 },

    /// Peer accepted the connection but no complete reply line arrived
    /// within the receive deadline
    #[error("Timed out reading response")]
    ReceiveTimeout,

    /// Read or write failed mid-exchange
    #[error("I/O error during exchange: {0}")]
    Io(#[from] std::io::Error),
}

/// Hardware actuator failures
#[derive(Error, Debug)]
pub enum ActuatorError {
    /// The radio control command could not be spawned
    #[error("Failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The radio control command ran but reported failure
    #[error("{command} exited with status {status}")]
    CommandFailed { command: String, status: i32 },
}

/// Config store failures
#[derive(Error, Debug)]
pub enum StoreError {
    /// Persist target file does not exist
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// The channel key was not present in the file
    #[error("Key '{key}' not found in {path}")]
    KeyMissing { key: String, path: PathBuf },

    /// Read/write/rename failed
    #[error("I/O error persisting channel: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// Unsupported channel width
    #[error("Unsupported bandwidth: {0} MHz (expected 10, 20, 40, or 80)")]
    InvalidBandwidth(u32),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
