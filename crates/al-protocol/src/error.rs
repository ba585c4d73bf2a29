//! Protocol error types

use thiserror::Error;

/// Errors that can occur while parsing or framing protocol lines
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Command verb not in the protocol grammar
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Channel argument failed to parse as a positive integer
    #[error("Invalid channel number: {0}")]
    InvalidChannel(String),

    /// Command requires an argument that was not supplied
    #[error("Missing argument for {0}")]
    MissingArgument(&'static str),

    /// Command carried more arguments than its grammar allows
    #[error("Unexpected trailing input: {0}")]
    TrailingInput(String),

    /// Request line exceeds the maximum permitted length
    #[error("Line too long: {len} bytes exceeds maximum of {max} bytes")]
    LineTooLong { len: usize, max: usize },

    /// Request line is not valid UTF-8
    #[error("Invalid UTF-8 in request line")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
