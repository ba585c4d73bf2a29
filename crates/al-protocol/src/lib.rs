//! al-protocol: Wire protocol for airlink channel renegotiation
//!
//! This crate defines the line-based ASCII command protocol spoken between
//! the ground driver and the air daemon. Each exchange is one connection,
//! one request line in, one response line out.

pub mod channel;
pub mod codec;
pub mod command;
pub mod error;
pub mod response;

pub use channel::Channel;
pub use codec::{LineCodec, MAX_LINE_LEN};
pub use command::Command;
pub use error::ProtocolError;
pub use response::{reply_indicates_failure, Response, FAILURE_MARKER, INVALID_MARKER};
