//! al-ground: Ground-side channel renegotiation driver
//!
//! The ground station initiates renegotiation: it proposes a channel to the
//! air daemon, retunes its own radios, verifies the link survived on the new
//! channel, and only then confirms. The air side reverts on its own if the
//! confirmation never arrives.

pub mod client;
pub mod driver;

pub use client::{AirClient, Reply};
pub use driver::{Outcome, RenegotiationDriver};
