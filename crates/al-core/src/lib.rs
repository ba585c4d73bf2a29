//! al-core: Shared abstractions for airlink
//!
//! This crate provides the domain types, error taxonomy, configuration
//! structures, and the capability seams (hardware actuator, config store,
//! liveness probe) used by the air daemon and the ground driver.

pub mod actuator;
pub mod config;
pub mod error;
pub mod probe;
pub mod store;
pub mod types;

pub use actuator::{HardwareActuator, IwActuator};
pub use error::{ActuatorError, AlError, ConfigError, StoreError, TransportError};
pub use probe::{LivenessProbe, PingProbe};
pub use store::{ConfigStore, FileStore};
pub use types::Bandwidth;
