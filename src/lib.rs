//! # meterlink - Modbus-TCP energy meter to device-twin gateway
//!
//! Polls a three-phase energy meter over Modbus TCP, derives aggregate
//! metrics, and publishes telemetry, device information and writable
//! property acknowledgements as JSON to a cloud device twin.
//!
//! ## Architecture
//!
//! - `modbus`: register decoding and the Modbus TCP transport
//! - `acquisition`: batch reads with bounded retries into the snapshot
//! - `telemetry`: channels, measurement set, derived metrics, snapshot
//! - `payload`: fixed-capacity JSON encoders and the property decoder
//! - `schedule`: telemetry interval gating (the writable property)
//! - `bridge`: main loop, command handling and inbound dispatch
//! - `uplink`: upstream delivery boundary
//! - `config`: YAML configuration with validation
//! - `logging`: structured logging and tracing

pub mod acquisition;
pub mod bridge;
pub mod config;
pub mod device;
pub mod error;
pub mod logging;
pub mod modbus;
pub mod payload;
pub mod schedule;
pub mod telemetry;
pub mod uplink;

// Re-export commonly used types
pub use acquisition::AcquisitionController;
pub use bridge::{Bridge, BridgeMessage};
pub use config::Config;
pub use error::{MeterLinkError, Result};
pub use telemetry::{Channel, ComStatus, Snapshot};

/// Version string stamped by the build script
pub const APP_VERSION: &str = env!("APP_VERSION");
