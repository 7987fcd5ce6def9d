//! JSON payloads exchanged with the device twin
//!
//! All encoders write into a caller-owned [`PayloadBuffer`] so the same
//! allocation is reused for every message.

pub mod buffer;
pub mod device_info;
pub mod properties;
pub mod telemetry;

pub use buffer::PayloadBuffer;
pub use properties::{
    PropertiesMessageKind, PropertyUpdate, TELEMETRY_FREQUENCY_PROPERTY,
    consume_writable_properties, encode_ack,
};
pub use telemetry::{Precision, TELEMETRY_FIELDS, TelemetryField};
