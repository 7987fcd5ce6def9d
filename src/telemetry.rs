//! Meter readings, derived metrics and the per-cycle snapshot

pub mod derived;
pub mod measurement;
pub mod snapshot;

pub use derived::{compute_derived, power_factor_ratio};
pub use measurement::{Channel, MeasurementSet, UNKNOWN};
pub use snapshot::{ComStatus, Snapshot};
