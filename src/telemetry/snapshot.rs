//! Telemetry snapshot shared between acquisition and serialization

use super::measurement::MeasurementSet;
use chrono::{DateTime, Utc};

/// Communication health of the most recent acquisition cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComStatus {
    /// No cycle has completed since the status was last reset
    #[default]
    Unknown,
    /// At least one batch exhausted its retries
    Degraded,
    /// Every batch succeeded
    Healthy,
}

impl ComStatus {
    /// Integer representation used on the wire
    pub fn code(self) -> i32 {
        match self {
            ComStatus::Unknown => -1,
            ComStatus::Degraded => 0,
            ComStatus::Healthy => 1,
        }
    }

    /// Merge the outcome of one batch into the cycle status.
    ///
    /// A failure is sticky for the rest of the cycle.
    pub fn record_batch(self, succeeded: bool) -> Self {
        match (self, succeeded) {
            (ComStatus::Degraded, _) | (_, false) => ComStatus::Degraded,
            (_, true) => ComStatus::Healthy,
        }
    }
}

/// Everything produced by one acquisition cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    measurements: MeasurementSet,
    com_status: ComStatus,
    timestamp: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a snapshot from already known values
    pub fn from_parts(
        measurements: MeasurementSet,
        com_status: ComStatus,
        timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            measurements,
            com_status,
            timestamp,
        }
    }

    /// Reset all channels to unknown and the status to [`ComStatus::Unknown`].
    ///
    /// The timestamp is kept until the next first-batch attempt replaces it.
    pub fn begin_cycle(&mut self) {
        self.measurements.reset();
        self.com_status = ComStatus::Unknown;
    }

    pub fn measurements(&self) -> &MeasurementSet {
        &self.measurements
    }

    pub fn measurements_mut(&mut self) -> &mut MeasurementSet {
        &mut self.measurements
    }

    pub fn com_status(&self) -> ComStatus {
        self.com_status
    }

    pub fn set_com_status(&mut self, status: ComStatus) {
        self.com_status = status;
    }

    /// Time of the most recent first-batch read attempt
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn stamp(&mut self, at: DateTime<Utc>) {
        self.timestamp = Some(at);
    }
}
