//! Telemetry send cadence
//!
//! Holds the only writable device property, `telemetryFrequencySecs`, and
//! the time of the last send. Re-entry into acquisition is gated by
//! comparing elapsed wall-clock time against the interval.

use crate::error::{MeterLinkError, Result};
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetrySchedule {
    interval_secs: u32,
    last_send: Option<DateTime<Utc>>,
}

impl TelemetrySchedule {
    pub fn new(interval_secs: u32) -> Result<Self> {
        Self::check(interval_secs)?;
        Ok(Self {
            interval_secs,
            last_send: None,
        })
    }

    fn check(interval_secs: u32) -> Result<()> {
        if interval_secs == 0 || interval_secs > i32::MAX as u32 {
            return Err(MeterLinkError::validation(
                "telemetryFrequencySecs".to_string(),
                format!("interval must be in 1..={}, got {}", i32::MAX, interval_secs),
            ));
        }
        Ok(())
    }

    pub fn interval_secs(&self) -> u32 {
        self.interval_secs
    }

    pub fn set_interval_secs(&mut self, interval_secs: u32) -> Result<()> {
        Self::check(interval_secs)?;
        self.interval_secs = interval_secs;
        Ok(())
    }

    /// True before the first send and whenever a full interval has elapsed
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_send {
            None => true,
            Some(last) => now - last >= Duration::seconds(i64::from(self.interval_secs)),
        }
    }

    pub fn mark_sent(&mut self, now: DateTime<Utc>) {
        self.last_send = Some(now);
    }
}
