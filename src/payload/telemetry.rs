//! Telemetry message encoding
//!
//! The payload is one flat JSON object. Field names and order come from
//! [`TELEMETRY_FIELDS`] and are the wire contract with the device template.

use super::buffer::PayloadBuffer;
use crate::error::Result;
use crate::telemetry::{Channel, Snapshot};
use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Decimal places kept on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// Voltage, current, power, THD, power factor, frequency
    Instant,
    /// Cumulative energy counters
    Energy,
}

impl Precision {
    pub fn decimals(self) -> i32 {
        match self {
            Precision::Instant => 2,
            Precision::Energy => 3,
        }
    }

    /// Round `value` half away from zero to this precision
    pub fn round(self, value: f32) -> f64 {
        let scale = 10f64.powi(self.decimals());
        (f64::from(value) * scale).round() / scale
    }
}

/// One numeric telemetry field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryField {
    pub name: &'static str,
    pub channel: Channel,
    pub precision: Precision,
}

const fn instant(name: &'static str, channel: Channel) -> TelemetryField {
    TelemetryField {
        name,
        channel,
        precision: Precision::Instant,
    }
}

const fn energy(name: &'static str, channel: Channel) -> TelemetryField {
    TelemetryField {
        name,
        channel,
        precision: Precision::Energy,
    }
}

pub const COM_STATUS_FIELD: &str = "comStatus";
pub const TIMESTAMP_FIELD: &str = "timestamp";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.000Z";

pub const TELEMETRY_FIELDS: [TelemetryField; Channel::COUNT] = [
    instant("voltageL1N", Channel::VoltageL1N),
    instant("voltageL2N", Channel::VoltageL2N),
    instant("voltageL3N", Channel::VoltageL3N),
    instant("avgVoltageLN", Channel::AvgVoltageLN),
    instant("voltageL1L2", Channel::VoltageL1L2),
    instant("voltageL2L3", Channel::VoltageL2L3),
    instant("voltageL1L3", Channel::VoltageL1L3),
    instant("avgVoltageLL", Channel::AvgVoltageLL),
    instant("currentL1", Channel::CurrentL1),
    instant("currentL2", Channel::CurrentL2),
    instant("currentL3", Channel::CurrentL3),
    instant("currentNeutral", Channel::CurrentNeutral),
    instant("avgCurrentL", Channel::AvgCurrentL),
    instant("currentTotal", Channel::CurrentTotal),
    instant("realPowerL1N", Channel::RealPowerL1N),
    instant("realPowerL2N", Channel::RealPowerL2N),
    instant("realPowerL3N", Channel::RealPowerL3N),
    instant("realPowerTotal", Channel::RealPowerTotal),
    instant("apparentPowerL1N", Channel::ApparentPowerL1N),
    instant("apparentPowerL2N", Channel::ApparentPowerL2N),
    instant("apparentPowerL3N", Channel::ApparentPowerL3N),
    instant("apparentPowerTotal", Channel::ApparentPowerTotal),
    instant("reactivePowerL1N", Channel::ReactivePowerL1N),
    instant("reactivePowerL2N", Channel::ReactivePowerL2N),
    instant("reactivePowerL3N", Channel::ReactivePowerL3N),
    instant("reactivePowerTotal", Channel::ReactivePowerTotal),
    instant("cosPhiL1", Channel::CosPhiL1),
    instant("cosPhiL2", Channel::CosPhiL2),
    instant("cosPhiL3", Channel::CosPhiL3),
    instant("avgCosPhi", Channel::AvgCosPhi),
    instant("frequency", Channel::Frequency),
    instant("rotField", Channel::RotField),
    energy("realEnergyL1N", Channel::RealEnergyL1N),
    energy("realEnergyL2N", Channel::RealEnergyL2N),
    energy("realEnergyL3N", Channel::RealEnergyL3N),
    energy("realEnergyTotal", Channel::RealEnergyTotal),
    energy("apparentEnergyL1", Channel::ApparentEnergyL1),
    energy("apparentEnergyL2", Channel::ApparentEnergyL2),
    energy("apparentEnergyL3", Channel::ApparentEnergyL3),
    energy("apparentEnergyTotal", Channel::ApparentEnergyTotal),
    energy("reactiveEnergyL1", Channel::ReactiveEnergyL1),
    energy("reactiveEnergyL2", Channel::ReactiveEnergyL2),
    energy("reactiveEnergyL3", Channel::ReactiveEnergyL3),
    energy("reactiveEnergyTotal", Channel::ReactiveEnergyTotal),
    instant("THDVoltsL1N", Channel::ThdVoltsL1N),
    instant("THDVoltsL2N", Channel::ThdVoltsL2N),
    instant("THDVoltsL3N", Channel::ThdVoltsL3N),
    instant("avgTHDVoltsLN", Channel::AvgThdVoltsLN),
    instant("THDCurrentL1N", Channel::ThdCurrentL1N),
    instant("THDCurrentL2N", Channel::ThdCurrentL2N),
    instant("THDCurrentL3N", Channel::ThdCurrentL3N),
    instant("avgTHDCurrentLN", Channel::AvgThdCurrentLN),
    instant("THDVoltsL1L2", Channel::ThdVoltsL1L2),
    instant("THDVoltsL2L3", Channel::ThdVoltsL2L3),
    instant("THDVoltsL1L3", Channel::ThdVoltsL1L3),
    instant("avgTHDVoltsLL", Channel::AvgThdVoltsLL),
    instant("powerFactorL1N", Channel::PowerFactorL1N),
    instant("powerFactorL2N", Channel::PowerFactorL2N),
    instant("powerFactorL3N", Channel::PowerFactorL3N),
    instant("powerFactorTotal", Channel::PowerFactorTotal),
];

/// Wire rendering of the snapshot timestamp; an unset stamp renders the epoch
pub fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp
        .unwrap_or_default()
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

struct TelemetryDocument<'a>(&'a Snapshot);

impl Serialize for TelemetryDocument<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let snapshot = self.0;
        let measurements = snapshot.measurements();
        let mut map = serializer.serialize_map(Some(TELEMETRY_FIELDS.len() + 2))?;
        for field in &TELEMETRY_FIELDS {
            let value = field.precision.round(measurements.get(field.channel));
            map.serialize_entry(field.name, &value)?;
        }
        map.serialize_entry(COM_STATUS_FIELD, &snapshot.com_status().code())?;
        map.serialize_entry(TIMESTAMP_FIELD, &format_timestamp(snapshot.timestamp()))?;
        map.end()
    }
}

/// Encode the snapshot into `buffer`, returning the payload length
pub fn encode(snapshot: &Snapshot, buffer: &mut PayloadBuffer) -> Result<usize> {
    buffer.write_json(&TelemetryDocument(snapshot))
}
