//! Writable property handling
//!
//! Inbound twin documents are parsed and validated completely before
//! anything is applied, so a rejected message leaves the schedule untouched.

use super::buffer::PayloadBuffer;
use crate::error::{MeterLinkError, Result};
use crate::logging::get_logger;
use crate::schedule::TelemetrySchedule;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const TELEMETRY_FREQUENCY_PROPERTY: &str = "telemetryFrequencySecs";
pub const VERSION_FIELD: &str = "$version";
pub const DESIRED_SECTION: &str = "desired";

/// Status code acknowledging an accepted property
pub const ACK_STATUS_SUCCESS: u16 = 200;

/// Which twin document the message is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertiesMessageKind {
    /// Desired-property patch; properties sit at the root
    WritableUpdated,
    /// Full twin; desired properties sit under `desired`
    GetResponse,
}

/// Outcome of one accepted properties message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyUpdate {
    pub version: i64,
    /// Newly applied telemetry interval, when the message carried one
    pub telemetry_frequency_secs: Option<u32>,
    /// Property paths that were skipped
    pub unrecognized: Vec<String>,
}

impl PropertyUpdate {
    /// Whether an acknowledgement was left in the buffer
    pub fn has_ack(&self) -> bool {
        self.telemetry_frequency_secs.is_some()
    }
}

#[derive(Serialize)]
struct Ack<'a, T> {
    ac: u16,
    av: i64,
    ad: &'a str,
    value: T,
}

/// Encode a successful writable-property acknowledgement
pub fn encode_ack(
    name: &str,
    value: i64,
    version: i64,
    buffer: &mut PayloadBuffer,
) -> Result<usize> {
    let ack = Ack {
        ac: ACK_STATUS_SUCCESS,
        av: version,
        ad: "success",
        value,
    };
    let mut document = BTreeMap::new();
    document.insert(name, ack);
    buffer.write_json(&document)
}

fn is_component(value: &Value) -> bool {
    value.get("__t").and_then(Value::as_str) == Some("c")
}

fn parse_interval(value: &Value) -> Result<u32> {
    let Value::Number(number) = value else {
        return Err(MeterLinkError::parse(format!(
            "{} must be an integer, got {}",
            TELEMETRY_FREQUENCY_PROPERTY, value
        )));
    };

    let out_of_range = || {
        MeterLinkError::out_of_range(
            TELEMETRY_FREQUENCY_PROPERTY.to_string(),
            format!("{} is outside 1..={}", number, i32::MAX),
        )
    };

    if let Some(secs) = number.as_i64() {
        if (1..=i64::from(i32::MAX)).contains(&secs) {
            return u32::try_from(secs).map_err(|_| out_of_range());
        }
        return Err(out_of_range());
    }
    if number.is_u64() {
        return Err(out_of_range());
    }
    Err(MeterLinkError::parse(format!(
        "{} must be an integer, got {}",
        TELEMETRY_FREQUENCY_PROPERTY, number
    )))
}

fn properties_section(root: &Value, kind: PropertiesMessageKind) -> Result<&Map<String, Value>> {
    let section = match kind {
        PropertiesMessageKind::WritableUpdated => root,
        PropertiesMessageKind::GetResponse => root
            .get(DESIRED_SECTION)
            .ok_or_else(|| MeterLinkError::parse("Twin document has no desired section"))?,
    };
    section
        .as_object()
        .ok_or_else(|| MeterLinkError::parse("Properties section is not an object"))
}

/// Decode a properties message and apply the telemetry interval it carries.
///
/// On success with a `telemetryFrequencySecs` field the schedule is updated
/// and `buffer` holds the acknowledgement; otherwise `buffer` is left empty.
/// Unknown fields, including component properties, are logged and skipped.
pub fn consume_writable_properties(
    message: &[u8],
    kind: PropertiesMessageKind,
    schedule: &mut TelemetrySchedule,
    buffer: &mut PayloadBuffer,
) -> Result<PropertyUpdate> {
    let logger = get_logger("properties");

    let root: Value = serde_json::from_slice(message)
        .map_err(|e| MeterLinkError::parse(format!("Malformed properties message: {}", e)))?;
    let properties = properties_section(&root, kind)?;

    let version = properties
        .get(VERSION_FIELD)
        .ok_or_else(|| MeterLinkError::parse("Properties message has no $version"))?
        .as_i64()
        .ok_or_else(|| MeterLinkError::parse("$version is not an integer"))?;

    let mut update = PropertyUpdate {
        version,
        ..Default::default()
    };

    for (name, value) in properties {
        if name.starts_with('$') {
            continue;
        }
        if name == TELEMETRY_FREQUENCY_PROPERTY {
            update.telemetry_frequency_secs = Some(parse_interval(value)?);
        } else if is_component(value) {
            if let Some(component) = value.as_object() {
                update.unrecognized.extend(
                    component
                        .keys()
                        .filter(|key| key.as_str() != "__t")
                        .map(|key| format!("{}.{}", name, key)),
                );
            }
        } else {
            update.unrecognized.push(name.clone());
        }
    }

    for path in &update.unrecognized {
        logger.warn(&format!("Unrecognized property {} ignored", path));
    }

    match update.telemetry_frequency_secs {
        Some(secs) => {
            encode_ack(
                TELEMETRY_FREQUENCY_PROPERTY,
                i64::from(secs),
                version,
                buffer,
            )?;
            schedule.set_interval_secs(secs)?;
            logger.info(&format!(
                "Telemetry interval set to {}s (version {})",
                secs, version
            ));
        }
        None => buffer.clear(),
    }

    Ok(update)
}
