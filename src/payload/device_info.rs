//! Device information reported property

use super::buffer::PayloadBuffer;
use crate::device::DeviceInfoRecord;
use crate::error::Result;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Component name of the device information interface
pub const COMPONENT_NAME: &str = "deviceInformation";

/// Component properties carry this marker so the hub can tell them apart
/// from root-level properties
pub const COMPONENT_MARKER: (&str, &str) = ("__t", "c");

struct Component<'a>(&'a DeviceInfoRecord);

impl Serialize for Component<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let fields = self.0.fields();
        let mut map = serializer.serialize_map(Some(fields.len() + 1))?;
        map.serialize_entry(COMPONENT_MARKER.0, COMPONENT_MARKER.1)?;
        for (name, value) in fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct DeviceInfoDocument<'a>(&'a DeviceInfoRecord);

impl Serialize for DeviceInfoDocument<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(COMPONENT_NAME, &Component(self.0))?;
        map.end()
    }
}

/// Encode the device information component into `buffer`
pub fn encode(record: &DeviceInfoRecord, buffer: &mut PayloadBuffer) -> Result<usize> {
    buffer.write_json(&DeviceInfoDocument(record))
}
