//! Static device metadata reported to the device twin
//!
//! The record is loaded from configuration once at startup, keyed by device
//! identity, and never changes afterwards.

use serde::{Deserialize, Serialize};

/// Descriptive strings for one metered asset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceInfoRecord {
    pub asset: String,
    pub asset_comments: String,
    pub brand: String,
    pub identifier: String,
    pub location1: String,
    pub location2: String,
    pub location3: String,
    pub location4: String,
    pub num_phases: String,
    pub model: String,
    pub part_number: String,
    pub serial_number: String,
    pub com_type: String,
    pub ip_address: String,
    pub tcp_port: String,
    pub modbus_address: String,
    pub rtu_baudrate: String,
    pub rtu_parity: String,
    pub rtu_stop_bits: String,
    pub custom_field1: String,
    pub custom_field2: String,
    pub custom_field3: String,
    pub custom_field4: String,
}

impl DeviceInfoRecord {
    /// Wire name and value of every field, in reporting order
    pub fn fields(&self) -> [(&'static str, &str); 23] {
        [
            ("asset", self.asset.as_str()),
            ("assetComments", self.asset_comments.as_str()),
            ("brand", self.brand.as_str()),
            ("identifier", self.identifier.as_str()),
            ("location1", self.location1.as_str()),
            ("location2", self.location2.as_str()),
            ("location3", self.location3.as_str()),
            ("location4", self.location4.as_str()),
            ("numPhases", self.num_phases.as_str()),
            ("model", self.model.as_str()),
            ("partNumber", self.part_number.as_str()),
            ("serialNumber", self.serial_number.as_str()),
            ("comType", self.com_type.as_str()),
            ("ipAddress", self.ip_address.as_str()),
            ("tcpPort", self.tcp_port.as_str()),
            ("modbusAddress", self.modbus_address.as_str()),
            ("rtuBaudrate", self.rtu_baudrate.as_str()),
            ("rtuParity", self.rtu_parity.as_str()),
            ("rtuStopBits", self.rtu_stop_bits.as_str()),
            ("customField1", self.custom_field1.as_str()),
            ("customField2", self.custom_field2.as_str()),
            ("customField3", self.custom_field3.as_str()),
            ("customField4", self.custom_field4.as_str()),
        ]
    }
}
