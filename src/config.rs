//! Configuration management for meterlink
//!
//! This module handles loading, validation, and management of the gateway
//! configuration from YAML files. The device identity selects one entry of
//! the `devices` table; nothing identity-specific is compiled in.

use crate::device::DeviceInfoRecord;
use crate::error::{MeterLinkError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Largest payload buffer the gateway will allocate (1 MiB)
pub const MAX_BUFFER_SIZE: usize = 1024 * 1024;

mod defaults;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Modbus TCP connection configuration
    pub modbus: ModbusConfig,

    /// Start addresses of the acquisition batches
    pub registers: RegistersConfig,

    /// Telemetry cadence and payload sizing
    pub telemetry: TelemetryConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Identity of this gateway; key into `devices`
    pub device: String,

    /// Device metadata per identity
    pub devices: BTreeMap<String, DeviceInfoRecord>,
}

/// Modbus TCP connection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModbusConfig {
    /// IP address of the energy meter
    pub ip: String,

    /// TCP port (typically 502)
    pub port: u16,

    /// Modbus unit address of the meter
    pub unit_id: u8,

    /// Connection establishment timeout in milliseconds
    pub connect_timeout_ms: u64,

    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Connect attempts before a batch is read anyway
    pub connect_attempts: u32,

    /// Read attempts per batch
    pub request_attempts: u32,
}

/// Input register start addresses, one per batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistersConfig {
    /// Voltages, currents, powers, energies and per-phase THD
    pub main_block: u16,

    /// Power factors and line-to-line voltage THD
    pub power_quality: u16,

    /// Neutral current
    pub neutral_current: u16,
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Seconds between telemetry sends; overridable remotely
    pub interval_secs: u32,

    /// Capacity of the shared payload buffer in bytes
    pub buffer_size: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Optional console-specific level
    pub console_level: Option<String>,

    /// Optional file-specific level
    pub file_level: Option<String>,

    /// Path to log file (its directory receives the rolling files)
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from `METERLINK_CONFIG` or the default locations
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os("METERLINK_CONFIG") {
            return Self::from_file(path);
        }

        let default_paths = [
            "meterlink.yaml",
            "/data/meterlink.yaml",
            "/etc/meterlink/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        // Fall back to default configuration
        Ok(Config::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Device metadata for the configured identity
    pub fn device_info(&self) -> Result<&DeviceInfoRecord> {
        self.devices.get(&self.device).ok_or_else(|| {
            MeterLinkError::config(format!(
                "No device entry for identity '{}'",
                self.device
            ))
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.modbus.ip.is_empty() {
            return Err(MeterLinkError::validation(
                "modbus.ip",
                "IP address cannot be empty",
            ));
        }

        if self.modbus.port == 0 {
            return Err(MeterLinkError::validation(
                "modbus.port",
                "Port must be greater than 0",
            ));
        }

        if self.modbus.connect_attempts == 0 || self.modbus.request_attempts == 0 {
            return Err(MeterLinkError::validation(
                "modbus.attempts",
                "Connect and request attempts must be at least 1",
            ));
        }

        if self.modbus.connect_timeout_ms == 0 || self.modbus.request_timeout_ms == 0 {
            return Err(MeterLinkError::validation(
                "modbus.timeouts",
                "Timeouts must be greater than 0",
            ));
        }

        if self.telemetry.interval_secs == 0 || self.telemetry.interval_secs > i32::MAX as u32 {
            return Err(MeterLinkError::validation(
                "telemetry.interval_secs",
                "Must be between 1 and 2147483647",
            ));
        }

        // Room for at least "{}" plus the terminator
        if self.telemetry.buffer_size < 3 || self.telemetry.buffer_size > MAX_BUFFER_SIZE {
            return Err(MeterLinkError::validation(
                "telemetry.buffer_size".to_string(),
                format!("Must be between 3 and {} bytes", MAX_BUFFER_SIZE),
            ));
        }

        if self.device.is_empty() {
            return Err(MeterLinkError::validation(
                "device",
                "Device identity cannot be empty",
            ));
        }

        if !self.devices.contains_key(&self.device) {
            return Err(MeterLinkError::validation(
                "devices",
                "No entry for the configured device identity",
            ));
        }

        Ok(())
    }
}
