use super::*;

pub(super) const DEFAULT_DEVICE: &str = "default";

impl Default for ModbusConfig {
    fn default() -> Self {
        Self {
            ip: "192.168.1.100".to_string(),
            port: 502,
            unit_id: 1,
            connect_timeout_ms: 5000,
            request_timeout_ms: 5000,
            connect_attempts: 3,
            request_attempts: 3,
        }
    }
}

impl Default for RegistersConfig {
    fn default() -> Self {
        Self {
            main_block: 19000,
            power_quality: 828,
            neutral_current: 10085,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            buffer_size: 4096,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            console_level: None,
            file_level: None,
            file: "/tmp/meterlink.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

fn default_device_record() -> DeviceInfoRecord {
    DeviceInfoRecord {
        asset: "Main distribution board".to_string(),
        brand: "Weidmüller".to_string(),
        num_phases: "3 phases".to_string(),
        model: "EM750-230".to_string(),
        part_number: "2540910000".to_string(),
        com_type: "Modbus TCP".to_string(),
        ip_address: "192.168.1.100".to_string(),
        tcp_port: "502".to_string(),
        modbus_address: "1".to_string(),
        ..Default::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut devices = BTreeMap::new();
        devices.insert(DEFAULT_DEVICE.to_string(), default_device_record());
        Self {
            modbus: ModbusConfig::default(),
            registers: RegistersConfig::default(),
            telemetry: TelemetryConfig::default(),
            logging: LoggingConfig::default(),
            device: DEFAULT_DEVICE.to_string(),
            devices,
        }
    }
}
