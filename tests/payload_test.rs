use chrono::{TimeZone, Utc};
use meterlink::device::DeviceInfoRecord;
use meterlink::error::MeterLinkError;
use meterlink::payload::{self, PayloadBuffer, Precision, TELEMETRY_FIELDS};
use meterlink::telemetry::{Channel, ComStatus, MeasurementSet, Snapshot, compute_derived};
use serde_json::Value;

fn sample_snapshot() -> Snapshot {
    let mut set = MeasurementSet::new();
    for (i, channel) in Channel::ALL.iter().enumerate() {
        set.set(*channel, 100.0 + i as f32 * 1.23456);
    }
    set.set(Channel::RealPowerTotal, 100.0);
    set.set(Channel::ApparentPowerTotal, 200.0);
    compute_derived(&mut set);
    let at = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();
    Snapshot::from_parts(set, ComStatus::Healthy, Some(at))
}

#[test]
fn telemetry_round_trip_keeps_order_and_precision() {
    let snapshot = sample_snapshot();
    let mut buffer = PayloadBuffer::with_capacity(4096);
    payload::telemetry::encode(&snapshot, &mut buffer).unwrap();

    let value: Value = serde_json::from_slice(buffer.as_bytes()).unwrap();
    let object = value.as_object().unwrap();

    let keys: Vec<&str> = object.keys().map(String::as_str).collect();
    let mut expected: Vec<&str> = TELEMETRY_FIELDS.iter().map(|f| f.name).collect();
    expected.push("comStatus");
    expected.push("timestamp");
    assert_eq!(keys, expected);

    for field in &TELEMETRY_FIELDS {
        let wire = object[field.name].as_f64().unwrap();
        let raw = snapshot.measurements().get(field.channel);
        assert_eq!(wire, field.precision.round(raw), "{}", field.name);
        let scale = 10f64.powi(field.precision.decimals());
        assert!(((wire * scale).round() - wire * scale).abs() < 1e-6, "{}", field.name);
    }

    assert_eq!(object["avgCosPhi"], 0.5);
    assert_eq!(object["comStatus"], 1);
    assert_eq!(object["timestamp"], "2023-11-14T22:13:20.000Z");
}

#[test]
fn telemetry_capacity_boundary() {
    let snapshot = sample_snapshot();
    let mut roomy = PayloadBuffer::with_capacity(4096);
    let len = payload::telemetry::encode(&snapshot, &mut roomy).unwrap();

    let mut exact = PayloadBuffer::with_capacity(len + 1);
    assert_eq!(payload::telemetry::encode(&snapshot, &mut exact).unwrap(), len);
    assert_eq!(exact.as_bytes(), roomy.as_bytes());

    let mut short = PayloadBuffer::with_capacity(len);
    let err = payload::telemetry::encode(&snapshot, &mut short).unwrap_err();
    match err {
        MeterLinkError::Capacity { required, capacity } => {
            assert_eq!(required, len + 1);
            assert_eq!(capacity, len);
        }
        other => panic!("unexpected error {other}"),
    }
    assert!(short.is_empty());
}

#[test]
fn failed_encode_leaves_snapshot_intact() {
    let snapshot = sample_snapshot();
    let copy = snapshot.clone();
    let mut tiny = PayloadBuffer::with_capacity(64);
    assert!(payload::telemetry::encode(&snapshot, &mut tiny).is_err());
    assert_eq!(snapshot, copy);
}

#[test]
fn unknown_snapshot_encodes_sentinels_and_epoch() {
    let mut set = MeasurementSet::new();
    compute_derived(&mut set);
    let snapshot = Snapshot::from_parts(set, ComStatus::Unknown, None);

    let mut buffer = PayloadBuffer::with_capacity(4096);
    payload::telemetry::encode(&snapshot, &mut buffer).unwrap();
    let value: Value = serde_json::from_slice(buffer.as_bytes()).unwrap();

    assert_eq!(value["voltageL1N"], -1.0);
    assert_eq!(value["realEnergyTotal"], -1.0);
    assert_eq!(value["comStatus"], -1);
    assert_eq!(value["timestamp"], "1970-01-01T00:00:00.000Z");
}

#[test]
fn precision_per_quantity() {
    let precision = |name: &str| {
        TELEMETRY_FIELDS
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.precision)
            .unwrap()
    };
    assert_eq!(precision("frequency"), Precision::Instant);
    assert_eq!(precision("THDCurrentL2N"), Precision::Instant);
    assert_eq!(precision("apparentEnergyL2"), Precision::Energy);
    assert_eq!(precision("reactiveEnergyTotal"), Precision::Energy);
}

#[test]
fn device_info_payload() {
    let record = DeviceInfoRecord {
        asset: "Compressor 2".to_string(),
        serial_number: "SN-0042".to_string(),
        tcp_port: "502".to_string(),
        ..Default::default()
    };
    let mut buffer = PayloadBuffer::with_capacity(4096);
    payload::device_info::encode(&record, &mut buffer).unwrap();

    let value: Value = serde_json::from_slice(buffer.as_bytes()).unwrap();
    let component = value["deviceInformation"].as_object().unwrap();
    let keys: Vec<&str> = component.keys().map(String::as_str).collect();
    let mut expected = vec!["__t"];
    expected.extend(record.fields().iter().map(|(name, _)| *name));
    assert_eq!(keys, expected);
    assert_eq!(component["__t"], "c");
    assert_eq!(component["serialNumber"], "SN-0042");
    assert_eq!(component["tcpPort"], "502");
    assert_eq!(component["customField3"], "");
}

#[test]
fn buffer_is_reused_between_payloads() {
    let mut buffer = PayloadBuffer::with_capacity(4096);
    payload::telemetry::encode(&sample_snapshot(), &mut buffer).unwrap();
    payload::encode_ack("telemetryFrequencySecs", 30, 2, &mut buffer).unwrap();
    assert_eq!(
        buffer.as_str(),
        r#"{"telemetryFrequencySecs":{"ac":200,"av":2,"ad":"success","value":30}}"#
    );
}
