mod common;

use chrono::Utc;
use common::{ScriptedTransport, numbered_main_block, words};
use meterlink::acquisition::AcquisitionController;
use meterlink::config::{ModbusConfig, RegistersConfig};
use meterlink::error::MeterLinkError;
use meterlink::modbus::RegisterTransport;
use meterlink::payload::{self, PayloadBuffer};
use meterlink::telemetry::{Channel, ComStatus, UNKNOWN};
use serde_json::Value;

fn controller(transport: ScriptedTransport) -> AcquisitionController<ScriptedTransport> {
    AcquisitionController::new(
        transport,
        &ModbusConfig::default(),
        &RegistersConfig::default(),
    )
}

#[tokio::test]
async fn main_block_slots_map_to_channels() {
    let t = ScriptedTransport::healthy_meter(&numbered_main_block(), &[0.5; 10], 4.5);
    let mut c = controller(t);
    let snapshot = c.run_cycle().await;
    let m = snapshot.measurements();

    assert_eq!(m.get(Channel::VoltageL1N), 1.0);
    assert_eq!(m.get(Channel::VoltageL1L3), 6.0);
    assert_eq!(m.get(Channel::CurrentTotal), 10.0);
    assert_eq!(m.get(Channel::RealPowerTotal), 14.0);
    assert_eq!(m.get(Channel::ApparentPowerTotal), 18.0);
    assert_eq!(m.get(Channel::ReactivePowerL1N), 19.0);
    assert_eq!(m.get(Channel::CosPhiL3), 25.0);
    assert_eq!(m.get(Channel::Frequency), 26.0);
    assert_eq!(m.get(Channel::RotField), 27.0);
    assert_eq!(m.get(Channel::RealEnergyL1N), 28.0 / 1000.0);
    assert_eq!(m.get(Channel::RealEnergyTotal), 31.0 / 1000.0);
    // Eight reserved slots sit between the real and apparent energies
    assert_eq!(m.get(Channel::ApparentEnergyL1), 40.0 / 1000.0);
    assert_eq!(m.get(Channel::ReactiveEnergyTotal), 47.0 / 1000.0);
    assert_eq!(m.get(Channel::ThdVoltsL1N), 56.0);
    assert_eq!(m.get(Channel::ThdCurrentL3N), 61.0);
    assert_eq!(m.get(Channel::CurrentNeutral), 4.5);
    assert_eq!(m.get(Channel::PowerFactorTotal), 0.5);

    assert_eq!(m.get(Channel::AvgVoltageLN), 2.0);
    assert_eq!(m.get(Channel::AvgVoltageLL), 5.0);
    assert_eq!(m.get(Channel::AvgCurrentL), 8.0);
    assert_eq!(m.get(Channel::AvgCosPhi), 14.0 / 18.0);
    assert_eq!(m.get(Channel::AvgThdVoltsLN), 57.0);
    assert_eq!(m.get(Channel::AvgThdCurrentLN), 60.0);
    assert_eq!(snapshot.com_status(), ComStatus::Healthy);
}

#[tokio::test]
async fn requests_use_configured_unit_and_batch_sizes() {
    let modbus = ModbusConfig {
        unit_id: 7,
        ..Default::default()
    };
    let registers = RegistersConfig {
        main_block: 100,
        power_quality: 200,
        neutral_current: 300,
    };
    let mut t = ScriptedTransport::default();
    t.always(100, words(&numbered_main_block()));
    t.always(200, words(&[1.0; 10]));
    t.always(300, words(&[2.0]));

    let mut c = AcquisitionController::new(t, &modbus, &registers);
    c.run_cycle().await;
    assert_eq!(
        c.transport().reads,
        vec![(7, 100, 122), (7, 200, 20), (7, 300, 2)]
    );
    assert_eq!(c.snapshot().com_status(), ComStatus::Healthy);
}

#[tokio::test]
async fn transport_failure_on_second_batch() {
    let mut t = ScriptedTransport::default();
    t.always(19000, words(&numbered_main_block()));
    t.always(10085, words(&[3.25]));
    for _ in 0..3 {
        t.push(828, Err(MeterLinkError::transport("exception IllegalDataAddress")));
    }

    let mut c = controller(t);
    let snapshot = c.run_cycle().await;
    let m = snapshot.measurements();

    assert_eq!(snapshot.com_status(), ComStatus::Degraded);
    assert_eq!(m.get(Channel::VoltageL2N), 2.0);
    assert_eq!(m.get(Channel::CurrentNeutral), 3.25);
    for channel in [
        Channel::PowerFactorL1N,
        Channel::PowerFactorL2N,
        Channel::PowerFactorL3N,
        Channel::PowerFactorTotal,
        Channel::ThdVoltsL1L2,
        Channel::ThdVoltsL2L3,
        Channel::ThdVoltsL1L3,
    ] {
        assert_eq!(m.get(channel), UNKNOWN, "{:?}", channel);
    }
    assert_eq!(
        c.transport().last_error(),
        Some("Transport error: exception IllegalDataAddress".to_string())
    );
}

#[tokio::test]
async fn recovered_batch_keeps_cycle_healthy() {
    let mut t = ScriptedTransport::healthy_meter(&numbered_main_block(), &[0.9; 10], 1.0);
    t.push(19000, Err(MeterLinkError::timeout("Read operation timeout")));
    t.push(19000, Ok(words(&[1.0; 3])));

    let mut c = controller(t);
    let before = Utc::now();
    let snapshot = c.run_cycle().await;
    assert_eq!(snapshot.com_status(), ComStatus::Healthy);
    assert_eq!(snapshot.measurements().get(Channel::VoltageL3N), 3.0);
    assert!(snapshot.timestamp().unwrap() >= before);

    let main_reads = c.transport().reads.iter().filter(|r| r.1 == 19000).count();
    assert_eq!(main_reads, 3);
}

#[tokio::test]
async fn timestamp_is_set_when_meter_is_silent() {
    let mut c = controller(ScriptedTransport::default());
    let snapshot = c.run_cycle().await;
    assert_eq!(snapshot.com_status(), ComStatus::Degraded);
    assert!(snapshot.timestamp().is_some());
    assert_eq!(snapshot.measurements().get(Channel::Frequency), UNKNOWN);
    // Sentinel inputs flow through the averages unchanged
    assert_eq!(snapshot.measurements().get(Channel::AvgVoltageLN), UNKNOWN);
}

#[tokio::test]
async fn non_finite_registers_report_the_sentinel() {
    let mut main = numbered_main_block();
    main[0] = f32::NAN;
    main[1] = f32::INFINITY;
    let t = ScriptedTransport::healthy_meter(&main, &[0.5; 10], 4.5);
    let mut c = controller(t);
    let snapshot = c.run_cycle().await;
    let m = snapshot.measurements();

    assert_eq!(m.get(Channel::VoltageL1N), UNKNOWN);
    assert_eq!(m.get(Channel::VoltageL2N), UNKNOWN);
    assert_eq!(m.get(Channel::AvgVoltageLN), (-1.0 - 1.0 + 3.0) / 3.0);

    let mut buffer = PayloadBuffer::with_capacity(4096);
    payload::telemetry::encode(snapshot, &mut buffer).unwrap();
    let value: Value = serde_json::from_slice(buffer.as_bytes()).unwrap();
    let object = value.as_object().unwrap();
    assert!(object.values().all(|v| !v.is_null()));
    assert_eq!(object["voltageL1N"], -1.0);
    assert_eq!(object["voltageL2N"], -1.0);
}
