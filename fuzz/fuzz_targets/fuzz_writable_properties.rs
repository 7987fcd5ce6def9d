#![no_main]
use libfuzzer_sys::fuzz_target;
use meterlink::payload::{PayloadBuffer, PropertiesMessageKind, consume_writable_properties};
use meterlink::schedule::TelemetrySchedule;

fuzz_target!(|data: &[u8]| {
    let Ok(mut schedule) = TelemetrySchedule::new(60) else {
        return;
    };
    let mut buffer = PayloadBuffer::with_capacity(128);

    for kind in [
        PropertiesMessageKind::WritableUpdated,
        PropertiesMessageKind::GetResponse,
    ] {
        let before = schedule.clone();
        match consume_writable_properties(data, kind, &mut schedule, &mut buffer) {
            Ok(update) => assert!(update.has_ack() || schedule == before),
            Err(_) => assert_eq!(schedule, before),
        }
        assert!(buffer.len() < buffer.capacity());
    }
});
