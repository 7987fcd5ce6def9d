#![no_main]
use libfuzzer_sys::fuzz_target;
use meterlink::acquisition::default_batches;
use meterlink::config::RegistersConfig;
use meterlink::telemetry::{MeasurementSet, compute_derived};

fuzz_target!(|data: &[u8]| {
    // Interpret the input as a u16 register stream in big-endian pairs
    let regs: Vec<u16> = data
        .chunks_exact(2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
        .collect();

    let _ = meterlink::modbus::decode_f32_pair(&regs);

    // Feed every batch whose size matches, then derive
    let mut set = MeasurementSet::new();
    for batch in default_batches(&RegistersConfig::default()) {
        if regs.len() >= usize::from(batch.count()) {
            batch.assign(&regs[..usize::from(batch.count())], &mut set);
        }
    }
    compute_derived(&mut set);
    assert!(set.iter().all(|(_, v)| v.is_finite()));
});
