//! Aggregate metrics computed from the raw channels once per cycle

use super::measurement::{Channel, MeasurementSet, UNKNOWN};

fn mean3(set: &MeasurementSet, a: Channel, b: Channel, c: Channel) -> f32 {
    (set.get(a) + set.get(b) + set.get(c)) / 3.0
}

/// Total real power over total apparent power, or the sentinel when undefined
pub fn power_factor_ratio(real_total: f32, apparent_total: f32) -> f32 {
    if apparent_total == 0.0 {
        return UNKNOWN;
    }
    let ratio = real_total / apparent_total;
    if ratio.is_finite() { ratio } else { UNKNOWN }
}

/// Populate the derived channels in place.
///
/// Unknown inputs are not filtered: a sentinel in a phase flows into the
/// average the same way a reading does.
pub fn compute_derived(set: &mut MeasurementSet) {
    let avg_voltage_ln = mean3(
        set,
        Channel::VoltageL1N,
        Channel::VoltageL2N,
        Channel::VoltageL3N,
    );
    let avg_voltage_ll = mean3(
        set,
        Channel::VoltageL1L2,
        Channel::VoltageL2L3,
        Channel::VoltageL1L3,
    );
    let avg_current = mean3(
        set,
        Channel::CurrentL1,
        Channel::CurrentL2,
        Channel::CurrentL3,
    );
    let avg_cos_phi = power_factor_ratio(
        set.get(Channel::RealPowerTotal),
        set.get(Channel::ApparentPowerTotal),
    );
    let avg_thd_volts_ln = mean3(
        set,
        Channel::ThdVoltsL1N,
        Channel::ThdVoltsL2N,
        Channel::ThdVoltsL3N,
    );
    let avg_thd_current_ln = mean3(
        set,
        Channel::ThdCurrentL1N,
        Channel::ThdCurrentL2N,
        Channel::ThdCurrentL3N,
    );
    let avg_thd_volts_ll = mean3(
        set,
        Channel::ThdVoltsL1L2,
        Channel::ThdVoltsL2L3,
        Channel::ThdVoltsL1L3,
    );

    set.set(Channel::AvgVoltageLN, avg_voltage_ln);
    set.set(Channel::AvgVoltageLL, avg_voltage_ll);
    set.set(Channel::AvgCurrentL, avg_current);
    set.set(Channel::AvgCosPhi, avg_cos_phi);
    set.set(Channel::AvgThdVoltsLN, avg_thd_volts_ln);
    set.set(Channel::AvgThdCurrentLN, avg_thd_current_ln);
    set.set(Channel::AvgThdVoltsLL, avg_thd_volts_ll);
}
