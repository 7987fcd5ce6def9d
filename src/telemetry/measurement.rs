//! Named float channels of one acquisition cycle

/// Value of a channel that has not been populated in the current cycle
pub const UNKNOWN: f32 = -1.0;

/// Every quantity reported by the meter or derived from its readings.
///
/// Declaration order is the telemetry payload order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    VoltageL1N,
    VoltageL2N,
    VoltageL3N,
    AvgVoltageLN,
    VoltageL1L2,
    VoltageL2L3,
    VoltageL1L3,
    AvgVoltageLL,
    CurrentL1,
    CurrentL2,
    CurrentL3,
    CurrentNeutral,
    AvgCurrentL,
    CurrentTotal,
    RealPowerL1N,
    RealPowerL2N,
    RealPowerL3N,
    RealPowerTotal,
    ApparentPowerL1N,
    ApparentPowerL2N,
    ApparentPowerL3N,
    ApparentPowerTotal,
    ReactivePowerL1N,
    ReactivePowerL2N,
    ReactivePowerL3N,
    ReactivePowerTotal,
    CosPhiL1,
    CosPhiL2,
    CosPhiL3,
    AvgCosPhi,
    Frequency,
    RotField,
    RealEnergyL1N,
    RealEnergyL2N,
    RealEnergyL3N,
    RealEnergyTotal,
    ApparentEnergyL1,
    ApparentEnergyL2,
    ApparentEnergyL3,
    ApparentEnergyTotal,
    ReactiveEnergyL1,
    ReactiveEnergyL2,
    ReactiveEnergyL3,
    ReactiveEnergyTotal,
    ThdVoltsL1N,
    ThdVoltsL2N,
    ThdVoltsL3N,
    AvgThdVoltsLN,
    ThdCurrentL1N,
    ThdCurrentL2N,
    ThdCurrentL3N,
    AvgThdCurrentLN,
    ThdVoltsL1L2,
    ThdVoltsL2L3,
    ThdVoltsL1L3,
    AvgThdVoltsLL,
    PowerFactorL1N,
    PowerFactorL2N,
    PowerFactorL3N,
    PowerFactorTotal,
}

impl Channel {
    pub const COUNT: usize = 60;

    pub const ALL: [Channel; Channel::COUNT] = [
        Channel::VoltageL1N,
        Channel::VoltageL2N,
        Channel::VoltageL3N,
        Channel::AvgVoltageLN,
        Channel::VoltageL1L2,
        Channel::VoltageL2L3,
        Channel::VoltageL1L3,
        Channel::AvgVoltageLL,
        Channel::CurrentL1,
        Channel::CurrentL2,
        Channel::CurrentL3,
        Channel::CurrentNeutral,
        Channel::AvgCurrentL,
        Channel::CurrentTotal,
        Channel::RealPowerL1N,
        Channel::RealPowerL2N,
        Channel::RealPowerL3N,
        Channel::RealPowerTotal,
        Channel::ApparentPowerL1N,
        Channel::ApparentPowerL2N,
        Channel::ApparentPowerL3N,
        Channel::ApparentPowerTotal,
        Channel::ReactivePowerL1N,
        Channel::ReactivePowerL2N,
        Channel::ReactivePowerL3N,
        Channel::ReactivePowerTotal,
        Channel::CosPhiL1,
        Channel::CosPhiL2,
        Channel::CosPhiL3,
        Channel::AvgCosPhi,
        Channel::Frequency,
        Channel::RotField,
        Channel::RealEnergyL1N,
        Channel::RealEnergyL2N,
        Channel::RealEnergyL3N,
        Channel::RealEnergyTotal,
        Channel::ApparentEnergyL1,
        Channel::ApparentEnergyL2,
        Channel::ApparentEnergyL3,
        Channel::ApparentEnergyTotal,
        Channel::ReactiveEnergyL1,
        Channel::ReactiveEnergyL2,
        Channel::ReactiveEnergyL3,
        Channel::ReactiveEnergyTotal,
        Channel::ThdVoltsL1N,
        Channel::ThdVoltsL2N,
        Channel::ThdVoltsL3N,
        Channel::AvgThdVoltsLN,
        Channel::ThdCurrentL1N,
        Channel::ThdCurrentL2N,
        Channel::ThdCurrentL3N,
        Channel::AvgThdCurrentLN,
        Channel::ThdVoltsL1L2,
        Channel::ThdVoltsL2L3,
        Channel::ThdVoltsL1L3,
        Channel::AvgThdVoltsLL,
        Channel::PowerFactorL1N,
        Channel::PowerFactorL2N,
        Channel::PowerFactorL3N,
        Channel::PowerFactorTotal,
    ];

    /// Position of the channel in [`Channel::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Channels computed from other channels rather than read from the meter
    pub fn is_derived(self) -> bool {
        matches!(
            self,
            Channel::AvgVoltageLN
                | Channel::AvgVoltageLL
                | Channel::AvgCurrentL
                | Channel::AvgCosPhi
                | Channel::AvgThdVoltsLN
                | Channel::AvgThdCurrentLN
                | Channel::AvgThdVoltsLL
        )
    }
}

/// Latest value of every channel
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementSet {
    values: [f32; Channel::COUNT],
}

impl Default for MeasurementSet {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementSet {
    /// A set with every channel unknown
    pub fn new() -> Self {
        Self {
            values: [UNKNOWN; Channel::COUNT],
        }
    }

    /// Mark every channel unknown
    pub fn reset(&mut self) {
        self.values = [UNKNOWN; Channel::COUNT];
    }

    pub fn get(&self, channel: Channel) -> f32 {
        self.values[channel.index()]
    }

    /// Store a reading; NaN and infinities are stored as [`UNKNOWN`]
    pub fn set(&mut self, channel: Channel, value: f32) {
        self.values[channel.index()] = if value.is_finite() { value } else { UNKNOWN };
    }

    /// Whether the channel holds something other than the sentinel
    pub fn is_known(&self, channel: Channel) -> bool {
        self.get(channel) != UNKNOWN
    }

    /// Channels paired with their values, in payload order
    pub fn iter(&self) -> impl Iterator<Item = (Channel, f32)> + '_ {
        Channel::ALL.iter().map(move |&c| (c, self.get(c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_declaration_order() {
        for (i, channel) in Channel::ALL.iter().enumerate() {
            assert_eq!(channel.index(), i, "{:?}", channel);
        }
    }

    #[test]
    fn seven_channels_are_derived() {
        let derived = Channel::ALL.iter().filter(|c| c.is_derived()).count();
        assert_eq!(derived, 7);
    }

    #[test]
    fn new_and_reset_are_all_unknown() {
        let mut set = MeasurementSet::new();
        assert!(set.iter().all(|(_, v)| v == UNKNOWN));

        set.set(Channel::Frequency, 50.01);
        set.set(Channel::CurrentNeutral, 0.4);
        assert!(set.is_known(Channel::Frequency));

        set.reset();
        assert!(!set.is_known(Channel::Frequency));
        assert_eq!(set, MeasurementSet::new());
    }

    #[test]
    fn non_finite_readings_become_unknown() {
        let mut set = MeasurementSet::new();
        set.set(Channel::VoltageL1N, f32::NAN);
        set.set(Channel::VoltageL2N, f32::INFINITY);
        set.set(Channel::VoltageL3N, f32::NEG_INFINITY);
        set.set(Channel::Frequency, -0.0);

        assert_eq!(set.get(Channel::VoltageL1N), UNKNOWN);
        assert_eq!(set.get(Channel::VoltageL2N), UNKNOWN);
        assert_eq!(set.get(Channel::VoltageL3N), UNKNOWN);
        assert!(set.is_known(Channel::Frequency));
    }
}
