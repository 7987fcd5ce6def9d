//! Register batch layouts
//!
//! Each batch is one contiguous input-register read. Its layout lists, in
//! register order, what every two-register float is stored as.

use crate::config::RegistersConfig;
use crate::modbus::RegisterCursor;
use crate::telemetry::{Channel, MeasurementSet};

/// Destination of one decoded float
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Stored as read
    Direct(Channel),
    /// Read in Wh/VAh/varh, stored in kilo-units
    PerThousand(Channel),
    /// Consumed and discarded
    Reserved,
}

/// One contiguous register read and how to unpack it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionBatch {
    pub name: &'static str,
    pub start: u16,
    pub layout: &'static [Slot],
}

impl AcquisitionBatch {
    /// Registers requested for this batch, always two per slot
    pub fn count(&self) -> u16 {
        (self.layout.len() * 2) as u16
    }

    /// Decode `registers` through the layout into `set`.
    ///
    /// `registers` must hold exactly [`count`](Self::count) words.
    pub fn assign(&self, registers: &[u16], set: &mut MeasurementSet) {
        let mut cursor = RegisterCursor::new(registers);
        for slot in self.layout {
            let value = cursor.next_f32();
            match *slot {
                Slot::Direct(channel) => set.set(channel, value),
                Slot::PerThousand(channel) => set.set(channel, value / 1000.0),
                Slot::Reserved => {}
            }
        }
    }
}

use Slot::{Direct, PerThousand, Reserved};

/// Voltages, currents, powers, cos phi, frequency, energies and per-phase THD
pub const MAIN_BLOCK_LAYOUT: &[Slot] = &[
    Direct(Channel::VoltageL1N),
    Direct(Channel::VoltageL2N),
    Direct(Channel::VoltageL3N),
    Direct(Channel::VoltageL1L2),
    Direct(Channel::VoltageL2L3),
    Direct(Channel::VoltageL1L3),
    Direct(Channel::CurrentL1),
    Direct(Channel::CurrentL2),
    Direct(Channel::CurrentL3),
    Direct(Channel::CurrentTotal),
    Direct(Channel::RealPowerL1N),
    Direct(Channel::RealPowerL2N),
    Direct(Channel::RealPowerL3N),
    Direct(Channel::RealPowerTotal),
    Direct(Channel::ApparentPowerL1N),
    Direct(Channel::ApparentPowerL2N),
    Direct(Channel::ApparentPowerL3N),
    Direct(Channel::ApparentPowerTotal),
    Direct(Channel::ReactivePowerL1N),
    Direct(Channel::ReactivePowerL2N),
    Direct(Channel::ReactivePowerL3N),
    Direct(Channel::ReactivePowerTotal),
    Direct(Channel::CosPhiL1),
    Direct(Channel::CosPhiL2),
    Direct(Channel::CosPhiL3),
    Direct(Channel::Frequency),
    Direct(Channel::RotField),
    PerThousand(Channel::RealEnergyL1N),
    PerThousand(Channel::RealEnergyL2N),
    PerThousand(Channel::RealEnergyL3N),
    PerThousand(Channel::RealEnergyTotal),
    Reserved,
    Reserved,
    Reserved,
    Reserved,
    Reserved,
    Reserved,
    Reserved,
    Reserved,
    PerThousand(Channel::ApparentEnergyL1),
    PerThousand(Channel::ApparentEnergyL2),
    PerThousand(Channel::ApparentEnergyL3),
    PerThousand(Channel::ApparentEnergyTotal),
    PerThousand(Channel::ReactiveEnergyL1),
    PerThousand(Channel::ReactiveEnergyL2),
    PerThousand(Channel::ReactiveEnergyL3),
    PerThousand(Channel::ReactiveEnergyTotal),
    Reserved,
    Reserved,
    Reserved,
    Reserved,
    Reserved,
    Reserved,
    Reserved,
    Reserved,
    Direct(Channel::ThdVoltsL1N),
    Direct(Channel::ThdVoltsL2N),
    Direct(Channel::ThdVoltsL3N),
    Direct(Channel::ThdCurrentL1N),
    Direct(Channel::ThdCurrentL2N),
    Direct(Channel::ThdCurrentL3N),
];

/// Power factors and line-to-line voltage THD
pub const POWER_QUALITY_LAYOUT: &[Slot] = &[
    Direct(Channel::PowerFactorL1N),
    Direct(Channel::PowerFactorL2N),
    Direct(Channel::PowerFactorL3N),
    Direct(Channel::PowerFactorTotal),
    Direct(Channel::ThdVoltsL1L2),
    Direct(Channel::ThdVoltsL2L3),
    Direct(Channel::ThdVoltsL1L3),
    Reserved,
    Reserved,
    Reserved,
];

pub const NEUTRAL_CURRENT_LAYOUT: &[Slot] = &[Direct(Channel::CurrentNeutral)];

/// The three meter batches at their configured start addresses
pub fn default_batches(registers: &RegistersConfig) -> Vec<AcquisitionBatch> {
    vec![
        AcquisitionBatch {
            name: "main_block",
            start: registers.main_block,
            layout: MAIN_BLOCK_LAYOUT,
        },
        AcquisitionBatch {
            name: "power_quality",
            start: registers.power_quality,
            layout: POWER_QUALITY_LAYOUT,
        },
        AcquisitionBatch {
            name: "neutral_current",
            start: registers.neutral_current,
            layout: NEUTRAL_CURRENT_LAYOUT,
        },
    ]
}
