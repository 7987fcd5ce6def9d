//! Register stream decoding
//!
//! The meter publishes every quantity as an IEEE-754 single-precision float
//! spread over two consecutive 16-bit input registers, most significant word
//! first.

use crate::error::{MeterLinkError, Result};

/// Sequential reader over a register response
#[derive(Debug, Clone)]
pub struct RegisterCursor<'a> {
    registers: &'a [u16],
    position: usize,
}

impl<'a> RegisterCursor<'a> {
    pub fn new(registers: &'a [u16]) -> Self {
        Self {
            registers,
            position: 0,
        }
    }

    /// Consume the next two registers and reinterpret them as an `f32`.
    ///
    /// The caller guarantees at least two unread registers; batch layouts are
    /// sized from the request, and responses are length-checked before
    /// decoding. A short stream decodes the missing words as zero.
    pub fn next_f32(&mut self) -> f32 {
        debug_assert!(self.remaining() >= 2, "register stream exhausted");
        let msb = self.registers.get(self.position).copied().unwrap_or(0);
        let lsb = self.registers.get(self.position + 1).copied().unwrap_or(0);
        self.position += 2;
        f32_from_words(msb, lsb)
    }

    /// Registers not yet consumed
    pub fn remaining(&self) -> usize {
        self.registers.len().saturating_sub(self.position)
    }

    /// Index of the next unread register
    pub fn position(&self) -> usize {
        self.position
    }
}

fn f32_from_words(msb: u16, lsb: u16) -> f32 {
    f32::from_bits((u32::from(msb) << 16) | u32::from(lsb))
}

/// Decode 32-bit float from two 16-bit registers (big-endian word order)
pub fn decode_f32_pair(registers: &[u16]) -> Result<f32> {
    match registers {
        [msb, lsb, ..] => Ok(f32_from_words(*msb, *lsb)),
        _ => Err(MeterLinkError::parse(
            "Insufficient registers for 32-bit float",
        )),
    }
}

/// Encode 32-bit float to two 16-bit registers (big-endian word order)
pub fn encode_f32_pair(value: f32) -> [u16; 2] {
    let bits = value.to_bits();
    [(bits >> 16) as u16, (bits & 0xFFFF) as u16]
}
