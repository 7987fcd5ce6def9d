//! Batch acquisition controller
//!
//! One cycle resets the snapshot, reads every batch with bounded retries,
//! decodes the responses into the measurement set and computes the derived
//! metrics. A failing batch leaves its channels at the sentinel and degrades
//! the cycle status; it never aborts the cycle.

use crate::config::{ModbusConfig, RegistersConfig};
use crate::error::{MeterLinkError, Result};
use crate::logging::{StructuredLogger, get_device_logger, get_logger};
use crate::modbus::RegisterTransport;
use crate::telemetry::{ComStatus, Snapshot, compute_derived};
use chrono::Utc;

pub mod batches;

pub use batches::{AcquisitionBatch, Slot, default_batches};

/// Owns the transport and the snapshot it fills
pub struct AcquisitionController<T: RegisterTransport> {
    transport: T,
    unit: u8,
    connect_attempts: u32,
    request_attempts: u32,
    batches: Vec<AcquisitionBatch>,
    snapshot: Snapshot,
    logger: StructuredLogger,
}

impl<T: RegisterTransport> AcquisitionController<T> {
    /// Controller for the default meter batches
    pub fn new(transport: T, modbus: &ModbusConfig, registers: &RegistersConfig) -> Self {
        Self::with_batches(
            transport,
            modbus.unit_id,
            modbus.connect_attempts,
            modbus.request_attempts,
            default_batches(registers),
        )
    }

    pub fn with_batches(
        transport: T,
        unit: u8,
        connect_attempts: u32,
        request_attempts: u32,
        batches: Vec<AcquisitionBatch>,
    ) -> Self {
        Self {
            transport,
            unit,
            connect_attempts: connect_attempts.max(1),
            request_attempts: request_attempts.max(1),
            batches,
            snapshot: Snapshot::new(),
            logger: get_logger("acquisition"),
        }
    }

    /// Tag log lines with the device identity
    pub fn with_device(mut self, device: &str) -> Self {
        self.logger = get_device_logger("acquisition", device);
        self
    }

    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }

    /// Result of the most recent cycle
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Release the meter connection
    pub fn disconnect(&mut self) {
        self.transport.disconnect();
    }

    /// Run one full acquisition cycle and return the refreshed snapshot
    pub async fn run_cycle(&mut self) -> &Snapshot {
        self.snapshot.begin_cycle();

        let mut status = ComStatus::Unknown;
        for index in 0..self.batches.len() {
            let batch = self.batches[index];
            let succeeded = self.acquire_batch(batch, index == 0).await;
            status = status.record_batch(succeeded);
        }

        self.snapshot.set_com_status(status);
        compute_derived(self.snapshot.measurements_mut());

        self.logger.debug(&format!(
            "Acquisition cycle finished with comStatus {}",
            status.code()
        ));
        &self.snapshot
    }

    async fn ensure_connected(&mut self) {
        if self.transport.is_connected() {
            return;
        }
        for attempt in 1..=self.connect_attempts {
            match self.transport.connect().await {
                Ok(()) => return,
                Err(e) => self.logger.warn(&format!(
                    "Connect attempt {}/{} failed: {}",
                    attempt, self.connect_attempts, e
                )),
            }
        }
    }

    async fn read_batch(&mut self, batch: &AcquisitionBatch) -> Result<Vec<u16>> {
        let count = batch.count();
        let registers = self
            .transport
            .read_input_registers(self.unit, batch.start, count)
            .await?;
        if registers.len() != usize::from(count) {
            return Err(MeterLinkError::transport(format!(
                "Short response: expected {} registers, got {}",
                count,
                registers.len()
            )));
        }
        Ok(registers)
    }

    /// Returns whether the batch was read and decoded
    async fn acquire_batch(&mut self, batch: AcquisitionBatch, stamps_cycle: bool) -> bool {
        self.ensure_connected().await;

        for attempt in 1..=self.request_attempts {
            let outcome = self.read_batch(&batch).await;
            if stamps_cycle {
                self.snapshot.stamp(Utc::now());
            }

            match outcome {
                Ok(registers) => {
                    batch.assign(&registers, self.snapshot.measurements_mut());
                    self.logger.trace(&format!(
                        "Batch {} decoded {} registers from {}",
                        batch.name,
                        registers.len(),
                        batch.start
                    ));
                    return true;
                }
                Err(e) => {
                    self.logger.warn(&format!(
                        "Batch {} read attempt {}/{} failed: {} (transport: {})",
                        batch.name,
                        attempt,
                        self.request_attempts,
                        e,
                        self.transport.last_error().as_deref().unwrap_or("none")
                    ));
                    if let Err(e) = self.transport.connect().await {
                        self.logger.warn(&format!("Reconnect failed: {}", e));
                    }
                }
            }
        }

        self.logger.error(&format!(
            "Batch {} unavailable after {} attempts",
            batch.name, self.request_attempts
        ));
        false
    }
}
