//! Gateway main loop
//!
//! The bridge owns the acquisition controller, the telemetry schedule, the
//! payload buffer and the uplink. Everything runs on one task, so a cycle
//! always completes before its snapshot is encoded and no two encoders ever
//! share the buffer.

use crate::acquisition::AcquisitionController;
use crate::device::DeviceInfoRecord;
use crate::error::Result;
use crate::logging::{StructuredLogger, get_device_logger, get_logger};
use crate::modbus::RegisterTransport;
use crate::payload::{self, PayloadBuffer, PropertiesMessageKind, PropertyUpdate};
use crate::schedule::TelemetrySchedule;
use crate::uplink::Uplink;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::time::{Duration, interval};

pub mod commands;

pub use commands::{Command, CommandRequest, CommandResponse, OutputState};

/// Request id used for the device information report sent at startup
pub const STARTUP_REQUEST_ID: u32 = 0;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Inbound traffic from the cloud session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeMessage {
    Command(CommandRequest),
    PropertiesUpdate {
        request_id: u32,
        payload: Vec<u8>,
        kind: PropertiesMessageKind,
    },
    DeviceInfoRequest {
        request_id: u32,
    },
}

pub struct Bridge<T: RegisterTransport, U: Uplink> {
    controller: AcquisitionController<T>,
    device_info: DeviceInfoRecord,
    schedule: TelemetrySchedule,
    buffer: PayloadBuffer,
    uplink: U,
    outputs: OutputState,
    telemetry_sent: u64,
    logger: StructuredLogger,
}

impl<T: RegisterTransport, U: Uplink> Bridge<T, U> {
    pub fn new(
        controller: AcquisitionController<T>,
        device_info: DeviceInfoRecord,
        schedule: TelemetrySchedule,
        buffer_capacity: usize,
        uplink: U,
    ) -> Self {
        Self {
            controller,
            device_info,
            schedule,
            buffer: PayloadBuffer::with_capacity(buffer_capacity),
            uplink,
            outputs: OutputState::default(),
            telemetry_sent: 0,
            logger: get_logger("bridge"),
        }
    }

    /// Tag log lines with the device identity
    pub fn with_device(mut self, device: &str) -> Self {
        self.logger = get_device_logger("bridge", device);
        self
    }

    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }

    pub fn controller(&self) -> &AcquisitionController<T> {
        &self.controller
    }

    pub fn schedule(&self) -> &TelemetrySchedule {
        &self.schedule
    }

    pub fn outputs(&self) -> &OutputState {
        &self.outputs
    }

    pub fn uplink(&self) -> &U {
        &self.uplink
    }

    /// Telemetry messages handed to the uplink so far
    pub fn telemetry_sent(&self) -> u64 {
        self.telemetry_sent
    }

    /// Acquire and publish telemetry when the interval has elapsed.
    ///
    /// Returns whether a message was sent. The send slot is consumed even
    /// when encoding fails, so a failing payload is retried one interval
    /// later rather than on every tick.
    pub async fn send_telemetry_if_due(&mut self, now: DateTime<Utc>) -> Result<bool> {
        if !self.schedule.is_due(now) {
            return Ok(false);
        }
        self.schedule.mark_sent(now);

        let snapshot = self.controller.run_cycle().await;
        if let Err(e) = payload::telemetry::encode(snapshot, &mut self.buffer) {
            self.logger
                .error(&format!("Failed to encode telemetry payload: {}", e));
            return Err(e);
        }

        self.uplink.send_telemetry(self.buffer.as_bytes()).await?;
        self.telemetry_sent = self.telemetry_sent.saturating_add(1);
        self.logger.debug(&format!(
            "Telemetry sent ({} bytes, comStatus {})",
            self.buffer.len(),
            self.controller.snapshot().com_status().code()
        ));
        Ok(true)
    }

    /// Report the device information component
    pub async fn send_device_info(&mut self, request_id: u32) -> Result<()> {
        if let Err(e) = payload::device_info::encode(&self.device_info, &mut self.buffer) {
            self.logger
                .error(&format!("Failed to encode device information: {}", e));
            return Err(e);
        }
        self.uplink
            .send_properties_update(request_id, self.buffer.as_bytes())
            .await
    }

    /// Execute a command and send its response
    pub async fn handle_command(&mut self, request: CommandRequest) -> Result<CommandResponse> {
        let response = match Command::parse(&request.name) {
            Some(command) => {
                let outcome = self.outputs.apply(command, &request.payload);
                self.logger
                    .info(&format!("Command {}: {}", request.name, outcome));
                CommandResponse::accepted()
            }
            None => {
                self.logger
                    .warn(&format!("Command not recognized: {}", request.name));
                CommandResponse::rejected()
            }
        };

        self.uplink
            .send_command_response(request.request_id, response.status, &response.payload)
            .await?;
        Ok(response)
    }

    /// Apply a writable-property message and acknowledge it
    pub async fn handle_properties_update(
        &mut self,
        request_id: u32,
        message: &[u8],
        kind: PropertiesMessageKind,
    ) -> Result<PropertyUpdate> {
        let update = match payload::consume_writable_properties(
            message,
            kind,
            &mut self.schedule,
            &mut self.buffer,
        ) {
            Ok(update) => update,
            Err(e) => {
                self.logger
                    .warn(&format!("Rejected properties message: {}", e));
                return Err(e);
            }
        };

        if update.has_ack() {
            self.uplink
                .send_properties_update(request_id, self.buffer.as_bytes())
                .await?;
        }
        Ok(update)
    }

    /// Dispatch one inbound message
    pub async fn handle_message(&mut self, message: BridgeMessage) -> Result<()> {
        match message {
            BridgeMessage::Command(request) => self.handle_command(request).await.map(|_| ()),
            BridgeMessage::PropertiesUpdate {
                request_id,
                payload,
                kind,
            } => self
                .handle_properties_update(request_id, &payload, kind)
                .await
                .map(|_| ()),
            BridgeMessage::DeviceInfoRequest { request_id } => {
                self.send_device_info(request_id).await
            }
        }
    }

    /// Run until `shutdown` fires or its sender is dropped
    pub async fn run(
        &mut self,
        mut inbound: mpsc::UnboundedReceiver<BridgeMessage>,
        mut shutdown: mpsc::UnboundedReceiver<()>,
    ) -> Result<()> {
        self.logger.info(&format!(
            "Bridge starting, telemetry every {}s",
            self.schedule.interval_secs()
        ));

        if let Err(e) = self.send_device_info(STARTUP_REQUEST_ID).await {
            self.logger
                .error(&format!("Initial device information report failed: {}", e));
        }

        let mut tick = interval(TICK_INTERVAL);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    if let Err(e) = self.send_telemetry_if_due(Utc::now()).await {
                        self.logger.error(&format!("Telemetry send failed: {}", e));
                    }
                }
                Some(message) = inbound.recv() => {
                    if let Err(e) = self.handle_message(message).await {
                        self.logger.error(&format!("Inbound message failed: {}", e));
                    }
                }
                _ = shutdown.recv() => {
                    self.logger.info("Shutdown signal received");
                    break;
                }
            }
        }

        self.controller.disconnect();
        self.logger.info(&format!(
            "Bridge stopped after {} telemetry messages",
            self.telemetry_sent
        ));
        Ok(())
    }
}
