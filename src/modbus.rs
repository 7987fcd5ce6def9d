//! Modbus TCP client for energy meter communication
//!
//! This module provides the blocking request/response boundary the
//! acquisition controller talks to ([`RegisterTransport`]) and its
//! tokio-modbus implementation, with bounded connect and request timeouts.

use crate::config::ModbusConfig;
use crate::error::{MeterLinkError, Result};
use crate::logging::get_logger;
use std::time::Duration;
use tokio::time::timeout;
use tokio_modbus::client::tcp;
use tokio_modbus::prelude::*;

pub mod decode;

pub use decode::{RegisterCursor, decode_f32_pair, encode_f32_pair};

/// Request/response channel to the meter
#[async_trait::async_trait]
pub trait RegisterTransport: Send {
    /// Establish (or re-establish) the connection to the configured endpoint
    async fn connect(&mut self) -> Result<()>;

    /// Whether a connection is currently held
    fn is_connected(&self) -> bool;

    /// Drop the connection, if any
    fn disconnect(&mut self);

    /// Read `count` input registers starting at `address` from `unit`
    async fn read_input_registers(&mut self, unit: u8, address: u16, count: u16)
    -> Result<Vec<u16>>;

    /// Description of the most recent failure, if any
    fn last_error(&self) -> Option<String>;
}

/// Modbus TCP client for the meter
pub struct ModbusClient {
    /// Modbus TCP client connection
    client: Option<tokio_modbus::client::Context>,

    /// Configuration
    config: ModbusConfig,

    /// Connection timeout
    connection_timeout: Duration,

    /// Operation timeout
    operation_timeout: Duration,

    /// Most recent failure description
    last_error: Option<String>,

    /// Logger
    logger: crate::logging::StructuredLogger,
}

impl ModbusClient {
    /// Create a new Modbus client
    pub fn new(config: &ModbusConfig) -> Self {
        let logger = get_logger("modbus");
        Self {
            client: None,
            config: config.clone(),
            connection_timeout: Duration::from_millis(config.connect_timeout_ms),
            operation_timeout: Duration::from_millis(config.request_timeout_ms),
            last_error: None,
            logger,
        }
    }

    fn fail(&mut self, err: MeterLinkError) -> MeterLinkError {
        let message = err.to_string();
        self.logger.error(&message);
        self.last_error = Some(message);
        err
    }

    /// Get client reference or error if not connected
    fn get_client(&mut self) -> Result<&mut tokio_modbus::client::Context> {
        self.client
            .as_mut()
            .ok_or_else(|| MeterLinkError::transport("Not connected to Modbus server"))
    }
}

#[async_trait::async_trait]
impl RegisterTransport for ModbusClient {
    async fn connect(&mut self) -> Result<()> {
        let address = format!("{}:{}", self.config.ip, self.config.port);

        self.logger
            .info(&format!("Connecting to Modbus server at {}", address));

        let socket_addr: std::net::SocketAddr = match address.parse() {
            Ok(addr) => addr,
            Err(e) => {
                let err = MeterLinkError::transport(format!("Invalid socket address: {}", e));
                return Err(self.fail(err));
            }
        };

        // Drop any stale context before dialing again
        self.client = None;

        match timeout(
            self.connection_timeout,
            tcp::connect_slave(socket_addr, Slave(self.config.unit_id)),
        )
        .await
        {
            Ok(Ok(client)) => {
                self.client = Some(client);
                self.logger.info("Successfully connected to Modbus server");
                Ok(())
            }
            Ok(Err(e)) => {
                let err =
                    MeterLinkError::transport(format!("Failed to connect to Modbus server: {}", e));
                Err(self.fail(err))
            }
            Err(_) => Err(self.fail(MeterLinkError::timeout("Connection timeout"))),
        }
    }

    fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    fn disconnect(&mut self) {
        if self.client.take().is_some() {
            self.logger.info("Disconnecting from Modbus server");
        }
    }

    async fn read_input_registers(
        &mut self,
        unit: u8,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>> {
        let timeout_duration = self.operation_timeout;

        self.logger.debug(&format!(
            "Reading {} input registers from address {} on unit {}",
            count, address, unit
        ));

        if !self.is_connected() {
            let err = MeterLinkError::transport("Not connected to Modbus server");
            return Err(self.fail(err));
        }
        let client = self.get_client()?;
        client.set_slave(Slave(unit));

        match timeout(timeout_duration, client.read_input_registers(address, count)).await {
            Ok(Ok(Ok(response))) => {
                self.logger.trace(&format!(
                    "Read {} registers: {:?}",
                    response.len(),
                    response
                ));
                Ok(response)
            }
            Ok(Ok(Err(exception))) => {
                let err = MeterLinkError::transport(format!(
                    "Modbus exception reading input registers: {:?}",
                    exception
                ));
                Err(self.fail(err))
            }
            Ok(Err(e)) => {
                // The connection is unusable after an I/O level failure
                self.client = None;
                let err =
                    MeterLinkError::transport(format!("Failed to read input registers: {}", e));
                Err(self.fail(err))
            }
            Err(_) => {
                self.client = None;
                Err(self.fail(MeterLinkError::timeout("Read operation timeout")))
            }
        }
    }

    fn last_error(&self) -> Option<String> {
        self.last_error.clone()
    }
}
