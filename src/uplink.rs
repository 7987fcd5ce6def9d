//! Upstream delivery boundary
//!
//! The gateway hands finished payloads to an [`Uplink`]; session handling,
//! framing and delivery guarantees belong to the implementation.

use crate::error::Result;
use crate::logging::{StructuredLogger, get_logger};

#[async_trait::async_trait]
pub trait Uplink: Send {
    /// Publish one telemetry message
    async fn send_telemetry(&mut self, payload: &[u8]) -> Result<()>;

    /// Report properties (device information or a writable-property ack)
    async fn send_properties_update(&mut self, request_id: u32, payload: &[u8]) -> Result<()>;

    /// Answer a command invocation
    async fn send_command_response(
        &mut self,
        request_id: u32,
        status: u16,
        payload: &[u8],
    ) -> Result<()>;
}

/// Uplink that writes every outbound message to the log
#[derive(Debug)]
pub struct LogUplink {
    logger: StructuredLogger,
    messages_sent: u64,
}

impl Default for LogUplink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogUplink {
    pub fn new() -> Self {
        Self {
            logger: get_logger("uplink"),
            messages_sent: 0,
        }
    }

    pub fn messages_sent(&self) -> u64 {
        self.messages_sent
    }

    fn record(&mut self, kind: &str, payload: &[u8]) {
        self.messages_sent = self.messages_sent.saturating_add(1);
        self.logger.info(&format!(
            "{} ({} bytes): {}",
            kind,
            payload.len(),
            String::from_utf8_lossy(payload)
        ));
    }
}

#[async_trait::async_trait]
impl Uplink for LogUplink {
    async fn send_telemetry(&mut self, payload: &[u8]) -> Result<()> {
        self.record("Telemetry", payload);
        Ok(())
    }

    async fn send_properties_update(&mut self, request_id: u32, payload: &[u8]) -> Result<()> {
        self.record(&format!("Properties update #{}", request_id), payload);
        Ok(())
    }

    async fn send_command_response(
        &mut self,
        request_id: u32,
        status: u16,
        payload: &[u8],
    ) -> Result<()> {
        self.record(
            &format!("Command response #{} status {}", request_id, status),
            payload,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_messages() {
        let mut uplink = LogUplink::new();
        uplink.send_telemetry(b"{}").await.unwrap();
        uplink.send_properties_update(3, b"{}").await.unwrap();
        uplink.send_command_response(4, 202, b"").await.unwrap();
        assert_eq!(uplink.messages_sent(), 3);
    }
}
