#![allow(dead_code)]

use meterlink::error::{MeterLinkError, Result};
use meterlink::modbus::{RegisterTransport, encode_f32_pair};
use meterlink::uplink::Uplink;
use std::collections::{HashMap, VecDeque};

/// In-memory meter answering reads from per-address queues
#[derive(Default)]
pub struct ScriptedTransport {
    pub connected: bool,
    pub connects: u32,
    pub disconnects: u32,
    pub reads: Vec<(u8, u16, u16)>,
    pub responses: HashMap<u16, VecDeque<Result<Vec<u16>>>>,
    /// Served when a queue is empty
    pub fallback: HashMap<u16, Vec<u16>>,
    last_error: Option<String>,
}

impl ScriptedTransport {
    pub fn push(&mut self, start: u16, response: Result<Vec<u16>>) {
        self.responses.entry(start).or_default().push_back(response);
    }

    pub fn always(&mut self, start: u16, registers: Vec<u16>) {
        self.fallback.insert(start, registers);
    }

    /// A meter whose three batches always answer with the given values
    pub fn healthy_meter(main: &[f32], power_quality: &[f32], neutral: f32) -> Self {
        let mut t = Self::default();
        t.always(19000, words(main));
        t.always(828, words(power_quality));
        t.always(10085, words(&[neutral]));
        t
    }
}

#[async_trait::async_trait]
impl RegisterTransport for ScriptedTransport {
    async fn connect(&mut self) -> Result<()> {
        self.connects += 1;
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn disconnect(&mut self) {
        self.disconnects += 1;
        self.connected = false;
    }

    async fn read_input_registers(
        &mut self,
        unit: u8,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>> {
        self.reads.push((unit, address, count));
        let scripted = self.responses.get_mut(&address).and_then(|q| q.pop_front());
        let result = match scripted {
            Some(result) => result,
            None => match self.fallback.get(&address) {
                Some(registers) => Ok(registers.clone()),
                None => Err(MeterLinkError::timeout("Read operation timeout")),
            },
        };
        if let Err(e) = &result {
            self.last_error = Some(e.to_string());
        }
        result
    }

    fn last_error(&self) -> Option<String> {
        self.last_error.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Telemetry(String),
    Properties(u32, String),
    CommandResponse(u32, u16, String),
}

/// Uplink that keeps every outbound message
#[derive(Default)]
pub struct RecordingUplink {
    pub sent: Vec<Sent>,
}

impl RecordingUplink {
    pub fn telemetry(&self) -> Vec<&str> {
        self.sent
            .iter()
            .filter_map(|s| match s {
                Sent::Telemetry(p) => Some(p.as_str()),
                _ => None,
            })
            .collect()
    }
}

fn text(payload: &[u8]) -> String {
    String::from_utf8(payload.to_vec()).unwrap()
}

#[async_trait::async_trait]
impl Uplink for RecordingUplink {
    async fn send_telemetry(&mut self, payload: &[u8]) -> Result<()> {
        self.sent.push(Sent::Telemetry(text(payload)));
        Ok(())
    }

    async fn send_properties_update(&mut self, request_id: u32, payload: &[u8]) -> Result<()> {
        self.sent.push(Sent::Properties(request_id, text(payload)));
        Ok(())
    }

    async fn send_command_response(
        &mut self,
        request_id: u32,
        status: u16,
        payload: &[u8],
    ) -> Result<()> {
        self.sent
            .push(Sent::CommandResponse(request_id, status, text(payload)));
        Ok(())
    }
}

pub fn words(values: &[f32]) -> Vec<u16> {
    values.iter().flat_map(|v| encode_f32_pair(*v)).collect()
}

/// Main block values in register order, each slot numbered from 1
pub fn numbered_main_block() -> Vec<f32> {
    (1..=61).map(|i| i as f32).collect()
}
