//! Fixed-capacity output buffer shared by every encoder

use crate::error::{MeterLinkError, Result};
use serde::Serialize;
use std::io;

/// Reusable byte buffer with a hard size limit.
///
/// One byte of the capacity is reserved for the NUL terminator expected by
/// the upstream client, so a payload may use at most `capacity - 1` bytes.
/// After a failed encode the buffer is empty.
#[derive(Debug, Clone)]
pub struct PayloadBuffer {
    bytes: Vec<u8>,
    capacity: usize,
}

/// Writer that stores up to `limit` bytes and counts the rest
struct BoundedWriter<'a> {
    bytes: &'a mut Vec<u8>,
    limit: usize,
    written: usize,
}

impl io::Write for BoundedWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.limit.saturating_sub(self.bytes.len());
        let take = room.min(buf.len());
        self.bytes.extend_from_slice(&buf[..take]);
        self.written += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl PayloadBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Total size including the terminator byte
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Length of the current payload
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// The last successfully encoded payload
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes).unwrap_or_default()
    }

    /// Serialize `value` as compact JSON, replacing the previous payload.
    ///
    /// Returns the payload length in bytes.
    pub fn write_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<usize> {
        self.bytes.clear();
        let mut writer = BoundedWriter {
            bytes: &mut self.bytes,
            limit: self.capacity.saturating_sub(1),
            written: 0,
        };

        let outcome = serde_json::to_writer(&mut writer, value);
        let written = writer.written;

        if let Err(e) = outcome {
            self.bytes.clear();
            return Err(e.into());
        }
        if written + 1 > self.capacity {
            self.bytes.clear();
            return Err(MeterLinkError::capacity(written + 1, self.capacity));
        }
        Ok(self.bytes.len())
    }
}
