//! Record Header
//!
//! Fixed 16-byte prefix of every record.

use bytes::{Buf, BufMut};

use crate::error::{MementoError, Result};

use super::{CHECKSUM_SIZE, HEADER_SIZE};

/// Parsed record header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Write time in seconds since the Unix epoch (informational only)
    pub timestamp: u64,

    /// Length of the key in bytes
    pub key_size: u32,

    /// Length of the value in bytes
    pub value_size: u32,
}

impl RecordHeader {
    pub fn new(timestamp: u64, key_size: u32, value_size: u32) -> Self {
        Self {
            timestamp,
            key_size,
            value_size,
        }
    }

    /// Serialize to the on-disk layout
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        let mut buf = &mut out[..];
        buf.put_u64_le(self.timestamp);
        buf.put_u32_le(self.key_size);
        buf.put_u32_le(self.value_size);
        out
    }

    /// Parse a header from the first `HEADER_SIZE` bytes of `bytes`
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(MementoError::MalformedHeader(format!(
                "expected {} header bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        let mut buf = &bytes[..HEADER_SIZE];
        let timestamp = buf.get_u64_le();
        let key_size = buf.get_u32_le();
        let value_size = buf.get_u32_le();

        Ok(Self {
            timestamp,
            key_size,
            value_size,
        })
    }

    /// Bytes that follow the header: key + value + checksum
    pub fn payload_len(&self) -> u64 {
        self.key_size as u64 + self.value_size as u64 + CHECKSUM_SIZE as u64
    }

    /// Full on-disk length of the record this header introduces
    pub fn record_len(&self) -> u64 {
        HEADER_SIZE as u64 + self.payload_len()
    }
}
