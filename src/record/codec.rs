//! Record codec
//!
//! Encoding and decoding of complete records, including checksum
//! computation and verification.

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::{BufMut, Bytes, BytesMut};
use sha2::{Digest, Sha256};

use crate::error::{MementoError, Result};

use super::{RecordHeader, CHECKSUM_SIZE, HEADER_SIZE};

/// A decoded, checksum-verified record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Write time in seconds since the Unix epoch
    pub timestamp: u64,

    pub key: String,

    /// Stored value; may be the tombstone marker
    pub value: String,
}

/// SHA-256 over `key ++ value`
pub fn compute_checksum(key: &[u8], value: &[u8]) -> [u8; CHECKSUM_SIZE] {
    let mut hasher = Sha256::new();
    hasher.update(key);
    hasher.update(value);
    hasher.finalize().into()
}

/// Encode a record stamped with the current time
pub fn encode_record(key: &str, value: &str) -> Result<Bytes> {
    encode_record_at(unix_timestamp(), key, value)
}

/// Encode a record with an explicit timestamp
///
/// Format: header (16) + key + value + checksum (32)
pub fn encode_record_at(timestamp: u64, key: &str, value: &str) -> Result<Bytes> {
    let key_bytes = key.as_bytes();
    let value_bytes = value.as_bytes();

    let key_size = length_field("key", key_bytes.len())?;
    let value_size = length_field("value", value_bytes.len())?;
    let header = RecordHeader::new(timestamp, key_size, value_size);

    let mut buf = BytesMut::with_capacity(header.record_len() as usize);
    buf.put_slice(&header.encode());
    buf.put_slice(key_bytes);
    buf.put_slice(value_bytes);
    buf.put_slice(&compute_checksum(key_bytes, value_bytes));

    Ok(buf.freeze())
}

/// Decode a record from its raw header bytes and the payload that follows
pub fn decode_record(header_bytes: &[u8], payload: &[u8]) -> Result<Record> {
    let header = RecordHeader::decode(header_bytes)?;
    decode_payload(&header, payload)
}

/// Decode and verify a payload against an already-parsed header
///
/// Returns `Corruption` when the stored checksum does not match the key and
/// value bytes, or when those bytes are not valid UTF-8.
pub fn decode_payload(header: &RecordHeader, payload: &[u8]) -> Result<Record> {
    if (payload.len() as u64) < header.payload_len() {
        return Err(MementoError::MalformedHeader(format!(
            "header declares {} payload bytes, only {} available",
            header.payload_len(),
            payload.len()
        )));
    }

    let key_end = header.key_size as usize;
    let value_end = key_end + header.value_size as usize;
    let key_bytes = &payload[..key_end];
    let value_bytes = &payload[key_end..value_end];
    let stored = &payload[value_end..value_end + CHECKSUM_SIZE];

    if compute_checksum(key_bytes, value_bytes).as_slice() != stored {
        return Err(MementoError::Corruption(format!(
            "checksum mismatch for key {:?}",
            String::from_utf8_lossy(key_bytes)
        )));
    }

    let key = String::from_utf8(key_bytes.to_vec())
        .map_err(|e| MementoError::Corruption(format!("key is not valid UTF-8: {}", e)))?;
    let value = String::from_utf8(value_bytes.to_vec())
        .map_err(|e| MementoError::Corruption(format!("value is not valid UTF-8: {}", e)))?;

    Ok(Record {
        timestamp: header.timestamp,
        key,
        value,
    })
}

impl Record {
    /// On-disk length of this record once encoded
    pub fn encoded_len(&self) -> u64 {
        (HEADER_SIZE + self.key.len() + self.value.len() + CHECKSUM_SIZE) as u64
    }
}

fn length_field(field: &'static str, len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| MementoError::RecordTooLarge { field, len })
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
