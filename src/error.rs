//! Error types for MementoKV
//!
//! Provides a unified error type for all operations.
//!
//! A missing key is not an error: `Engine::get` returns `Ok(None)`.

use thiserror::Error;

use crate::segment::SegmentId;

/// Result type alias using MementoError
pub type Result<T> = std::result::Result<T, MementoError>;

/// Unified error type for MementoKV operations
#[derive(Debug, Error)]
pub enum MementoError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    /// Checksum mismatch or undecodable payload found by the record codec
    #[error("Record corruption detected: {0}")]
    Corruption(String),

    /// Header too short, or payload shorter than the header declares
    #[error("Malformed record header: {0}")]
    MalformedHeader(String),

    /// Key or value does not fit in a 32-bit length field
    #[error("{field} too large: {len} bytes exceeds the 32-bit length field")]
    RecordTooLarge { field: &'static str, len: usize },

    // -------------------------------------------------------------------------
    // Engine Errors
    // -------------------------------------------------------------------------
    /// A live read hit a record whose contents no longer match the index
    #[error("Data corruption for key {key:?} in segment {segment} at offset {offset}")]
    DataCorruption {
        key: String,
        segment: SegmentId,
        offset: u64,
    },

    #[error("Key must not be empty")]
    EmptyKey,

    #[error("Value is reserved as the tombstone marker")]
    ReservedValue,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
