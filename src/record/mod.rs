//! Record Module
//!
//! The atomic unit of durable storage. Records are only ever appended to a
//! segment, never rewritten in place.
//!
//! ## Responsibilities
//! - Encode the fixed header and variable-length payload
//! - SHA-256 checksum over key + value for corruption detection
//! - Decode and verify records read back from a segment
//!
//! ## File Format
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ Header (16 bytes, little-endian)                              │
//! │ ┌───────────────┬──────────────┬────────────────┐             │
//! │ │ Timestamp (8) │ KeySize (4)  │ ValueSize (4)  │             │
//! │ └───────────────┴──────────────┴────────────────┘             │
//! ├───────────────────────────────────────────────────────────────┤
//! │ Payload                                                       │
//! │ ┌───────────┬─────────────┬───────────────────────────┐       │
//! │ │ Key (KS)  │ Value (VS)  │ SHA-256(key ++ value) (32)│       │
//! │ └───────────┴─────────────┴───────────────────────────┘       │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! The checksum covers only the key and value bytes. A damaged header is
//! caught indirectly: wrong sizes slice the payload at the wrong places and
//! the digest no longer matches.

mod codec;
mod header;

pub use codec::{compute_checksum, decode_payload, decode_record, encode_record, encode_record_at, Record};
pub use header::RecordHeader;

/// Header size: Timestamp (8) + KeySize (4) + ValueSize (4) = 16 bytes
pub const HEADER_SIZE: usize = 16;

/// Size of the trailing SHA-256 checksum
pub const CHECKSUM_SIZE: usize = 32;
