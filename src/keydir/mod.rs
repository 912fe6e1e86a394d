//! KeyDir Module
//!
//! In-memory index mapping each live key to the on-disk location of its
//! most recent record.
//!
//! ## Responsibilities
//! - At most one entry per key
//! - Overwritten by every put, removed by every delete
//! - Fully rebuilt from segments by recovery at startup
//!
//! ## Data Structure Choice
//! A plain BTreeMap: the engine is single-threaded, so no locking, and
//! ordered keys keep listings deterministic.

mod table;

pub use table::KeyDir;

use crate::segment::SegmentId;

/// Location of a key's most recent live record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDirEntry {
    /// Segment holding the record
    pub segment: SegmentId,

    /// Offset of the record's header within the segment
    pub offset: u64,

    /// Length of the stored value in bytes
    pub value_size: u32,
}

impl KeyDirEntry {
    pub fn new(segment: SegmentId, offset: u64, value_size: u32) -> Self {
        Self {
            segment,
            offset,
            value_size,
        }
    }
}
