//! Segment Module
//!
//! Append-only log files holding contiguous runs of records.
//!
//! ## Responsibilities
//! - Name segment files and parse ids back out of file names
//! - Discover segments on disk in numeric order
//! - Pick the active segment and rotate it by size
//! - Append records and read them back at a known offset
//! - Sequentially scan a segment for recovery
//!
//! ## Naming
//! Segments live in one flat directory as `file-<id>.log`. Ordering always
//! uses the parsed numeric id: `file-10.log` is newer than `file-2.log`
//! even though it sorts first as a string.

mod manager;
mod reader;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub use manager::SegmentManager;
pub use reader::{ScanItem, SegmentReader};

/// File name prefix shared by all segments
pub const SEGMENT_PREFIX: &str = "file-";

/// File name extension shared by all segments
pub const SEGMENT_EXTENSION: &str = ".log";

/// Numeric identity of a segment file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentId(u64);

impl SegmentId {
    /// Id used when the directory holds no segments yet
    pub const FIRST: SegmentId = SegmentId(1);

    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// The id that follows this one on rotation
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// "file-42.log"
    pub fn file_name(self) -> String {
        format!("{}{}{}", SEGMENT_PREFIX, self.0, SEGMENT_EXTENSION)
    }

    /// Parse an id from a segment file name
    /// "file-42.log" → Some(42)
    pub fn from_file_name(name: &str) -> Option<Self> {
        let digits = name
            .strip_prefix(SEGMENT_PREFIX)?
            .strip_suffix(SEGMENT_EXTENSION)?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        // Must round-trip through file_name(): "file-01.log" is not segment 1
        if digits.len() > 1 && digits.starts_with('0') {
            return None;
        }

        digits.parse().ok().map(Self)
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Path of the segment with the given id inside `dir`
pub fn segment_path(dir: &Path, id: SegmentId) -> PathBuf {
    dir.join(id.file_name())
}

/// All segment ids present in `dir`, oldest first
///
/// Files whose names do not match the segment pattern are ignored.
pub fn list_segments(dir: &Path) -> Result<Vec<SegmentId>> {
    let mut ids = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let name = entry.file_name();
        if let Some(id) = name.to_str().and_then(SegmentId::from_file_name) {
            ids.push(id);
        }
    }

    ids.sort_unstable();
    Ok(ids)
}
