//! Segment Manager
//!
//! Owns the active-segment pointer and performs all segment file I/O for
//! the engine.
//!
//! File handles are opened per call and dropped before returning; nothing
//! is held open between operations.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{MementoError, Result};
use crate::record::{RecordHeader, HEADER_SIZE};

use super::{list_segments, segment_path, SegmentId};

/// Tracks the active segment and rotates it by size
pub struct SegmentManager {
    /// Directory where segments are stored
    data_dir: PathBuf,

    /// The only segment that is ever appended to
    active: SegmentId,

    /// Rotation threshold in bytes
    max_segment_size: u64,
}

impl SegmentManager {
    /// Open the segment directory
    ///
    /// The active segment is the newest existing one, or `SegmentId::FIRST`
    /// for an empty directory.
    pub fn open(path: &Path, max_segment_size: u64) -> Result<Self> {
        let active = Self::latest_segment(path)?;

        Ok(Self {
            data_dir: path.to_path_buf(),
            active,
            max_segment_size,
        })
    }

    /// Newest segment in `dir` by numeric id, or the first id if none exist
    pub fn latest_segment(dir: &Path) -> Result<SegmentId> {
        Ok(list_segments(dir)?
            .last()
            .copied()
            .unwrap_or(SegmentId::FIRST))
    }

    /// Rotate the active segment if it has reached the size threshold
    ///
    /// Called once before every append. The returned id is the segment the
    /// next record goes to.
    pub fn maybe_rotate(&mut self) -> Result<SegmentId> {
        let size = self.segment_size(self.active)?;

        if size >= self.max_segment_size {
            let next = self.active.next();
            tracing::debug!(
                from = %self.active,
                to = %next,
                size,
                "rotating active segment"
            );
            self.active = next;
        }

        Ok(self.active)
    }

    /// Stop writing to the active segment and move to the next id
    ///
    /// Used when the active segment ends in a partial record: appending
    /// after torn bytes would make the new records unreadable on replay.
    pub fn retire_active(&mut self) -> SegmentId {
        let next = self.active.next();
        tracing::debug!(from = %self.active, to = %next, "retiring torn segment");
        self.active = next;
        self.active
    }

    /// Append an encoded record to the active segment
    ///
    /// Returns the offset at which the record starts, which is the
    /// segment's length before the write.
    pub fn append(&mut self, record: &[u8]) -> Result<u64> {
        let path = self.segment_path(self.active);
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

        let offset = file.metadata()?.len();
        file.write_all(record)?;
        file.flush()?;

        Ok(offset)
    }

    /// Read the raw header and payload of the record starting at `offset`
    pub fn read_at(&self, id: SegmentId, offset: u64) -> Result<(RecordHeader, Vec<u8>)> {
        let mut file = File::open(self.segment_path(id))?;
        let file_len = file.metadata()?.len();
        file.seek(SeekFrom::Start(offset))?;

        let mut header_bytes = [0u8; HEADER_SIZE];
        file.read_exact(&mut header_bytes).map_err(|e| {
            short_read(e, format!("record header at segment {} offset {}", id, offset))
        })?;
        let header = RecordHeader::decode(&header_bytes)?;

        // Don't trust the declared sizes further than the file reaches
        let available = file_len.saturating_sub(offset + HEADER_SIZE as u64);
        if header.payload_len() > available {
            return Err(MementoError::MalformedHeader(format!(
                "record at segment {} offset {} declares {} payload bytes, {} remain",
                id,
                offset,
                header.payload_len(),
                available
            )));
        }

        let mut payload = vec![0u8; header.payload_len() as usize];
        file.read_exact(&mut payload).map_err(|e| {
            short_read(e, format!("record payload at segment {} offset {}", id, offset))
        })?;

        Ok((header, payload))
    }

    /// Current on-disk size of a segment; 0 if it has not been created yet
    pub fn segment_size(&self, id: SegmentId) -> Result<u64> {
        match fs::metadata(self.segment_path(id)) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    /// All segment ids on disk, oldest first
    pub fn segment_ids(&self) -> Result<Vec<SegmentId>> {
        list_segments(&self.data_dir)
    }

    /// The segment currently receiving writes
    pub fn active_segment(&self) -> SegmentId {
        self.active
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get the rotation threshold
    pub fn max_segment_size(&self) -> u64 {
        self.max_segment_size
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn segment_path(&self, id: SegmentId) -> PathBuf {
        segment_path(&self.data_dir, id)
    }
}

/// Map an unexpected EOF to a malformed-header error, keep other I/O errors
fn short_read(err: io::Error, what: String) -> MementoError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        MementoError::MalformedHeader(format!("truncated {}", what))
    } else {
        MementoError::Io(err)
    }
}
