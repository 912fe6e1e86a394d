//! Segment Reader
//!
//! Sequential scan over every record in one segment, used by recovery.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use crate::error::{MementoError, Result};
use crate::record::{decode_payload, Record, RecordHeader, HEADER_SIZE};

use super::{segment_path, SegmentId};

/// One step of a segment scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanItem {
    /// A record that decoded and passed its checksum
    Record {
        /// Offset of the record's header within the segment
        offset: u64,
        header: RecordHeader,
        record: Record,
    },

    /// A complete record whose checksum (or UTF-8) check failed.
    /// The scan continues after it.
    Corrupt {
        offset: u64,
        /// Full on-disk length of the skipped record
        len: u64,
        /// Key bytes as far as they can be shown
        key: String,
        reason: String,
    },

    /// Trailing bytes too short to hold the record they start.
    /// Always the last item of a scan.
    Truncated {
        offset: u64,
        /// Bytes left in the segment from `offset`
        remaining: u64,
    },
}

/// Reads records from a segment file front to back
pub struct SegmentReader {
    id: SegmentId,
    reader: BufReader<File>,
    /// Offset of the next record header
    position: u64,
    file_len: u64,
    done: bool,
}

impl SegmentReader {
    /// Open a segment for scanning from offset 0
    pub fn open(dir: &Path, id: SegmentId) -> Result<Self> {
        let file = File::open(segment_path(dir, id))?;
        let file_len = file.metadata()?.len();

        Ok(Self {
            id,
            reader: BufReader::new(file),
            position: 0,
            file_len,
            done: false,
        })
    }

    /// Id of the segment being scanned
    pub fn segment_id(&self) -> SegmentId {
        self.id
    }

    /// Offset of the next record to be read
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Read the next item, or `None` at the end of valid data
    pub fn next_item(&mut self) -> Result<Option<ScanItem>> {
        if self.done {
            return Ok(None);
        }

        let offset = self.position;
        let remaining = self.file_len - offset;

        if remaining == 0 {
            self.done = true;
            return Ok(None);
        }

        if remaining < HEADER_SIZE as u64 {
            self.done = true;
            return Ok(Some(ScanItem::Truncated { offset, remaining }));
        }

        let mut header_bytes = [0u8; HEADER_SIZE];
        if !self.fill(&mut header_bytes)? {
            self.done = true;
            return Ok(Some(ScanItem::Truncated { offset, remaining }));
        }
        let header = RecordHeader::decode(&header_bytes)?;

        // Sizes reaching past the end of the file mean a torn trailing write
        if header.payload_len() > remaining - HEADER_SIZE as u64 {
            self.done = true;
            return Ok(Some(ScanItem::Truncated { offset, remaining }));
        }

        let mut payload = vec![0u8; header.payload_len() as usize];
        if !self.fill(&mut payload)? {
            self.done = true;
            return Ok(Some(ScanItem::Truncated { offset, remaining }));
        }

        self.position += header.record_len();

        let item = match decode_payload(&header, &payload) {
            Ok(record) => ScanItem::Record {
                offset,
                header,
                record,
            },
            Err(MementoError::Corruption(reason)) => {
                let key_end = (header.key_size as usize).min(payload.len());
                ScanItem::Corrupt {
                    offset,
                    len: header.record_len(),
                    key: String::from_utf8_lossy(&payload[..key_end]).into_owned(),
                    reason,
                }
            }
            Err(e) => return Err(e),
        };

        Ok(Some(item))
    }

    /// read_exact that reports a short file as `false` instead of an error
    fn fill(&mut self, buf: &mut [u8]) -> Result<bool> {
        match self.reader.read_exact(buf) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl Iterator for SegmentReader {
    type Item = Result<ScanItem>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_item() {
            Ok(item) => item.map(Ok),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
