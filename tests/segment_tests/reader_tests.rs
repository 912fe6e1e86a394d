//! Tests for SegmentReader
//!
//! These tests verify:
//! - Sequential scan yields every record with its start offset
//! - Corrupt records are reported without desynchronizing the scan
//! - Partial trailing writes end the scan

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use mementokv::record::{encode_record, HEADER_SIZE};
use mementokv::segment::{segment_path, ScanItem, SegmentId, SegmentReader};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().to_path_buf();
    (temp_dir, path)
}

/// Write records to segment 1, returning each record's start offset
fn write_records(dir: &Path, records: &[(&str, &str)]) -> Vec<u64> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(segment_path(dir, SegmentId::FIRST))
        .unwrap();

    let mut offsets = Vec::new();
    let mut offset = 0u64;
    for (key, value) in records {
        let bytes = encode_record(key, value).unwrap();
        file.write_all(&bytes).unwrap();
        offsets.push(offset);
        offset += bytes.len() as u64;
    }
    offsets
}

fn scan(dir: &Path) -> Vec<ScanItem> {
    SegmentReader::open(dir, SegmentId::FIRST)
        .unwrap()
        .map(|item| item.unwrap())
        .collect()
}

// =============================================================================
// Clean Scan Tests
// =============================================================================

#[test]
fn test_scan_empty_segment() {
    let (_temp, path) = setup_temp_dir();
    fs::File::create(segment_path(&path, SegmentId::FIRST)).unwrap();

    assert!(scan(&path).is_empty());
}

#[test]
fn test_scan_reports_record_offsets() {
    let (_temp, path) = setup_temp_dir();
    let offsets = write_records(&path, &[("a", "1"), ("bb", "22"), ("ccc", "333")]);

    let items = scan(&path);

    assert_eq!(items.len(), 3);
    for (item, expected) in items.iter().zip(&offsets) {
        match item {
            ScanItem::Record { offset, .. } => assert_eq!(offset, expected),
            other => panic!("Expected Record, got {:?}", other),
        }
    }

    match &items[1] {
        ScanItem::Record { header, record, .. } => {
            assert_eq!(record.key, "bb");
            assert_eq!(record.value, "22");
            assert_eq!(header.value_size, 2);
        }
        other => panic!("Expected Record, got {:?}", other),
    }
}

#[test]
fn test_position_advances_by_record_length() {
    let (_temp, path) = setup_temp_dir();
    write_records(&path, &[("key", "value")]);

    let mut reader = SegmentReader::open(&path, SegmentId::FIRST).unwrap();
    assert_eq!(reader.segment_id(), SegmentId::FIRST);
    assert_eq!(reader.position(), 0);

    reader.next_item().unwrap().unwrap();
    assert_eq!(reader.position(), (HEADER_SIZE + 3 + 5 + 32) as u64);
    assert!(reader.next_item().unwrap().is_none());
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_corrupt_record_is_skipped_in_place() {
    let (_temp, path) = setup_temp_dir();
    let offsets = write_records(&path, &[("k1", "v1"), ("k2", "v2"), ("k3", "v3")]);

    // Flip a byte inside k2's value
    let seg = segment_path(&path, SegmentId::FIRST);
    let mut bytes = fs::read(&seg).unwrap();
    let value_pos = offsets[1] as usize + HEADER_SIZE + 2;
    bytes[value_pos] ^= 0x40;
    fs::write(&seg, &bytes).unwrap();

    let items = scan(&path);

    assert_eq!(items.len(), 3);
    assert!(matches!(&items[0], ScanItem::Record { record, .. } if record.key == "k1"));
    match &items[1] {
        ScanItem::Corrupt { offset, len, key, .. } => {
            assert_eq!(*offset, offsets[1]);
            assert_eq!(*len, offsets[2] - offsets[1]);
            assert_eq!(key, "k2");
        }
        other => panic!("Expected Corrupt, got {:?}", other),
    }
    assert!(matches!(&items[2], ScanItem::Record { record, .. } if record.key == "k3"));
}

// =============================================================================
// Partial Write Tests
// =============================================================================

#[test]
fn test_partial_header_ends_scan() {
    let (_temp, path) = setup_temp_dir();
    write_records(&path, &[("k", "v")]);

    let seg = segment_path(&path, SegmentId::FIRST);
    let mut file = OpenOptions::new().append(true).open(&seg).unwrap();
    file.write_all(&[0u8; 8]).unwrap();

    let items = scan(&path);

    assert_eq!(items.len(), 2);
    assert!(matches!(items[0], ScanItem::Record { .. }));
    assert!(matches!(items[1], ScanItem::Truncated { remaining: 8, .. }));
}

#[test]
fn test_partial_payload_ends_scan() {
    let (_temp, path) = setup_temp_dir();
    write_records(&path, &[("k", "v")]);

    let partial = encode_record("next", "value").unwrap();
    let seg = segment_path(&path, SegmentId::FIRST);
    let mut file = OpenOptions::new().append(true).open(&seg).unwrap();
    file.write_all(&partial[..HEADER_SIZE + 4]).unwrap();

    let items = scan(&path);

    assert_eq!(items.len(), 2);
    match &items[1] {
        ScanItem::Truncated { remaining, .. } => {
            assert_eq!(*remaining, (HEADER_SIZE + 4) as u64)
        }
        other => panic!("Expected Truncated, got {:?}", other),
    }
}

#[test]
fn test_absurd_sizes_treated_as_truncation() {
    let (_temp, path) = setup_temp_dir();
    let seg = segment_path(&path, SegmentId::FIRST);

    let mut header = vec![0u8; HEADER_SIZE];
    header[8..12].copy_from_slice(&u32::MAX.to_le_bytes());
    header[12..16].copy_from_slice(&u32::MAX.to_le_bytes());
    fs::write(&seg, &header).unwrap();

    let items = scan(&path);

    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], ScanItem::Truncated { offset: 0, .. }));
}
