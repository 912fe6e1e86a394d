//! Tests for Recovery
//!
//! These tests verify:
//! - Rebuilding from an empty directory
//! - Last-write-wins within and across segments
//! - Tombstones removing keys across segments
//! - Numeric replay order past nine segments
//! - Corrupted records skipped without losing their neighbours
//! - Truncated tails ignored

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use mementokv::config::DEFAULT_TOMBSTONE;
use mementokv::keydir::KeyDirEntry;
use mementokv::record::{encode_record, HEADER_SIZE};
use mementokv::recovery::{Recovery, RecoveryResult};
use mementokv::segment::{segment_path, SegmentId};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().to_path_buf();
    (temp_dir, path)
}

/// Append records to a segment, returning each record's start offset
fn append_records(dir: &Path, id: u64, records: &[(&str, &str)]) -> Vec<u64> {
    let path = segment_path(dir, SegmentId::new(id));
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .unwrap();

    let mut offset = file.metadata().unwrap().len();
    let mut offsets = Vec::new();
    for (key, value) in records {
        let bytes = encode_record(key, value).unwrap();
        file.write_all(&bytes).unwrap();
        offsets.push(offset);
        offset += bytes.len() as u64;
    }
    offsets
}

fn rebuild(dir: &Path) -> (mementokv::keydir::KeyDir, RecoveryResult) {
    Recovery::rebuild_index(dir, DEFAULT_TOMBSTONE).unwrap()
}

// =============================================================================
// Clean Replay Tests
// =============================================================================

#[test]
fn test_rebuild_empty_directory() {
    let (_temp, path) = setup_temp_dir();

    let (keydir, result) = rebuild(&path);

    assert!(keydir.is_empty());
    assert_eq!(result, RecoveryResult::default());
}

#[test]
fn test_rebuild_records_header_offsets() {
    let (_temp, path) = setup_temp_dir();
    let offsets = append_records(&path, 1, &[("a", "alpha"), ("b", "bravo!")]);

    let (keydir, result) = rebuild(&path);

    assert_eq!(
        keydir.get("a"),
        Some(&KeyDirEntry::new(SegmentId::FIRST, offsets[0], 5))
    );
    assert_eq!(
        keydir.get("b"),
        Some(&KeyDirEntry::new(SegmentId::FIRST, offsets[1], 6))
    );
    assert_eq!(result.records_indexed, 2);
    assert_eq!(result.segments_scanned, 1);
}

#[test]
fn test_later_record_wins_within_segment() {
    let (_temp, path) = setup_temp_dir();
    let offsets = append_records(&path, 1, &[("k", "old"), ("k", "newer")]);

    let (keydir, _) = rebuild(&path);

    assert_eq!(keydir.len(), 1);
    assert_eq!(keydir.get("k").unwrap().offset, offsets[1]);
    assert_eq!(keydir.get("k").unwrap().value_size, 5);
}

#[test]
fn test_later_segment_wins() {
    let (_temp, path) = setup_temp_dir();
    append_records(&path, 1, &[("k", "from-one")]);
    append_records(&path, 2, &[("k", "from-two")]);

    let (keydir, _) = rebuild(&path);

    assert_eq!(keydir.get("k").unwrap().segment, SegmentId::new(2));
}

#[test]
fn test_numeric_order_beyond_nine_segments() {
    let (_temp, path) = setup_temp_dir();
    for id in 1..=11 {
        let value = format!("v{}", id);
        append_records(&path, id, &[("k", value.as_str())]);
    }

    let (keydir, result) = rebuild(&path);

    // Lexical order would replay file-9.log last
    assert_eq!(keydir.get("k").unwrap().segment, SegmentId::new(11));
    assert_eq!(result.segments_scanned, 11);
}

// =============================================================================
// Tombstone Tests
// =============================================================================

#[test]
fn test_tombstone_removes_key() {
    let (_temp, path) = setup_temp_dir();
    append_records(&path, 1, &[("k", "v"), ("other", "x"), ("k", DEFAULT_TOMBSTONE)]);

    let (keydir, result) = rebuild(&path);

    assert!(!keydir.contains_key("k"));
    assert!(keydir.contains_key("other"));
    assert_eq!(result.tombstones_applied, 1);
}

#[test]
fn test_tombstone_wins_across_segments() {
    let (_temp, path) = setup_temp_dir();
    append_records(&path, 1, &[("k", "v")]);
    append_records(&path, 2, &[("k", DEFAULT_TOMBSTONE)]);

    let (keydir, _) = rebuild(&path);

    assert!(keydir.is_empty());
}

#[test]
fn test_put_after_tombstone_revives_key() {
    let (_temp, path) = setup_temp_dir();
    append_records(&path, 1, &[("k", "v1"), ("k", DEFAULT_TOMBSTONE)]);
    append_records(&path, 2, &[("k", "v2")]);

    let (keydir, _) = rebuild(&path);

    assert_eq!(keydir.get("k").unwrap().segment, SegmentId::new(2));
}

#[test]
fn test_custom_tombstone_marker() {
    let (_temp, path) = setup_temp_dir();
    append_records(&path, 1, &[("k", "v"), ("k", "<deleted>")]);

    let (keydir, _) = Recovery::rebuild_index(&path, "<deleted>").unwrap();
    assert!(keydir.is_empty());

    let (keydir, _) = rebuild(&path);
    assert!(keydir.contains_key("k"));
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_corrupted_record_isolated() {
    let (_temp, path) = setup_temp_dir();
    let offsets = append_records(&path, 1, &[("k1", "value1"), ("bad", "value2"), ("k3", "value3")]);
    append_records(&path, 2, &[("k4", "value4")]);

    let seg = segment_path(&path, SegmentId::FIRST);
    let mut bytes = fs::read(&seg).unwrap();
    bytes[offsets[1] as usize + HEADER_SIZE + 3 + 1] ^= 0x01;
    fs::write(&seg, &bytes).unwrap();

    let (keydir, result) = rebuild(&path);

    assert_eq!(keydir.keys().collect::<Vec<_>>(), vec!["k1", "k3", "k4"]);
    assert_eq!(keydir.get("k3").unwrap().offset, offsets[2]);
    assert_eq!(result.records_corrupted, 1);
    assert_eq!(result.records_indexed, 3);
}

#[test]
fn test_truncated_tail_ignored() {
    let (_temp, path) = setup_temp_dir();
    append_records(&path, 1, &[("k1", "v1")]);

    let torn = encode_record("k2", "v2").unwrap();
    let seg = segment_path(&path, SegmentId::FIRST);
    let mut file = OpenOptions::new().append(true).open(&seg).unwrap();
    file.write_all(&torn[..torn.len() - 5]).unwrap();

    append_records(&path, 2, &[("k3", "v3")]);

    let (keydir, result) = rebuild(&path);

    assert_eq!(keydir.keys().collect::<Vec<_>>(), vec!["k1", "k3"]);
    assert_eq!(result.truncated_segments, 1);
    assert_eq!(result.torn_segments, vec![SegmentId::FIRST]);
    assert!(result.is_torn(SegmentId::FIRST));
    assert!(!result.is_torn(SegmentId::new(2)));
    assert_eq!(result.records_corrupted, 0);
}

#[test]
fn test_verify_matches_rebuild() {
    let (_temp, path) = setup_temp_dir();
    append_records(&path, 1, &[("a", "1"), ("a", DEFAULT_TOMBSTONE), ("b", "2")]);

    let result = Recovery::verify(&path, DEFAULT_TOMBSTONE).unwrap();
    let (_, expected) = rebuild(&path);

    assert_eq!(result, expected);
    assert_eq!(result.records_indexed, 2);
    assert_eq!(result.tombstones_applied, 1);
}
