//! Engine Module
//!
//! The storage engine that coordinates all components.
//!
//! ## Responsibilities
//! - Run recovery on startup to rebuild the KeyDir
//! - Rotate the active segment and append records on put/delete
//! - Serve point reads through the KeyDir
//! - Surface corruption on live reads as a hard error

use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::{MementoError, Result};
use crate::keydir::{KeyDir, KeyDirEntry};
use crate::record::{decode_payload, encode_record};
use crate::recovery::{Recovery, RecoveryResult};
use crate::segment::{SegmentId, SegmentManager};

/// The main storage engine
///
/// ## Concurrency Model: single caller
///
/// Every operation runs to completion on the caller's thread, including
/// its file I/O. Writes take `&mut self`, so the borrow checker enforces
/// the one-writer rule; there are no locks and no background work.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Active segment pointer and segment I/O
    segments: SegmentManager,

    /// Location of the latest live record for every key
    keydir: KeyDir,

    /// Statistics from the most recent replay
    last_recovery: RecoveryResult,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Validate config and create the data directory
    /// 2. Pick the active segment (highest numeric id)
    /// 3. Replay all segments into the KeyDir
    /// 4. Move past the active segment if it ends in a partial record
    /// 5. Ready to serve requests
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        // Step 1: Create data directory if it doesn't exist
        fs::create_dir_all(&config.data_dir)?;

        // Step 2: Determine the active segment
        let mut segments = SegmentManager::open(&config.data_dir, config.max_segment_size)?;

        // Step 3: Rebuild the index from disk
        let (keydir, last_recovery) = Recovery::rebuild_index(&config.data_dir, &config.tombstone)?;

        // Step 4: Never append after a torn tail
        if last_recovery.is_torn(segments.active_segment()) {
            segments.retire_active();
        }

        tracing::info!(
            data_dir = %config.data_dir.display(),
            active_segment = %segments.active_segment(),
            segments = last_recovery.segments_scanned,
            keys = keydir.len(),
            corrupted = last_recovery.records_corrupted,
            "engine opened"
        );

        Ok(Self {
            config,
            segments,
            keydir,
            last_recovery,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Get a value by key
    ///
    /// Returns `Ok(None)` when the key has no live entry. A record that
    /// fails verification is reported as `DataCorruption`.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let entry = match self.keydir.get(key) {
            Some(entry) => *entry,
            None => return Ok(None),
        };

        let (header, payload) = match self.segments.read_at(entry.segment, entry.offset) {
            Ok(read) => read,
            Err(MementoError::MalformedHeader(reason)) => {
                tracing::error!(
                    key,
                    segment = %entry.segment,
                    offset = entry.offset,
                    "indexed record is incomplete on disk: {}",
                    reason
                );
                return Err(self.corruption(key, &entry));
            }
            Err(e) => return Err(e),
        };

        // The header must still describe the record the index recorded
        if header.value_size != entry.value_size || header.key_size as usize != key.len() {
            tracing::error!(
                key,
                segment = %entry.segment,
                offset = entry.offset,
                indexed_value_size = entry.value_size,
                header_value_size = header.value_size,
                header_key_size = header.key_size,
                "record header disagrees with the index"
            );
            return Err(self.corruption(key, &entry));
        }

        match decode_payload(&header, &payload) {
            Ok(record) if record.key == key => Ok(Some(record.value)),
            Ok(record) => {
                tracing::error!(
                    key,
                    found = %record.key,
                    segment = %entry.segment,
                    offset = entry.offset,
                    "index points at a record for a different key"
                );
                Err(self.corruption(key, &entry))
            }
            Err(MementoError::Corruption(reason)) => {
                tracing::error!(
                    key,
                    segment = %entry.segment,
                    offset = entry.offset,
                    "live read failed verification: {}",
                    reason
                );
                Err(self.corruption(key, &entry))
            }
            Err(e) => Err(e),
        }
    }

    /// Put a key-value pair
    ///
    /// Steps:
    /// 1. Rotate the active segment if it is full
    /// 2. Encode and append the record
    /// 3. Point the KeyDir at the new record
    pub fn put(&mut self, key: &str, value: &str) -> Result<()> {
        if value == self.config.tombstone {
            return Err(MementoError::ReservedValue);
        }

        let entry = self.append(key, value)?;
        self.keydir.insert(key.to_string(), entry);

        Ok(())
    }

    /// Delete a key
    ///
    /// Appends a tombstone and drops the key from the KeyDir. Deleting a key
    /// with no live entry writes nothing.
    pub fn delete(&mut self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(MementoError::EmptyKey);
        }
        if !self.keydir.contains_key(key) {
            return Ok(());
        }

        let tombstone = self.config.tombstone.clone();
        self.append(key, &tombstone)?;
        self.keydir.remove(key);

        Ok(())
    }

    /// Discard the in-memory index and replay all segments again
    pub fn rebuild_index(&mut self) -> Result<RecoveryResult> {
        let (keydir, result) =
            Recovery::rebuild_index(&self.config.data_dir, &self.config.tombstone)?;

        if result.is_torn(self.segments.active_segment()) {
            self.segments.retire_active();
        }

        self.keydir = keydir;
        self.last_recovery = result.clone();

        Ok(result)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.keydir.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keydir.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keydir.contains_key(key)
    }

    /// Live keys in sorted order
    pub fn keys(&self) -> Vec<String> {
        self.keydir.keys().map(str::to_string).collect()
    }

    /// Get the in-memory index
    pub fn keydir(&self) -> &KeyDir {
        &self.keydir
    }

    /// The segment the next write goes to (before any rotation check)
    pub fn active_segment(&self) -> SegmentId {
        self.segments.active_segment()
    }

    /// All segment ids on disk, oldest first
    pub fn segment_ids(&self) -> Result<Vec<SegmentId>> {
        self.segments.segment_ids()
    }

    /// Statistics from the last replay
    pub fn last_recovery(&self) -> &RecoveryResult {
        &self.last_recovery
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Shared write path for puts and tombstones
    fn append(&mut self, key: &str, value: &str) -> Result<KeyDirEntry> {
        if key.is_empty() {
            return Err(MementoError::EmptyKey);
        }

        let bytes = encode_record(key, value)?;
        let segment = self.segments.maybe_rotate()?;
        let offset = self.segments.append(&bytes)?;

        Ok(KeyDirEntry::new(segment, offset, value.len() as u32))
    }

    fn corruption(&self, key: &str, entry: &KeyDirEntry) -> MementoError {
        MementoError::DataCorruption {
            key: key.to_string(),
            segment: entry.segment,
            offset: entry.offset,
        }
    }
}
