//! Configuration for MementoKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{MementoError, Result};

/// Default rotation threshold for the active segment (2 KB)
pub const DEFAULT_MAX_SEGMENT_SIZE: u64 = 2 * 1024;

/// Default value written to mark a key as deleted
pub const DEFAULT_TOMBSTONE: &str = "__tombstone__";

/// Main configuration for a MementoKV instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding every segment file.
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── file-1.log
    ///     ├── file-2.log
    ///     └── ...
    pub data_dir: PathBuf,

    /// Size (in bytes) at or above which the active segment is rotated
    /// before the next write. Segments are soft-capped: the record that
    /// crosses the threshold stays whole in the old segment.
    pub max_segment_size: u64,

    // -------------------------------------------------------------------------
    // Record Configuration
    // -------------------------------------------------------------------------
    /// Reserved value marking a logical delete
    pub tombstone: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./mementokv_data"),
            max_segment_size: DEFAULT_MAX_SEGMENT_SIZE,
            tombstone: DEFAULT_TOMBSTONE.to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that the configuration can drive an engine
    pub fn validate(&self) -> Result<()> {
        if self.max_segment_size == 0 {
            return Err(MementoError::Config(
                "max_segment_size must be greater than zero".to_string(),
            ));
        }
        if self.tombstone.is_empty() {
            return Err(MementoError::Config(
                "tombstone marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (holds all segments)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the segment rotation threshold (in bytes)
    pub fn max_segment_size(mut self, size: u64) -> Self {
        self.config.max_segment_size = size;
        self
    }

    /// Set the tombstone marker value
    pub fn tombstone(mut self, marker: impl Into<String>) -> Self {
        self.config.tombstone = marker.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
