//! # MementoKV
//!
//! An embedded, single-node, log-structured key-value store:
//! - Append-only segment files with size-based rotation
//! - SHA-256 checksummed records
//! - In-memory KeyDir pointing at each key's latest record
//! - Crash recovery by replaying segments oldest to newest
//!
//! ## Architecture Overview
//!
//! ```text
//!            put / get / delete
//!                    │
//! ┌──────────────────▼──────────────────┐
//! │               Engine                │
//! └──────┬──────────────────────┬───────┘
//!        │                      │
//!        ▼                      ▼
//! ┌─────────────┐        ┌─────────────┐
//! │   KeyDir    │◄───────│  Recovery   │
//! │ (BTreeMap)  │ startup│  (replay)   │
//! └─────────────┘        └──────┬──────┘
//!                               │
//!        ┌──────────────────────┘
//!        ▼
//! ┌─────────────┐        ┌─────────────┐
//! │  Segments   │───────►│   Record    │
//! │ file-N.log  │        │   codec     │
//! └─────────────┘        └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use mementokv::{Config, Engine};
//!
//! let config = Config::builder().data_dir("./data").build();
//! let mut engine = Engine::open(config)?;
//!
//! engine.put("key1", "value")?;
//! assert_eq!(engine.get("key1")?, Some("value".to_string()));
//! engine.delete("key1")?;
//! assert_eq!(engine.get("key1")?, None);
//! # Ok::<(), mementokv::MementoError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod segment;
pub mod keydir;
pub mod recovery;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{MementoError, Result};
pub use config::Config;
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of MementoKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
