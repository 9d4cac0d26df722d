//! # AtlasKV MemTable
//!
//! The in-memory write buffer of an LSM storage engine:
//! - Lock-free concurrent reads and writes, no caller-side locking
//! - Multi-version keys ordered by sequence number, newest first
//! - Tombstones that shadow older versions
//! - Bidirectional iterators that merge uniformly with other sorted sources
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Engine (not in this crate)                 │
//! │          point reads · buffered writes · rotation            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ get / set / new_iter
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        MemTable                              │
//! │        InternalKey encode/decode · tombstone checks          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ raw encoded keys
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  SkipList   │          │ MergingIter │
//!   │ (lock-free) │          │ (any mix of │
//!   └──────┬──────┘          │  sources)   │
//!          │                 └─────────────┘
//!          ▼
//!   ┌─────────────┐
//!   │    Arena    │
//!   │ (fixed size)│
//!   └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use atlaskv_memtable::{AtlasError, Config, InternalKey, InternalKeyKind, MemTable};
//!
//! let memtable = MemTable::new(&Config::default());
//! memtable.set(&InternalKey::new("a", 10, InternalKeyKind::Set), b"x").unwrap();
//! memtable.set(&InternalKey::new("a", 12, InternalKeyKind::Delete), b"").unwrap();
//!
//! assert_eq!(memtable.get(&InternalKey::lookup("a", 10)), Ok(&b"x"[..]));
//! assert_eq!(memtable.get(&InternalKey::lookup("a", 12)), Err(AtlasError::NotFound));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod comparer;
pub mod key;

pub mod skiplist;
pub mod memtable;
pub mod iterator;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use comparer::{Comparer, DEFAULT_COMPARER};
pub use config::Config;
pub use error::{AtlasError, Result};
pub use iterator::{InternalIterator, InternalReader, MergingIter};
pub use key::{InternalKey, InternalKeyKind, SeqNum, MAX_SEQ_NUM};
pub use memtable::{MemTable, MemTableIter};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
