//! SkipList Module
//!
//! Concurrent ordered map backing the memtable.
//!
//! ## Responsibilities
//! - Lock-free insertion from many threads
//! - Bidirectional cursors that tolerate concurrent inserts
//! - Fixed byte budget: inserts fail once the arena is exhausted
//!
//! Keys and values are opaque bytes here; the memtable owns the internal key
//! encoding and hands the list a comparison over encoded keys.

mod arena;
mod iter;
mod list;

pub use iter::SkipListIter;
pub use list::{KeyCompare, SkipList, MAX_HEIGHT};
