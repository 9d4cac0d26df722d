//! MemTable Module
//!
//! In-memory data structure for recent writes.
//!
//! ## Responsibilities
//! - Lock-free concurrent reads and writes
//! - Multi-version storage: every `(user key, seq num, kind)` is kept
//! - Tombstones shadow older versions for point reads
//! - Memory accounting so the engine knows when to rotate
//! - Ordered, bidirectional iteration for reads, flush and compaction
//!
//! ## Data Structure Choice
//! An arena-backed skiplist over encoded internal keys:
//! - Inserts never block readers or each other
//! - Newest version of a key is the first entry at or after its lookup key
//! - Fixed arena budget bounds the memtable's size

mod iter;
mod table;

pub use iter::MemTableIter;
pub use table::MemTable;
