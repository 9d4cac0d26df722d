//! Iterator Module
//!
//! Capabilities shared by every sorted source of internal keys.
//!
//! The memtable implements both traits; on-disk tables and merged views plug
//! into the same seams so read and compaction paths can treat them uniformly.

mod merge;

pub use merge::MergingIter;

use crate::error::Result;
use crate::key::InternalKey;

/// Cursor over internal keys in ascending internal-key order
///
/// A fresh iterator is unpositioned. Positioning calls leave it either on a
/// valid entry or exhausted; `key` and `value` may only be called while
/// [`valid`](InternalIterator::valid) is true.
pub trait InternalIterator {
    /// Move to the first entry `>= key`
    fn seek_ge(&mut self, key: &InternalKey);

    /// Move to the last entry `<= key`
    fn seek_le(&mut self, key: &InternalKey);

    fn first(&mut self);

    fn last(&mut self);

    /// Advance; returns whether the new position is valid
    fn next(&mut self) -> bool;

    /// Step back; returns whether the new position is valid
    fn prev(&mut self) -> bool;

    /// Key at the current position. The reference is invalidated by the next
    /// positioning call.
    fn key(&mut self) -> &InternalKey;

    fn value(&self) -> &[u8];

    fn valid(&self) -> bool;

    /// Fault encountered while moving, if any
    fn error(&self) -> Result<()> {
        Ok(())
    }

    /// Release cursor resources. Idempotent.
    fn close(&mut self) -> Result<()>;
}

/// Point reads and cursor construction over a sorted source
pub trait InternalReader {
    /// Newest visible value for `key.user_key` at or below `key.seq_num()`
    fn get(&self, key: &InternalKey) -> Result<&[u8]>;

    fn new_iter(&self) -> Box<dyn InternalIterator + '_>;

    fn close(&self) -> Result<()>;
}
