//! MemTable implementation
//!
//! Skiplist-backed memtable over encoded internal keys.

use std::sync::Arc;

use tracing::debug;

use super::MemTableIter;
use crate::comparer::Comparer;
use crate::config::Config;
use crate::error::{AtlasError, Result};
use crate::iterator::{InternalIterator, InternalReader};
use crate::key::{split_encoded, InternalKey, InternalKeyKind};
use crate::skiplist::SkipList;

/// In-memory table for recent writes
///
/// Safe to call `get`, `set` and `new_iter` concurrently from many threads.
///
/// Memory consumption only grows, even when keys are deleted or overwritten
/// with shorter values. The engine decides when to stop writing to a
/// memtable, using [`approximate_memory_usage`](MemTable::approximate_memory_usage)
/// and [`is_empty`](MemTable::is_empty).
pub struct MemTable {
    comparer: Comparer,
    skl: SkipList,
    /// Footprint of the list with no entries
    empty_size: u32,
}

impl MemTable {
    /// Create an empty memtable sized by `config.arena_size`
    pub fn new(config: &Config) -> Self {
        let comparer = config.comparer;
        let arena_size = u32::try_from(config.arena_size).unwrap_or(u32::MAX);
        let skl = SkipList::new(
            arena_size,
            Arc::new(move |a: &[u8], b: &[u8]| comparer.compare_encoded(a, b)),
        );
        let empty_size = skl.size();

        debug!(
            arena_size = skl.arena_capacity(),
            comparer = comparer.name,
            "memtable created"
        );

        Self {
            comparer,
            skl,
            empty_size,
        }
    }

    /// Get the newest visible value for `key.user_key`
    ///
    /// Visibility is chosen by the sequence number embedded in `key`: the
    /// newest version at or below it is returned. Build the probe with
    /// [`InternalKey::lookup`]. A tombstone reads as [`AtlasError::NotFound`].
    pub fn get(&self, key: &InternalKey) -> Result<&[u8]> {
        let mut iter = self.skl.iter();
        if !iter.seek_ge(&key.encode()) {
            return Err(AtlasError::NotFound);
        }

        let (user_key, trailer) = split_encoded(iter.key());
        if !self.comparer.equal(&key.user_key, user_key) {
            return Err(AtlasError::NotFound);
        }
        if InternalKeyKind::from_u8(trailer as u8) == InternalKeyKind::Delete {
            return Err(AtlasError::NotFound);
        }
        Ok(iter.value())
    }

    /// Insert an entry
    ///
    /// Older versions of the same user key are kept. Fails with
    /// [`AtlasError::ArenaFull`] when the arena cannot hold the entry; the
    /// write is not retried and the memtable should be rotated.
    pub fn set(&self, key: &InternalKey, value: &[u8]) -> Result<()> {
        self.skl.add(&key.encode(), value).map_err(|err| {
            debug!(
                seq_num = key.seq_num(),
                usage = self.skl.size(),
                capacity = self.skl.arena_capacity(),
                "memtable arena exhausted"
            );
            err
        })
    }

    /// Get an unpositioned iterator over all entries
    pub fn new_iter(&self) -> MemTableIter<'_> {
        MemTableIter::new(self.skl.iter())
    }

    /// Get approximate memory usage in bytes
    ///
    /// This is the arena charge: the computed footprint of every node,
    /// sentinels included, not a measurement of heap allocations.
    pub fn approximate_memory_usage(&self) -> usize {
        self.skl.size() as usize
    }

    /// Check if no entry has ever been inserted
    pub fn is_empty(&self) -> bool {
        self.skl.size() == self.empty_size
    }

    /// The arena is released when the memtable is dropped, so there is
    /// nothing to do here.
    pub fn close(&self) -> Result<()> {
        Ok(())
    }

    pub fn comparer(&self) -> &Comparer {
        &self.comparer
    }
}

impl Default for MemTable {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl std::fmt::Debug for MemTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemTable")
            .field("comparer", &self.comparer)
            .field("skl", &self.skl)
            .field("empty_size", &self.empty_size)
            .finish()
    }
}

impl InternalReader for MemTable {
    fn get(&self, key: &InternalKey) -> Result<&[u8]> {
        MemTable::get(self, key)
    }

    fn new_iter(&self) -> Box<dyn InternalIterator + '_> {
        Box::new(MemTable::new_iter(self))
    }

    fn close(&self) -> Result<()> {
        MemTable::close(self)
    }
}
