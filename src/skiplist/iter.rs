//! Skiplist cursor

use super::list::SkipList;

/// Bidirectional cursor over a [`SkipList`]
///
/// Positioned on the head sentinel before the first move and on the tail
/// sentinel once it runs off the end; both read as invalid.
pub struct SkipListIter<'a> {
    list: &'a SkipList,
    nd: u32,
}

impl<'a> SkipListIter<'a> {
    pub(super) fn new(list: &'a SkipList) -> Self {
        Self {
            list,
            nd: list.head(),
        }
    }

    /// Position at the first entry `>= key`
    pub fn seek_ge(&mut self, key: &[u8]) -> bool {
        let (_, next) = self.list.find_splice(key, false);
        self.nd = next;
        self.valid()
    }

    /// Position at the last entry `<= key`
    pub fn seek_le(&mut self, key: &[u8]) -> bool {
        let (prev, _) = self.list.find_splice(key, true);
        self.nd = prev;
        self.valid()
    }

    pub fn first(&mut self) -> bool {
        self.nd = self.list.node(self.list.head()).next(0);
        self.valid()
    }

    pub fn last(&mut self) -> bool {
        self.nd = self.list.node(self.list.tail()).prev(0);
        self.valid()
    }

    /// Advance one entry. A no-op returning `false` when not valid.
    pub fn next(&mut self) -> bool {
        if !self.valid() {
            return false;
        }
        self.nd = self.list.node(self.nd).next(0);
        self.valid()
    }

    /// Step back one entry. A no-op returning `false` when not valid.
    pub fn prev(&mut self) -> bool {
        if !self.valid() {
            return false;
        }
        self.nd = self.list.node(self.nd).prev(0);
        self.valid()
    }

    /// Raw key at the cursor; empty when not valid
    pub fn key(&self) -> &'a [u8] {
        self.list.node(self.nd).key()
    }

    /// Raw value at the cursor; empty when not valid
    pub fn value(&self) -> &'a [u8] {
        self.list.node(self.nd).value()
    }

    pub fn valid(&self) -> bool {
        self.nd != self.list.head() && self.nd != self.list.tail()
    }

    /// Return to the unpositioned state
    pub fn reset(&mut self) {
        self.nd = self.list.head();
    }
}
