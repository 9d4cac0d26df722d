//! MemTable iterator

use crate::error::Result;
use crate::iterator::InternalIterator;
use crate::key::InternalKey;
use crate::skiplist::SkipListIter;

/// Cursor over a [`MemTable`](super::MemTable)
///
/// Keys are decoded only when asked for, into a scratch key owned by the
/// iterator. Seek keys are encoded into a second scratch buffer. Both are
/// reused across calls.
///
/// Not meant to be shared between threads; each reader creates its own with
/// [`MemTable::new_iter`](super::MemTable::new_iter).
pub struct MemTableIter<'a> {
    iter: SkipListIter<'a>,
    ikey: InternalKey,
    seek_buf: Vec<u8>,
}

impl<'a> MemTableIter<'a> {
    pub(super) fn new(iter: SkipListIter<'a>) -> Self {
        Self {
            iter,
            ikey: InternalKey::default(),
            seek_buf: Vec::new(),
        }
    }

    fn encode_seek_key(&mut self, key: &InternalKey) {
        self.seek_buf.clear();
        key.encode_into(&mut self.seek_buf);
    }
}

impl InternalIterator for MemTableIter<'_> {
    fn seek_ge(&mut self, key: &InternalKey) {
        self.encode_seek_key(key);
        self.iter.seek_ge(&self.seek_buf);
    }

    fn seek_le(&mut self, key: &InternalKey) {
        self.encode_seek_key(key);
        self.iter.seek_le(&self.seek_buf);
    }

    fn first(&mut self) {
        self.iter.first();
    }

    fn last(&mut self) {
        self.iter.last();
    }

    fn next(&mut self) -> bool {
        self.iter.next()
    }

    fn prev(&mut self) -> bool {
        self.iter.prev()
    }

    fn key(&mut self) -> &InternalKey {
        self.ikey.decode_from(self.iter.key());
        &self.ikey
    }

    fn value(&self) -> &[u8] {
        self.iter.value()
    }

    fn valid(&self) -> bool {
        self.iter.valid()
    }

    fn close(&mut self) -> Result<()> {
        self.iter.reset();
        self.ikey = InternalKey::default();
        self.seek_buf = Vec::new();
        Ok(())
    }
}
