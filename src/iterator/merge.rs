//! Merging iterator
//!
//! Presents several sorted sources as one. Sources are scanned linearly to
//! pick the current entry, which suits the handful of memtables and tables a
//! read typically touches.

use tracing::trace;

use super::InternalIterator;
use crate::comparer::Comparer;
use crate::error::Result;
use crate::key::InternalKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Reverse,
}

/// Union of several [`InternalIterator`]s in internal-key order
///
/// Every entry of every source is yielded, tombstones and shadowed versions
/// included. Entries are ordered by `(internal key, source index)`: when two
/// sources hold an identical internal key the lower index comes first going
/// forward and last going backward.
pub struct MergingIter<'a> {
    comparer: Comparer,
    iters: Vec<Box<dyn InternalIterator + 'a>>,
    current: Option<usize>,
    direction: Direction,
    /// Copy of the current key
    key: InternalKey,
}

impl<'a> MergingIter<'a> {
    pub fn new(comparer: Comparer, iters: Vec<Box<dyn InternalIterator + 'a>>) -> Self {
        trace!(sources = iters.len(), comparer = comparer.name, "merging iterator created");
        Self {
            comparer,
            iters,
            current: None,
            direction: Direction::Forward,
            key: InternalKey::default(),
        }
    }

    /// Pick the source holding the smallest (forward) or largest (reverse)
    /// `(key, index)` pair
    fn find_current(&mut self) {
        let mut best = None;
        for (i, iter) in self.iters.iter_mut().enumerate() {
            if !iter.valid() {
                continue;
            }
            let key = iter.key();
            let better = match best {
                None => true,
                Some(_) => {
                    let ord = self.comparer.compare_internal(key, &self.key);
                    match self.direction {
                        Direction::Forward => ord.is_lt(),
                        // Later sources win ties going backward
                        Direction::Reverse => ord.is_ge(),
                    }
                }
            };
            if better {
                self.key.clone_from(key);
                best = Some(i);
            }
        }
        self.current = best;
    }

    fn find_smallest(&mut self) {
        self.direction = Direction::Forward;
        self.find_current();
    }

    fn find_largest(&mut self) {
        self.direction = Direction::Reverse;
        self.find_current();
    }
}

impl InternalIterator for MergingIter<'_> {
    fn seek_ge(&mut self, key: &InternalKey) {
        for iter in &mut self.iters {
            iter.seek_ge(key);
        }
        self.find_smallest();
    }

    fn seek_le(&mut self, key: &InternalKey) {
        for iter in &mut self.iters {
            iter.seek_le(key);
        }
        self.find_largest();
    }

    fn first(&mut self) {
        for iter in &mut self.iters {
            iter.first();
        }
        self.find_smallest();
    }

    fn last(&mut self) {
        for iter in &mut self.iters {
            iter.last();
        }
        self.find_largest();
    }

    fn next(&mut self) -> bool {
        let Some(current) = self.current else {
            return false;
        };

        // Coming from a reverse scan the other sources sit before the current
        // entry. Move each to its first entry after `(key, current)`: earlier
        // sources skip an equal key, later ones stay on it.
        if self.direction == Direction::Reverse {
            for (i, iter) in self.iters.iter_mut().enumerate() {
                if i == current {
                    continue;
                }
                iter.seek_ge(&self.key);
                if i < current {
                    while iter.valid()
                        && self.comparer.compare_internal(iter.key(), &self.key).is_eq()
                    {
                        iter.next();
                    }
                }
            }
        }

        self.iters[current].next();
        self.find_smallest();
        self.valid()
    }

    fn prev(&mut self) -> bool {
        let Some(current) = self.current else {
            return false;
        };

        // Coming from a forward scan the other sources sit after the current
        // entry. Move each to its last entry before `(key, current)`: earlier
        // sources stay on an equal key, later ones skip it.
        if self.direction == Direction::Forward {
            for (i, iter) in self.iters.iter_mut().enumerate() {
                if i == current {
                    continue;
                }
                if i < current {
                    iter.seek_le(&self.key);
                    continue;
                }
                iter.seek_ge(&self.key);
                if iter.valid() {
                    iter.prev();
                } else {
                    iter.last();
                }
            }
        }

        self.iters[current].prev();
        self.find_largest();
        self.valid()
    }

    fn key(&mut self) -> &InternalKey {
        &self.key
    }

    fn value(&self) -> &[u8] {
        match self.current {
            Some(i) => self.iters[i].value(),
            None => &[],
        }
    }

    fn valid(&self) -> bool {
        self.current.is_some()
    }

    fn error(&self) -> Result<()> {
        self.iters.iter().try_for_each(|iter| iter.error())
    }

    fn close(&mut self) -> Result<()> {
        let mut first_err = Ok(());
        for iter in &mut self.iters {
            let res = iter.close();
            if first_err.is_ok() {
                first_err = res;
            }
        }
        self.current = None;
        first_err
    }
}
