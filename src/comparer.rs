//! Key Comparer
//!
//! User-key ordering supplied by the engine. Every ordering decision in the
//! memtable goes through the [`Comparer`] held in its [`Config`](crate::Config);
//! there is no global comparator.

use std::cmp::Ordering;
use std::fmt;

/// Three-way comparison over user-key bytes
pub type CompareFn = fn(&[u8], &[u8]) -> Ordering;

/// A named user-key ordering
///
/// The name identifies the ordering so that data written under one comparer
/// is never read back under another.
#[derive(Clone, Copy)]
pub struct Comparer {
    /// Compares two user keys
    pub compare: CompareFn,

    /// Stable identifier for this ordering
    pub name: &'static str,
}

/// Lexicographic byte ordering
pub const DEFAULT_COMPARER: Comparer = Comparer {
    compare: bytewise_compare,
    name: "leveldb.BytewiseComparator",
};

fn bytewise_compare(a: &[u8], b: &[u8]) -> Ordering {
    a.cmp(b)
}

impl Comparer {
    /// Compare two user keys
    #[inline]
    pub fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        (self.compare)(a, b)
    }

    /// Whether two user keys are equal under this ordering
    #[inline]
    pub fn equal(&self, a: &[u8], b: &[u8]) -> bool {
        self.compare(a, b) == Ordering::Equal
    }
}

impl Default for Comparer {
    fn default() -> Self {
        DEFAULT_COMPARER
    }
}

impl fmt::Debug for Comparer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparer").field("name", &self.name).finish()
    }
}
