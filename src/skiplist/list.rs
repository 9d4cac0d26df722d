//! Arena-backed concurrent skiplist

use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crossbeam::utils::CachePadded;
use rand::Rng;

use super::arena::Arena;
use super::iter::SkipListIter;
use crate::error::Result;

/// Maximum tower height
pub const MAX_HEIGHT: usize = 20;

/// A node reaches level `h + 1` with probability `1 / BRANCHING`
const BRANCHING: u32 = 4;

/// Bytes charged for a node's fixed fields (key length, value length)
const NODE_HEADER_SIZE: u64 = 8;

/// Bytes charged per level (next and prev index)
const LINK_SIZE: u64 = 8;

/// Three-way comparison over raw keys
pub type KeyCompare = Arc<dyn Fn(&[u8], &[u8]) -> CmpOrdering + Send + Sync>;

struct Link {
    next: AtomicU32,
    prev: AtomicU32,
}

pub(super) struct Node {
    kv: Box<[u8]>,
    key_len: usize,
    tower: Box<[Link]>,
}

impl Node {
    fn new(key: &[u8], value: &[u8], height: usize) -> Self {
        let mut kv = Vec::with_capacity(key.len() + value.len());
        kv.extend_from_slice(key);
        kv.extend_from_slice(value);
        Self {
            kv: kv.into_boxed_slice(),
            key_len: key.len(),
            tower: (0..height)
                .map(|_| Link {
                    next: AtomicU32::new(0),
                    prev: AtomicU32::new(0),
                })
                .collect(),
        }
    }

    pub(super) fn key(&self) -> &[u8] {
        &self.kv[..self.key_len]
    }

    pub(super) fn value(&self) -> &[u8] {
        &self.kv[self.key_len..]
    }

    pub(super) fn next(&self, level: usize) -> u32 {
        self.tower[level].next.load(Ordering::Acquire)
    }

    pub(super) fn prev(&self, level: usize) -> u32 {
        self.tower[level].prev.load(Ordering::Acquire)
    }

    fn cas_next(&self, level: usize, old: u32, new: u32) -> bool {
        self.tower[level]
            .next
            .compare_exchange(old, new, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn cas_prev(&self, level: usize, old: u32, new: u32) -> bool {
        self.tower[level]
            .prev
            .compare_exchange(old, new, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

fn node_footprint(height: usize, key_len: usize, value_len: usize) -> u64 {
    NODE_HEADER_SIZE + height as u64 * LINK_SIZE + key_len as u64 + value_len as u64
}

/// Lock-free ordered map over raw byte keys
///
/// ## Layout
/// Every node lives in an [`Arena`] slot and is addressed by its `u32` index.
/// Each level is a doubly linked list between the `head` and `tail` sentinels:
///
/// ```text
/// Level 2:  HEAD ◄──────────────────────► 30 ◄──────────────► TAIL
/// Level 1:  HEAD ◄────────► 20 ◄────────► 30 ◄──────────────► TAIL
/// Level 0:  HEAD ◄──► 10 ◄► 20 ◄──► 25 ◄► 30 ◄──► 40 ◄──────► TAIL
/// ```
///
/// ## Concurrency
/// - A node is fully written before it is linked at any level.
/// - `next` links are published with a CAS on the predecessor. Level 0 is the
///   linearization point of an insert.
/// - `prev` links trail the `next` links and are repaired by whichever
///   inserter notices them stale first.
///
/// Entries are never removed and the arena is never compacted, so memory use
/// only grows. Equal keys are kept; a later insert lands before earlier ones.
pub struct SkipList {
    arena: Arena<Node>,
    cmp: KeyCompare,
    head: u32,
    tail: u32,
    height: CachePadded<AtomicU32>,
}

impl SkipList {
    /// Create an empty list whose nodes must fit in `arena_size` bytes.
    ///
    /// The sentinels are charged against the arena, so the capacity is raised
    /// to at least their footprint.
    pub fn new(arena_size: u32, cmp: KeyCompare) -> Self {
        let sentinel = node_footprint(MAX_HEIGHT, 0, 0) as u32;
        let arena = Arena::new(arena_size.max(2 * sentinel));

        arena.charge(2 * sentinel);
        let head = arena.push(Node::new(&[], &[], MAX_HEIGHT));
        let tail = arena.push(Node::new(&[], &[], MAX_HEIGHT));

        let list = Self {
            arena,
            cmp,
            head,
            tail,
            height: CachePadded::new(AtomicU32::new(1)),
        };
        for level in 0..MAX_HEIGHT {
            list.node(head).tower[level].next.store(tail, Ordering::Relaxed);
            list.node(tail).tower[level].prev.store(head, Ordering::Relaxed);
        }
        list
    }

    /// Insert `key` with `value`.
    ///
    /// Returns [`ArenaFull`](crate::AtlasError::ArenaFull) when the node does not fit; the list
    /// and its footprint are unchanged in that case.
    pub fn add(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let height = random_height();
        self.arena
            .reserve(node_footprint(height, key.len(), value.len()))?;
        let nd = self.arena.push(Node::new(key, value, height));

        let list_height = self.raise_height(height);

        // Splice from the top so each level's search starts from the
        // predecessor found one level up.
        let mut prevs = [self.head; MAX_HEIGHT];
        let mut nexts = [self.tail; MAX_HEIGHT];
        let mut start = self.head;
        for level in (0..list_height).rev() {
            let (prev, next) = self.find_splice_for_level(key, level, start);
            prevs[level] = prev;
            nexts[level] = next;
            start = prev;
        }

        for level in 0..height {
            let (mut prev, mut next) = (prevs[level], nexts[level]);
            loop {
                let node = self.node(nd);
                node.tower[level].prev.store(prev, Ordering::Relaxed);
                node.tower[level].next.store(next, Ordering::Relaxed);

                // If next does not point back at prev, either its inserter has
                // not fixed the link yet, or another node now sits between
                // them. Help in the first case only.
                let next_prev = self.node(next).prev(level);
                if next_prev != prev && self.node(prev).next(level) == next {
                    self.node(next).cas_prev(level, next_prev, prev);
                }

                if self.node(prev).cas_next(level, next, nd) {
                    self.node(next).cas_prev(level, prev, nd);
                    break;
                }

                // Lost the race; everything new between prev and next is
                // still after prev, so search again from there.
                (prev, next) = self.find_splice_for_level(key, level, prev);
            }
        }

        Ok(())
    }

    /// Bytes charged against the arena, sentinels included
    pub fn size(&self) -> u32 {
        self.arena.size()
    }

    pub fn arena_capacity(&self) -> u32 {
        self.arena.capacity()
    }

    /// Unpositioned cursor over the list
    pub fn iter(&self) -> SkipListIter<'_> {
        SkipListIter::new(self)
    }

    pub(super) fn head(&self) -> u32 {
        self.head
    }

    pub(super) fn tail(&self) -> u32 {
        self.tail
    }

    pub(super) fn node(&self, idx: u32) -> &Node {
        match self.arena.get(idx) {
            Some(node) => node,
            None => unreachable!("skiplist node {idx} linked before it was stored"),
        }
    }

    /// Level-0 neighbours around `key`.
    ///
    /// With `inclusive == false` the result satisfies
    /// `prev < key <= next`; with `inclusive == true`, `prev <= key < next`.
    pub(super) fn find_splice(&self, key: &[u8], inclusive: bool) -> (u32, u32) {
        let mut prev = self.head;
        let mut next = self.tail;
        for level in (0..self.height.load(Ordering::Acquire) as usize).rev() {
            (prev, next) = self.walk_level(key, level, prev, inclusive);
        }
        (prev, next)
    }

    fn find_splice_for_level(&self, key: &[u8], level: usize, start: u32) -> (u32, u32) {
        self.walk_level(key, level, start, false)
    }

    fn walk_level(&self, key: &[u8], level: usize, start: u32, inclusive: bool) -> (u32, u32) {
        let mut prev = start;
        loop {
            let next = self.node(prev).next(level);
            if next == self.tail {
                return (prev, next);
            }
            let advance = match (self.cmp)(key, self.node(next).key()) {
                CmpOrdering::Greater => true,
                CmpOrdering::Equal => inclusive,
                CmpOrdering::Less => false,
            };
            if !advance {
                return (prev, next);
            }
            prev = next;
        }
    }

    /// Raise the list height to at least `height`; returns the new height
    fn raise_height(&self, height: usize) -> usize {
        let height = height as u32;
        let mut current = self.height.load(Ordering::Acquire);
        while height > current {
            match self.height.compare_exchange_weak(
                current,
                height,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return height as usize,
                Err(actual) => current = actual,
            }
        }
        current as usize
    }
}

fn random_height() -> usize {
    let mut rng = rand::thread_rng();
    let mut height = 1;
    while height < MAX_HEIGHT && rng.gen_ratio(1, BRANCHING) {
        height += 1;
    }
    height
}

impl std::fmt::Debug for SkipList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkipList")
            .field("size", &self.size())
            .field("capacity", &self.arena_capacity())
            .field("height", &self.height.load(Ordering::Relaxed))
            .finish()
    }
}
