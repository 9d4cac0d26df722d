//! Arena
//!
//! Fixed byte budget plus index-addressed node storage.
//!
//! The arena is an accounting budget, not a memory region: each node still
//! owns its own heap allocations, and the budget is charged with the node's
//! computed footprint. Memory usage reported from it is an approximation.
//!
//! Slots live in segments of doubling length, allocated on first use, so an
//! index never moves once handed out. Each slot is written exactly once
//! before its index is shared with other threads.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use crossbeam::utils::CachePadded;

use crate::error::{AtlasError, Result};

/// Length of segment 0 (as a power of two)
const FIRST_SEGMENT_SHIFT: u32 = 5;

/// Enough segments to address every `u32` index
const SEGMENT_COUNT: usize = (u32::BITS + 1 - FIRST_SEGMENT_SHIFT) as usize;

type Segment<T> = Box<[OnceLock<T>]>;

pub struct Arena<T> {
    capacity: u32,
    used: CachePadded<AtomicU32>,
    next_slot: CachePadded<AtomicU32>,
    segments: Box<[OnceLock<Segment<T>>]>,
}

impl<T> Arena<T> {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            used: CachePadded::new(AtomicU32::new(0)),
            next_slot: CachePadded::new(AtomicU32::new(0)),
            segments: (0..SEGMENT_COUNT).map(|_| OnceLock::new()).collect(),
        }
    }

    /// Byte budget
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Bytes handed out so far
    pub fn size(&self) -> u32 {
        self.used.load(Ordering::Acquire)
    }

    /// Claim `bytes` of the budget. Fails without side effects when the
    /// budget cannot cover it.
    pub fn reserve(&self, bytes: u64) -> Result<()> {
        let full = || AtlasError::ArenaFull {
            requested: bytes,
            capacity: self.capacity,
        };
        let bytes = u32::try_from(bytes).map_err(|_| full())?;

        let mut used = self.used.load(Ordering::Relaxed);
        loop {
            let new_used = match used.checked_add(bytes) {
                Some(n) if n <= self.capacity => n,
                _ => return Err(full()),
            };
            match self.used.compare_exchange_weak(
                used,
                new_used,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Ok(()),
                Err(actual) => used = actual,
            }
        }
    }

    /// Charge `bytes` that were budgeted for when the arena was sized
    pub(crate) fn charge(&self, bytes: u32) {
        self.used.fetch_add(bytes, Ordering::AcqRel);
    }

    /// Store `value` in a fresh slot and return its index
    pub(crate) fn push(&self, value: T) -> u32 {
        let idx = self.next_slot.fetch_add(1, Ordering::Relaxed);
        let (segment, offset) = locate(idx);
        let slots = self.segments[segment].get_or_init(|| {
            (0..segment_len(segment)).map(|_| OnceLock::new()).collect()
        });
        // The index is fresh, so the slot is empty.
        let _ = slots[offset].set(value);
        idx
    }

    /// Slot contents, if `idx` has been pushed
    pub fn get(&self, idx: u32) -> Option<&T> {
        let (segment, offset) = locate(idx);
        self.segments[segment].get()?.get(offset)?.get()
    }
}

fn segment_len(segment: usize) -> usize {
    1 << (FIRST_SEGMENT_SHIFT as usize + segment)
}

fn locate(idx: u32) -> (usize, usize) {
    let pos = idx as u64 + (1 << FIRST_SEGMENT_SHIFT);
    let segment = (u64::BITS - 1 - pos.leading_zeros() - FIRST_SEGMENT_SHIFT) as usize;
    let offset = (pos - (1u64 << (FIRST_SEGMENT_SHIFT as usize + segment))) as usize;
    (segment, offset)
}
