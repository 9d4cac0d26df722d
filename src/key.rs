//! Internal Key Codec
//!
//! An internal key is a user key tagged with the sequence number of the write
//! and the kind of operation that produced it.
//!
//! ## Encoding
//! ```text
//! ┌──────────────────────┬──────────────────────────────────┐
//! │ User Key (n bytes)   │ Trailer (8 bytes, little endian) │
//! │                      │ ┌──────────────────┬───────────┐ │
//! │                      │ │ SeqNum (56 bits) │ Kind (8)  │ │
//! │                      │ └──────────────────┴───────────┘ │
//! └──────────────────────┴──────────────────────────────────┘
//! ```
//!
//! ## Ordering
//! User key ascending (per [`Comparer`]), then trailer descending. For one
//! user key the newest sequence number sorts first, and at equal sequence
//! numbers the larger kind sorts first.

use std::cmp::Ordering;

use bytes::{Buf, BufMut};

use crate::comparer::Comparer;

/// Sequence number assigned to each write
pub type SeqNum = u64;

/// Largest sequence number that fits in the trailer
pub const MAX_SEQ_NUM: SeqNum = (1 << 56) - 1;

/// Size of the encoded trailer
pub const TRAILER_LEN: usize = 8;

/// Operation that produced an internal key
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InternalKeyKind {
    /// Tombstone
    Delete = 0,

    /// A live value
    Set = 1,

    /// A merge operand
    Merge = 2,

    /// Range tombstone
    RangeDelete = 15,

    /// Seek sentinel. Sorts before every other kind at the same sequence
    /// number, so `(key, seq, Max)` finds the newest version at or below `seq`.
    Max = 17,

    /// Malformed encoding
    Invalid = 255,
}

impl InternalKeyKind {
    /// Map a trailer byte back to a kind. Unknown bytes are `Invalid`.
    pub fn from_u8(b: u8) -> Self {
        match b {
            0 => Self::Delete,
            1 => Self::Set,
            2 => Self::Merge,
            15 => Self::RangeDelete,
            17 => Self::Max,
            _ => Self::Invalid,
        }
    }
}

/// Decoded internal key
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct InternalKey {
    /// Key supplied by the user
    pub user_key: Vec<u8>,

    trailer: u64,
}

impl InternalKey {
    /// Create an internal key.
    ///
    /// `seq_num` values above [`MAX_SEQ_NUM`] are clamped to it, so
    /// `lookup(key, u64::MAX)` reads the newest version of `key`.
    pub fn new(user_key: impl Into<Vec<u8>>, seq_num: SeqNum, kind: InternalKeyKind) -> Self {
        Self {
            user_key: user_key.into(),
            trailer: make_trailer(seq_num, kind),
        }
    }

    /// Probe key for reading `user_key` as of `seq_num`
    pub fn lookup(user_key: impl Into<Vec<u8>>, seq_num: SeqNum) -> Self {
        Self::new(user_key, seq_num, InternalKeyKind::Max)
    }

    pub fn seq_num(&self) -> SeqNum {
        self.trailer >> 8
    }

    pub fn kind(&self) -> InternalKeyKind {
        InternalKeyKind::from_u8(self.trailer as u8)
    }

    pub fn trailer(&self) -> u64 {
        self.trailer
    }

    pub fn encoded_len(&self) -> usize {
        self.user_key.len() + TRAILER_LEN
    }

    /// Append the encoding to `buf`
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.reserve(self.encoded_len());
        buf.put_slice(&self.user_key);
        buf.put_u64_le(self.trailer);
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        buf
    }

    /// Decode an encoded key. Never fails: a buffer shorter than the trailer
    /// becomes the user key with kind `Invalid`.
    pub fn decode(encoded: &[u8]) -> Self {
        let mut key = Self::default();
        key.decode_from(encoded);
        key
    }

    /// Decode into `self`, reusing the user key allocation
    pub fn decode_from(&mut self, encoded: &[u8]) {
        let (user_key, trailer) = split_encoded(encoded);
        self.user_key.clear();
        self.user_key.extend_from_slice(user_key);
        self.trailer = trailer;
    }
}

/// Split an encoded key into user key and trailer without copying
pub fn split_encoded(encoded: &[u8]) -> (&[u8], u64) {
    match encoded.len().checked_sub(TRAILER_LEN) {
        Some(n) => {
            let (user_key, mut trailer) = encoded.split_at(n);
            (user_key, trailer.get_u64_le())
        }
        None => (encoded, InternalKeyKind::Invalid as u64),
    }
}

fn make_trailer(seq_num: SeqNum, kind: InternalKeyKind) -> u64 {
    (seq_num.min(MAX_SEQ_NUM) << 8) | kind as u64
}

impl Comparer {
    /// Total order over decoded internal keys
    pub fn compare_internal(&self, a: &InternalKey, b: &InternalKey) -> Ordering {
        self.compare(&a.user_key, &b.user_key)
            .then_with(|| b.trailer.cmp(&a.trailer))
    }

    /// Total order over encoded internal keys
    pub fn compare_encoded(&self, a: &[u8], b: &[u8]) -> Ordering {
        let (a_user, a_trailer) = split_encoded(a);
        let (b_user, b_trailer) = split_encoded(b);
        self.compare(a_user, b_user)
            .then_with(|| b_trailer.cmp(&a_trailer))
    }
}
