//! Error types for the AtlasKV memtable
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using AtlasError
pub type Result<T> = std::result::Result<T, AtlasError>;

/// Unified error type for memtable operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AtlasError {
    // -------------------------------------------------------------------------
    // Read Errors
    // -------------------------------------------------------------------------
    /// No visible, non-deleted version of the requested user key
    #[error("Key not found")]
    NotFound,

    // -------------------------------------------------------------------------
    // Write Errors
    // -------------------------------------------------------------------------
    /// The arena cannot hold the entry. The memtable must be rotated.
    #[error("Arena full: {requested} bytes requested, capacity is {capacity} bytes")]
    ArenaFull { requested: u64, capacity: u32 },

    // -------------------------------------------------------------------------
    // Traversal Errors
    // -------------------------------------------------------------------------
    /// Structural fault detected by an iterator while scanning
    #[error("Corruption detected: {0}")]
    Corruption(String),
}
