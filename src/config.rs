//! Configuration for the AtlasKV memtable
//!
//! Centralized configuration with sensible defaults.

use crate::comparer::{Comparer, DEFAULT_COMPARER};

/// Default arena size: 4 MiB
pub const DEFAULT_ARENA_SIZE: usize = 4 << 20;

/// Main configuration for a memtable
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Arena Configuration
    // -------------------------------------------------------------------------
    /// Bytes available to one memtable's skiplist, sentinels included.
    /// Values above `u32::MAX` are clamped.
    pub arena_size: usize,

    // -------------------------------------------------------------------------
    // Ordering Configuration
    // -------------------------------------------------------------------------
    /// User-key ordering. Internal keys extend it with sequence number and
    /// kind.
    pub comparer: Comparer,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            arena_size: DEFAULT_ARENA_SIZE,
            comparer: DEFAULT_COMPARER,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the arena size (in bytes)
    pub fn arena_size(mut self, size: usize) -> Self {
        self.config.arena_size = size;
        self
    }

    /// Set the user-key comparer
    pub fn comparer(mut self, comparer: Comparer) -> Self {
        self.config.comparer = comparer;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
