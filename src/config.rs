//! Configuration for Strata
//!
//! Centralized configuration with sensible defaults.

use crate::error::{Result, StrataError};
use crate::table::CompressionCodec;

/// Main configuration for a Strata engine
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // MemTable Configuration
    // -------------------------------------------------------------------------
    /// Size of the active memtable (in bytes) at which it is frozen
    pub memtable_size_limit: usize,

    /// Number of frozen memtables tolerated before writes log backpressure
    /// warnings
    pub max_immutable_memtables: usize,

    // -------------------------------------------------------------------------
    // L0 / Compaction Configuration
    // -------------------------------------------------------------------------
    /// L0 length above which a compaction should be scheduled
    pub l0_max_tables: usize,

    // -------------------------------------------------------------------------
    // Table Configuration
    // -------------------------------------------------------------------------
    /// Codec handed to the flusher for new tables
    pub compression_codec: CompressionCodec,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memtable_size_limit: 64 * 1024 * 1024, // 64 MB
            max_immutable_memtables: 4,
            l0_max_tables: 8,
            compression_codec: CompressionCodec::None,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.memtable_size_limit == 0 {
            return Err(StrataError::Config(
                "memtable_size_limit must be greater than zero".to_string(),
            ));
        }
        if self.max_immutable_memtables == 0 {
            return Err(StrataError::Config(
                "max_immutable_memtables must be at least 1".to_string(),
            ));
        }
        if self.l0_max_tables == 0 {
            return Err(StrataError::Config(
                "l0_max_tables must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the memtable size limit (in bytes)
    pub fn memtable_size_limit(mut self, size: usize) -> Self {
        self.config.memtable_size_limit = size;
        self
    }

    /// Set how many frozen memtables may queue before warnings
    pub fn max_immutable_memtables(mut self, count: usize) -> Self {
        self.config.max_immutable_memtables = count;
        self
    }

    /// Set the L0 length that triggers compaction
    pub fn l0_max_tables(mut self, count: usize) -> Self {
        self.config.l0_max_tables = count;
        self
    }

    /// Set the compression codec for new tables
    pub fn compression_codec(mut self, codec: CompressionCodec) -> Self {
        self.config.compression_codec = codec;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
