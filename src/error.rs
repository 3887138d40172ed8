//! Error types for Strata
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using StrataError
pub type Result<T> = std::result::Result<T, StrataError>;

/// Unified error type for Strata operations
#[derive(Debug, Error)]
pub enum StrataError {
    // -------------------------------------------------------------------------
    // Metadata Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt table metadata: {0}")]
    CorruptMetadata(String),

    // -------------------------------------------------------------------------
    // State Machine Errors
    // -------------------------------------------------------------------------
    /// Promotion was attempted for a memtable that is not at the front of
    /// the immutable queue.
    #[error("Stale flush target: memtable frozen at wal id {last_wal_id} is not the oldest immutable memtable")]
    StaleFlushTarget { last_wal_id: u64 },

    /// A compaction result does not line up with the live state history.
    #[error("State invariant violated: {0}")]
    InvariantViolation(String),

    // -------------------------------------------------------------------------
    // Collaborator Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Compaction error: {0}")]
    Compaction(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StrataError {
    /// Whether the error means persisted or in-memory state can no longer be
    /// trusted. Callers must not retry the operation that produced it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            StrataError::CorruptMetadata(_) | StrataError::InvariantViolation(_)
        )
    }
}

impl From<prost::DecodeError> for StrataError {
    fn from(e: prost::DecodeError) -> Self {
        StrataError::CorruptMetadata(e.to_string())
    }
}
