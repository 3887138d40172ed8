//! MemTable Module
//!
//! In-memory data structures for recent writes.
//!
//! ## Responsibilities
//! - Fast reads and writes in memory
//! - Single-writer/multi-reader access pattern
//! - Track size for freeze triggers
//! - Ordered iteration for table creation by the flusher
//!
//! ## Lifecycle
//! ```text
//!   active (MemTable) ──freeze──▶ ImmutableMemtable ──flush + promote──▶ L0 handle
//! ```
//! A memtable is frozen exactly once and promoted exactly once. Both the
//! active table and frozen ones are shared through `Arc`, so readers keep a
//! table alive after it leaves the state.

mod immutable;
mod table;

pub use immutable::ImmutableMemtable;
pub use table::{MemTable, MemTableIterator};

/// Entry stored in the MemTable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemTableEntry {
    /// A live value
    Value(Vec<u8>),

    /// A tombstone (deleted key)
    Tombstone,
}
