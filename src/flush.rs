//! Flush protocol
//!
//! Writing a frozen memtable to durable storage is the storage layer's job.
//! The engine hands it the memtable and gets back the handle it promotes.

use crate::error::Result;
use crate::memtable::ImmutableMemtable;
use crate::table::{CompressionCodec, TableHandle};

/// Turns a frozen memtable into a durable table
pub trait Flusher: Send + Sync {
    /// Persist the memtable's entries and describe the resulting table.
    ///
    /// Called without any engine lock held, so it may block on I/O.
    fn flush(&self, memtable: &ImmutableMemtable, compression: CompressionCodec)
        -> Result<TableHandle>;
}
