//! Table handles
//!
//! A handle is what the state core lists in L0 and in sorted runs.

use std::sync::{Arc, OnceLock};

use bytes::Bytes;

use crate::codec;
use crate::error::Result;

use super::{TableId, TableIndex, TableInfo};

/// Immutable reference to one on-disk table
///
/// The decoded index is cached on first use and never persisted. Cloning a
/// handle copies the cache slot, so each clone fills its own cache
/// independently.
#[derive(Debug, Clone)]
pub struct TableHandle {
    id: TableId,
    info: TableInfo,
    index: OnceLock<Arc<TableIndex>>,
}

impl TableHandle {
    pub fn new(id: TableId, info: TableInfo) -> Self {
        Self {
            id,
            info,
            index: OnceLock::new(),
        }
    }

    /// Build a handle whose index is already decoded (e.g. by the writer
    /// that just produced the table)
    pub fn with_index(id: TableId, info: TableInfo, index: TableIndex) -> Self {
        let handle = Self::new(id, info);
        // Fresh cell, cannot already be set
        let _ = handle.index.set(Arc::new(index));
        handle
    }

    pub fn id(&self) -> &TableId {
        &self.id
    }

    pub fn info(&self) -> &TableInfo {
        &self.info
    }

    /// The cached index, if it was loaded already
    pub fn cached_index(&self) -> Option<Arc<TableIndex>> {
        self.index.get().cloned()
    }

    /// Return the index, decoding it from the bytes produced by `fetch` on
    /// first use.
    ///
    /// `fetch` receives the table info so it can read
    /// `index_offset..index_offset + index_len` from the table file.
    pub fn load_index<F>(&self, fetch: F) -> Result<Arc<TableIndex>>
    where
        F: FnOnce(&TableInfo) -> Result<Bytes>,
    {
        if let Some(index) = self.index.get() {
            return Ok(Arc::clone(index));
        }

        let raw = fetch(&self.info)?;
        let decoded = Arc::new(codec::decode_table_index(&raw)?);

        // Another thread may have won the race; keep whichever landed first
        Ok(Arc::clone(self.index.get_or_init(|| decoded)))
    }
}

impl PartialEq for TableHandle {
    /// Two handles are equal when they describe the same table; the cache
    /// is not part of the value.
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.info == other.info
    }
}

impl Eq for TableHandle {}
