//! Frozen memtables

use std::sync::Arc;

use super::MemTable;

/// A memtable that no longer accepts writes and is waiting to be flushed
///
/// Tagged with the WAL sequence current at freeze time: every write up to and
/// including `last_wal_id` is in this table or an older one.
pub struct ImmutableMemtable {
    table: Arc<MemTable>,
    last_wal_id: u64,
}

impl ImmutableMemtable {
    pub fn new(table: Arc<MemTable>, last_wal_id: u64) -> Self {
        Self { table, last_wal_id }
    }

    pub fn table(&self) -> &Arc<MemTable> {
        &self.table
    }

    pub fn last_wal_id(&self) -> u64 {
        self.last_wal_id
    }
}

impl std::fmt::Debug for ImmutableMemtable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImmutableMemtable")
            .field("last_wal_id", &self.last_wal_id)
            .field("entries", &self.table.entry_count())
            .field("size", &self.table.size())
            .finish()
    }
}
