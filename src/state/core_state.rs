//! Canonical tree shape

use std::collections::VecDeque;

use tracing::debug;

use crate::table::{TableHandle, TableId};

/// A sorted run below L0, produced by compaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedRun {
    pub id: u32,
    pub tables: Vec<TableHandle>,
}

/// Snapshot of the tree shape
///
/// `Clone` is a deep copy: a cloned state shares no mutable data with the
/// original, so a reader (or the compactor) holding a clone is unaffected by
/// later freezes, promotions and refreshes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoreState {
    /// L0 tables, newest first
    pub l0: VecDeque<TableHandle>,

    /// Newest L0 table already absorbed into `higher_levels`. Every table
    /// still in the compactor's view of L0 is newer than it.
    pub l0_last_compacted: Option<TableId>,

    /// Levels below L0. Replaced wholesale by each applied compaction.
    pub higher_levels: Vec<SortedRun>,

    /// WAL sequence of the most recently promoted memtable. Every write up to
    /// it is durable in L0. Owned by the writer; compaction never changes it.
    pub last_flushed_wal_id: u64,
}

impl CoreState {
    pub fn new() -> Self {
        Self::default()
    }

    /// L0 ids, newest first
    pub fn l0_ids(&self) -> Vec<TableId> {
        self.l0.iter().map(|table| *table.id()).collect()
    }

    /// Total number of tables across L0 and every sorted run
    pub fn table_count(&self) -> usize {
        self.l0.len()
            + self
                .higher_levels
                .iter()
                .map(|run| run.tables.len())
                .sum::<usize>()
    }

    /// Emit the current shape at debug level
    pub fn log_state(&self) {
        let l0: Vec<String> = self.l0.iter().map(|t| t.id().to_string()).collect();
        debug!(
            l0 = ?l0,
            l0_last_compacted = ?self.l0_last_compacted.map(|id| id.to_string()),
            last_flushed_wal_id = self.last_flushed_wal_id,
            "core state"
        );
        for run in &self.higher_levels {
            debug!(run = run.id, tables = run.tables.len(), "sorted run");
        }
    }
}
