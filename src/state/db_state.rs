//! Memtable lifecycle and live core state
//!
//! `DbState` is a plain owned value; the engine wraps it in a single mutex.
//! Every method here is O(L0 length + levels) and does no I/O.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{Result, StrataError};
use crate::memtable::{ImmutableMemtable, MemTable};
use crate::table::TableHandle;

use super::{merge_compaction, CoreState};

/// Consistent view for read paths: the active memtable, the frozen ones
/// (newest first) and a deep copy of the core state
#[derive(Clone)]
pub struct StateSnapshot {
    pub memtable: Arc<MemTable>,
    pub imm_memtables: Vec<Arc<ImmutableMemtable>>,
    pub core: CoreState,
}

/// Live state of one database instance
pub struct DbState {
    /// The only memtable accepting writes
    memtable: Arc<MemTable>,

    /// Frozen memtables waiting for flush, oldest at the front
    imm_memtables: VecDeque<Arc<ImmutableMemtable>>,

    core: CoreState,
}

impl DbState {
    pub fn new(core: CoreState) -> Self {
        Self {
            memtable: Arc::new(MemTable::new()),
            imm_memtables: VecDeque::new(),
            core,
        }
    }

    pub fn memtable(&self) -> &Arc<MemTable> {
        &self.memtable
    }

    /// Frozen memtables, oldest first
    pub fn imm_memtables(&self) -> &VecDeque<Arc<ImmutableMemtable>> {
        &self.imm_memtables
    }

    pub fn core(&self) -> &CoreState {
        &self.core
    }

    /// Deep copy of the core state for readers and the compactor
    pub fn core_state_clone(&self) -> CoreState {
        self.core.clone()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            memtable: Arc::clone(&self.memtable),
            imm_memtables: self.imm_memtables.iter().rev().cloned().collect(),
            core: self.core.clone(),
        }
    }

    // =========================================================================
    // Memtable Lifecycle
    // =========================================================================

    /// Swap in a fresh active memtable and queue the old one for flush,
    /// tagged with `wal_id`. Freezing an empty memtable is allowed; whether
    /// it is worth doing is the caller's call.
    pub fn freeze_memtable(&mut self, wal_id: u64) -> Arc<ImmutableMemtable> {
        let old = std::mem::replace(&mut self.memtable, Arc::new(MemTable::new()));
        let frozen = Arc::new(ImmutableMemtable::new(old, wal_id));
        self.imm_memtables.push_back(Arc::clone(&frozen));

        debug!(
            wal_id,
            entries = frozen.table().entry_count(),
            queued = self.imm_memtables.len(),
            "froze memtable"
        );
        frozen
    }

    /// The next memtable to flush, if any
    pub fn oldest_imm_memtable(&self) -> Option<Arc<ImmutableMemtable>> {
        self.imm_memtables.front().cloned()
    }

    /// Retire a flushed memtable and make its table the newest L0 entry.
    ///
    /// `imm` must be the very memtable at the front of the queue (pointer
    /// identity). Anything else means flushes completed out of order; the
    /// state is left untouched and `StaleFlushTarget` is returned.
    pub fn move_imm_memtable_to_l0(
        &mut self,
        imm: &Arc<ImmutableMemtable>,
        table: TableHandle,
    ) -> Result<()> {
        let is_front = self
            .imm_memtables
            .front()
            .map(|front| Arc::ptr_eq(front, imm))
            .unwrap_or(false);

        if !is_front {
            warn!(
                last_wal_id = imm.last_wal_id(),
                queued = self.imm_memtables.len(),
                "flush result does not match the oldest immutable memtable"
            );
            return Err(StrataError::StaleFlushTarget {
                last_wal_id: imm.last_wal_id(),
            });
        }

        if let Some(head) = self.core.l0.front() {
            if table.id().created_after(head.id()) == Some(false) {
                warn!(new = %table.id(), head = %head.id(), "promoted table is not newer than l0 head");
            }
        }

        self.imm_memtables.pop_front();
        self.core.last_flushed_wal_id = imm.last_wal_id();
        debug!(table = %table.id(), wal_id = imm.last_wal_id(), l0 = self.core.l0.len() + 1, "promoted memtable to l0");
        self.core.l0.push_front(table);

        Ok(())
    }

    // =========================================================================
    // Compaction
    // =========================================================================

    /// Apply a compaction result. On error the live state is unchanged.
    pub fn refresh_db_state(&mut self, compacted: CoreState) -> Result<()> {
        let merged = merge_compaction(&self.core, compacted)?;
        self.core = merged;
        self.core.log_state();
        Ok(())
    }
}

impl Default for DbState {
    fn default() -> Self {
        Self::new(CoreState::new())
    }
}
