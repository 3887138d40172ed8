//! Engine Module
//!
//! Coordinates the write path, flushes and compaction results around one
//! `DbState`.
//!
//! ## Responsibilities
//! - Assign write sequence numbers and write to the active memtable
//! - Freeze the memtable when it reaches its size limit
//! - Drive flushes through a `Flusher` and promote the results into L0
//! - Hand snapshots to the compactor and merge its results back

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::compactor::CompactionWorker;
use crate::config::Config;
use crate::error::Result;
use crate::flush::Flusher;
use crate::memtable::{ImmutableMemtable, MemTableEntry};
use crate::state::{CoreState, DbState, StateSnapshot};
use crate::table::TableHandle;

/// The state engine
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Writes** (put/delete/freeze): Serialized by `write_lock`
///   - Only ONE write operation at a time
///   - A freeze therefore never races a write into the memtable it retires
///
/// - **State** (freeze/promote/refresh/snapshot): One `state` mutex
///   - Held for the whole operation, never across I/O
///   - Flushers and compactors run with no lock held
///
/// - **Reads** (get): Take a snapshot under `state`, then search without it
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Memtables and tree shape
    state: Mutex<DbState>,

    /// Sequence of the most recent write
    last_wal_id: AtomicU64,

    /// Serializes write operations (put/delete/freeze)
    write_lock: Mutex<()>,
}

impl Engine {
    /// Create an engine over an empty tree
    pub fn open(config: Config) -> Result<Self> {
        Self::with_core_state(config, CoreState::new())
    }

    /// Create an engine over a tree shape restored by the storage layer.
    ///
    /// Write sequences continue after `core.last_flushed_wal_id`.
    pub fn with_core_state(config: Config, core: CoreState) -> Result<Self> {
        config.validate()?;

        let last_wal_id = core.last_flushed_wal_id;
        info!(
            l0 = core.l0.len(),
            runs = core.higher_levels.len(),
            last_wal_id,
            "opening engine"
        );

        Ok(Self {
            config,
            state: Mutex::new(DbState::new(core)),
            last_wal_id: AtomicU64::new(last_wal_id),
            write_lock: Mutex::new(()),
        })
    }

    // =========================================================================
    // Write Path
    // =========================================================================

    /// Put a key-value pair. Returns the write's sequence number.
    pub fn put(&self, key: &[u8], value: &[u8]) -> u64 {
        let _write_guard = self.write_lock.lock();
        let wal_id = self.last_wal_id.fetch_add(1, Ordering::SeqCst) + 1;

        let memtable = Arc::clone(self.state.lock().memtable());
        memtable.put(key.to_vec(), value.to_vec());

        if memtable.should_freeze(self.config.memtable_size_limit) {
            self.freeze_locked(wal_id);
        }
        wal_id
    }

    /// Delete a key (writes a tombstone). Returns the write's sequence number.
    pub fn delete(&self, key: &[u8]) -> u64 {
        let _write_guard = self.write_lock.lock();
        let wal_id = self.last_wal_id.fetch_add(1, Ordering::SeqCst) + 1;

        let memtable = Arc::clone(self.state.lock().memtable());
        memtable.delete(key.to_vec());

        if memtable.should_freeze(self.config.memtable_size_limit) {
            self.freeze_locked(wal_id);
        }
        wal_id
    }

    /// Freeze the active memtable regardless of its size
    pub fn freeze(&self) -> Arc<ImmutableMemtable> {
        let _write_guard = self.write_lock.lock();
        self.freeze_locked(self.last_wal_id.load(Ordering::SeqCst))
    }

    /// Internal freeze (called with write lock held)
    fn freeze_locked(&self, wal_id: u64) -> Arc<ImmutableMemtable> {
        let mut state = self.state.lock();
        let frozen = state.freeze_memtable(wal_id);

        let queued = state.imm_memtables().len();
        if queued > self.config.max_immutable_memtables {
            warn!(
                queued,
                limit = self.config.max_immutable_memtables,
                "immutable memtables are piling up; flushes are falling behind"
            );
        }
        frozen
    }

    // =========================================================================
    // Read Path
    // =========================================================================

    /// Look a key up in memory: active memtable first, then frozen ones
    /// newest to oldest. `None` means the key has to be searched in tables.
    pub fn get(&self, key: &[u8]) -> Option<MemTableEntry> {
        let (memtable, imm_memtables) = {
            let state = self.state.lock();
            let imms: Vec<Arc<ImmutableMemtable>> =
                state.imm_memtables().iter().rev().cloned().collect();
            (Arc::clone(state.memtable()), imms)
        };

        if let Some(entry) = memtable.get(key) {
            return Some(entry);
        }
        imm_memtables.iter().find_map(|imm| imm.table().get(key))
    }

    /// Consistent view of memtables and tree shape
    pub fn snapshot(&self) -> StateSnapshot {
        self.state.lock().snapshot()
    }

    /// Deep copy of the tree shape
    pub fn core_snapshot(&self) -> CoreState {
        self.state.lock().core_state_clone()
    }

    // =========================================================================
    // Flush
    // =========================================================================

    /// Flush the oldest frozen memtable and promote it into L0.
    ///
    /// Returns `None` when nothing is waiting. The flusher runs without any
    /// lock held.
    pub fn flush_oldest(&self, flusher: &dyn Flusher) -> Result<Option<TableHandle>> {
        let imm = match self.state.lock().oldest_imm_memtable() {
            Some(imm) => imm,
            None => return Ok(None),
        };

        let table = flusher.flush(&imm, self.config.compression_codec)?;
        self.state
            .lock()
            .move_imm_memtable_to_l0(&imm, table.clone())?;

        Ok(Some(table))
    }

    /// Flush every frozen memtable, oldest first. Returns how many were
    /// flushed.
    pub fn flush_all(&self, flusher: &dyn Flusher) -> Result<usize> {
        let mut flushed = 0;
        while self.flush_oldest(flusher)?.is_some() {
            flushed += 1;
        }
        debug!(flushed, "flushed immutable memtables");
        Ok(flushed)
    }

    // =========================================================================
    // Compaction
    // =========================================================================

    /// Whether L0 has grown past `l0_max_tables`
    pub fn needs_compaction(&self) -> bool {
        self.state.lock().core().l0.len() > self.config.l0_max_tables
    }

    /// Merge a compaction result into live state
    pub fn apply_compaction(&self, compacted: CoreState) -> Result<()> {
        self.state.lock().refresh_db_state(compacted)
    }

    /// Submit a snapshot to the worker if L0 is over its limit
    pub fn maybe_schedule_compaction(&self, worker: &CompactionWorker) -> Result<bool> {
        if !self.needs_compaction() {
            return Ok(false);
        }
        worker.submit(self.core_snapshot())?;
        Ok(true)
    }

    /// Apply every result the worker has finished. Returns how many were
    /// applied; the first failure (from the compactor or the merge) stops
    /// the drain.
    pub fn apply_finished_compactions(&self, worker: &CompactionWorker) -> Result<usize> {
        let mut applied = 0;
        while let Some(result) = worker.try_recv_result() {
            self.apply_compaction(result?)?;
            applied += 1;
        }
        Ok(applied)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Sequence of the most recent write
    pub fn last_wal_id(&self) -> u64 {
        self.last_wal_id.load(Ordering::SeqCst)
    }

    /// Get the current active memtable size
    pub fn memtable_size(&self) -> usize {
        self.state.lock().memtable().size()
    }

    /// Number of frozen memtables waiting for flush
    pub fn imm_memtable_count(&self) -> usize {
        self.state.lock().imm_memtables().len()
    }

    /// Number of L0 tables
    pub fn l0_count(&self) -> usize {
        self.state.lock().core().l0.len()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
