//! Table identities
//!
//! A table is either the flush of a WAL segment (identified by its sequence
//! number) or the output of a flush/compaction (identified by a ULID).

use std::fmt;
use std::str::FromStr;

use parking_lot::Mutex;
use ulid::{Generator, Ulid};

use crate::error::{Result, StrataError};

/// Length of the canonical Crockford base32 ULID string
const ULID_STRING_LEN: usize = 26;

/// Identifier of an on-disk table
///
/// Within one variant the ordering is creation order. The derived ordering
/// across variants (every `Wal` sorts before every `Compacted`) carries no
/// creation-time meaning; use [`TableId::created_after`] to compare origins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableId {
    /// Monotonic sequence assigned by the write path
    Wal(u64),

    /// Globally unique id assigned at flush/compaction time
    Compacted(Ulid),
}

impl TableId {
    /// The WAL sequence, if this is a WAL table
    pub fn wal_id(&self) -> Option<u64> {
        match self {
            TableId::Wal(seq) => Some(*seq),
            TableId::Compacted(_) => None,
        }
    }

    /// The ULID, if this is a compacted table
    pub fn compacted_id(&self) -> Option<Ulid> {
        match self {
            TableId::Wal(_) => None,
            TableId::Compacted(ulid) => Some(*ulid),
        }
    }

    /// Whether `self` was created after `other`.
    ///
    /// Returns `None` when the two ids come from different origins, since a
    /// WAL sequence and a ULID share no clock.
    pub fn created_after(&self, other: &TableId) -> Option<bool> {
        match (self, other) {
            (TableId::Wal(a), TableId::Wal(b)) => Some(a > b),
            (TableId::Compacted(a), TableId::Compacted(b)) => Some(a > b),
            (TableId::Wal(_), TableId::Compacted(_))
            | (TableId::Compacted(_), TableId::Wal(_)) => None,
        }
    }
}

impl fmt::Display for TableId {
    /// WAL ids render as the raw integer, compacted ids as the 26-character
    /// ULID string. Both are used as file name components.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableId::Wal(seq) => write!(f, "{}", seq),
            TableId::Compacted(ulid) => write!(f, "{}", ulid),
        }
    }
}

impl FromStr for TableId {
    type Err = StrataError;

    fn from_str(s: &str) -> Result<Self> {
        // u64::MAX has 20 digits, so a 26 character id can only be a ULID
        if s.len() == ULID_STRING_LEN {
            return Ulid::from_string(s)
                .map(TableId::Compacted)
                .map_err(|e| StrataError::CorruptMetadata(format!("invalid table ulid {:?}: {}", s, e)));
        }

        s.parse::<u64>()
            .map(TableId::Wal)
            .map_err(|e| StrataError::CorruptMetadata(format!("invalid wal table id {:?}: {}", s, e)))
    }
}

/// Hands out compacted table ids in strictly increasing order.
///
/// Plain `Ulid::new()` only orders ids across milliseconds; ids generated in
/// the same millisecond are random relative to each other. L0 order relies on
/// creation order, so flushers should allocate ids here.
pub struct TableIdGenerator {
    inner: Mutex<Generator>,
}

impl TableIdGenerator {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Generator::new()),
        }
    }

    /// Allocate the next compacted table id
    pub fn next_id(&self) -> Result<TableId> {
        self.inner
            .lock()
            .generate()
            .map(TableId::Compacted)
            .map_err(|e| StrataError::Storage(format!("table id generator exhausted: {}", e)))
    }
}

impl Default for TableIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
