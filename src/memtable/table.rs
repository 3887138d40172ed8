//! MemTable implementation
//!
//! BTreeMap-based memtable with RwLock for concurrency.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::MemTableEntry;

/// In-memory table for recent writes
///
/// Size is approximate: the sum of key and value lengths of live entries,
/// with tombstones counting their key only.
pub struct MemTable {
    data: RwLock<BTreeMap<Vec<u8>, MemTableEntry>>,
    size: AtomicUsize,
}

impl MemTable {
    /// Create a new empty MemTable
    pub fn new() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            size: AtomicUsize::new(0),
        }
    }

    /// Get a value by key (read lock)
    pub fn get(&self, key: &[u8]) -> Option<MemTableEntry> {
        self.data.read().get(key).cloned()
    }

    /// Put a key-value pair (write lock). Returns the new approximate size.
    pub fn put(&self, key: Vec<u8>, value: Vec<u8>) -> usize {
        self.insert(key, MemTableEntry::Value(value))
    }

    /// Delete a key (write lock, inserts tombstone). Returns the new
    /// approximate size.
    pub fn delete(&self, key: Vec<u8>) -> usize {
        self.insert(key, MemTableEntry::Tombstone)
    }

    fn insert(&self, key: Vec<u8>, entry: MemTableEntry) -> usize {
        let mut data = self.data.write();
        let added = Self::entry_size(&key, &entry);
        let removed = data
            .get(&key)
            .map(|old| Self::entry_size(&key, old))
            .unwrap_or(0);
        data.insert(key, entry);

        // Writers are serialized by the lock above
        let size = self.size.load(Ordering::Relaxed) + added - removed;
        self.size.store(size, Ordering::Relaxed);
        size
    }

    fn entry_size(key: &[u8], entry: &MemTableEntry) -> usize {
        match entry {
            MemTableEntry::Value(v) => key.len() + v.len(),
            MemTableEntry::Tombstone => key.len(),
        }
    }

    /// Get approximate size in bytes
    pub fn size(&self) -> usize {
        self.size.load(Ordering::Relaxed)
    }

    /// Get entry count (tombstones included)
    pub fn entry_count(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Check if should freeze (size >= limit)
    pub fn should_freeze(&self, size_limit: usize) -> bool {
        self.size() >= size_limit
    }

    /// First key in sort order, the `first_key` of the table it flushes to
    pub fn first_key(&self) -> Option<Vec<u8>> {
        self.data.read().keys().next().cloned()
    }

    /// Iterate over a point-in-time copy of all entries, in sorted key order
    pub fn iter(&self) -> MemTableIterator {
        let entries: Vec<(Vec<u8>, MemTableEntry)> = self
            .data
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        MemTableIterator {
            inner: entries.into_iter(),
        }
    }
}

impl Default for MemTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over MemTable entries
pub struct MemTableIterator {
    inner: std::vec::IntoIter<(Vec<u8>, MemTableEntry)>,
}

impl Iterator for MemTableIterator {
    type Item = (Vec<u8>, MemTableEntry);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}
