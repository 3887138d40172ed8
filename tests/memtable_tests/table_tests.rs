//! MemTable Tests
//!
//! Tests verify:
//! - Basic CRUD operations
//! - Size tracking
//! - Tombstone handling
//! - Sorted iteration
//! - Frozen memtable tagging
//! - Concurrent access patterns

use std::sync::Arc;
use std::thread;

use strata::memtable::{ImmutableMemtable, MemTable, MemTableEntry};

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_memtable_is_empty() {
    let memtable = MemTable::new();
    assert_eq!(memtable.entry_count(), 0);
    assert_eq!(memtable.size(), 0);
    assert!(memtable.is_empty());
    assert_eq!(memtable.first_key(), None);
}

#[test]
fn test_put_and_get() {
    let memtable = MemTable::new();

    memtable.put(b"key1".to_vec(), b"value1".to_vec());

    assert_eq!(memtable.get(b"key1"), Some(MemTableEntry::Value(b"value1".to_vec())));
    assert_eq!(memtable.get(b"nonexistent"), None);
}

#[test]
fn test_put_overwrites_existing() {
    let memtable = MemTable::new();

    memtable.put(b"key1".to_vec(), b"value1".to_vec());
    memtable.put(b"key1".to_vec(), b"value2".to_vec());

    assert_eq!(memtable.entry_count(), 1);
    assert_eq!(memtable.get(b"key1"), Some(MemTableEntry::Value(b"value2".to_vec())));
}

// =============================================================================
// Delete / Tombstone Tests
// =============================================================================

#[test]
fn test_delete_creates_tombstone() {
    let memtable = MemTable::new();

    memtable.put(b"key1".to_vec(), b"value1".to_vec());
    memtable.delete(b"key1".to_vec());

    assert_eq!(memtable.get(b"key1"), Some(MemTableEntry::Tombstone));
    assert_eq!(memtable.entry_count(), 1); // Tombstone still counts as entry
}

#[test]
fn test_delete_nonexistent_key() {
    let memtable = MemTable::new();

    memtable.delete(b"nonexistent".to_vec());

    assert_eq!(memtable.get(b"nonexistent"), Some(MemTableEntry::Tombstone));
    assert_eq!(memtable.entry_count(), 1);
}

// =============================================================================
// Size Tracking Tests
// =============================================================================

#[test]
fn test_size_tracking_put() {
    let memtable = MemTable::new();

    let size = memtable.put(b"key".to_vec(), b"value".to_vec());

    assert_eq!(size, b"key".len() + b"value".len());
    assert_eq!(memtable.size(), size);
}

#[test]
fn test_size_tracking_overwrite() {
    let memtable = MemTable::new();

    memtable.put(b"key".to_vec(), b"a-long-value".to_vec());
    memtable.put(b"key".to_vec(), b"v".to_vec());

    assert_eq!(memtable.size(), b"key".len() + b"v".len());
}

#[test]
fn test_size_tracking_tombstone_counts_key_only() {
    let memtable = MemTable::new();

    memtable.put(b"key".to_vec(), b"value".to_vec());
    memtable.delete(b"key".to_vec());

    assert_eq!(memtable.size(), b"key".len());
}

#[test]
fn test_should_freeze() {
    let memtable = MemTable::new();

    memtable.put(b"0123456789".to_vec(), b"0123456789".to_vec());

    assert!(!memtable.should_freeze(21));
    assert!(memtable.should_freeze(20));
    assert!(memtable.should_freeze(1));
}

// =============================================================================
// Iteration Tests
// =============================================================================

#[test]
fn test_iter_is_sorted() {
    let memtable = MemTable::new();

    memtable.put(b"cherry".to_vec(), b"3".to_vec());
    memtable.put(b"apple".to_vec(), b"1".to_vec());
    memtable.delete(b"banana".to_vec());

    let entries: Vec<_> = memtable.iter().collect();
    assert_eq!(
        entries,
        vec![
            (b"apple".to_vec(), MemTableEntry::Value(b"1".to_vec())),
            (b"banana".to_vec(), MemTableEntry::Tombstone),
            (b"cherry".to_vec(), MemTableEntry::Value(b"3".to_vec())),
        ]
    );
    assert_eq!(memtable.first_key(), Some(b"apple".to_vec()));
}

#[test]
fn test_iter_is_a_point_in_time_copy() {
    let memtable = MemTable::new();
    memtable.put(b"a".to_vec(), b"1".to_vec());

    let mut iter = memtable.iter();
    memtable.put(b"b".to_vec(), b"2".to_vec());

    assert_eq!(iter.next().map(|(k, _)| k), Some(b"a".to_vec()));
    assert_eq!(iter.next(), None);
}

// =============================================================================
// Frozen MemTable Tests
// =============================================================================

#[test]
fn test_immutable_memtable_keeps_tag_and_data() {
    let table = Arc::new(MemTable::new());
    table.put(b"k".to_vec(), b"v".to_vec());

    let frozen = ImmutableMemtable::new(Arc::clone(&table), 17);

    assert_eq!(frozen.last_wal_id(), 17);
    assert!(Arc::ptr_eq(frozen.table(), &table));
    assert_eq!(frozen.table().get(b"k"), Some(MemTableEntry::Value(b"v".to_vec())));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_readers_with_single_writer() {
    let memtable = Arc::new(MemTable::new());
    for i in 0..100u32 {
        memtable.put(i.to_be_bytes().to_vec(), b"initial".to_vec());
    }

    let writer = {
        let memtable = Arc::clone(&memtable);
        thread::spawn(move || {
            for i in 100..200u32 {
                memtable.put(i.to_be_bytes().to_vec(), b"later".to_vec());
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let memtable = Arc::clone(&memtable);
            thread::spawn(move || {
                for i in 0..100u32 {
                    assert_eq!(
                        memtable.get(&i.to_be_bytes()),
                        Some(MemTableEntry::Value(b"initial".to_vec()))
                    );
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(memtable.entry_count(), 200);
}
