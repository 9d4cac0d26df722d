//! MemTable Tests
//!
//! Tests verify:
//! - Basic set/get operations
//! - Multi-version visibility by sequence number
//! - Tombstone handling
//! - Size tracking and emptiness
//! - Arena exhaustion
//! - Concurrent access patterns

use std::cmp::Ordering;
use std::sync::Arc;
use std::thread;

use atlaskv_memtable::{
    AtlasError, Comparer, Config, InternalIterator, InternalKey, InternalKeyKind, InternalReader,
    MemTable,
};

fn set(memtable: &MemTable, key: &str, seq: u64, value: &str) {
    memtable
        .set(&InternalKey::new(key, seq, InternalKeyKind::Set), value.as_bytes())
        .unwrap();
}

fn delete(memtable: &MemTable, key: &str, seq: u64) {
    memtable
        .set(&InternalKey::new(key, seq, InternalKeyKind::Delete), b"")
        .unwrap();
}

fn get(memtable: &MemTable, key: &str, seq: u64) -> Result<Vec<u8>, AtlasError> {
    memtable
        .get(&InternalKey::lookup(key, seq))
        .map(|v| v.to_vec())
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_memtable_is_empty() {
    let memtable = MemTable::new(&Config::default());

    assert!(memtable.is_empty());
    assert!(memtable.approximate_memory_usage() > 0);

    let mut iter = memtable.new_iter();
    iter.first();
    assert!(!iter.valid());
}

#[test]
fn test_set_and_get() {
    let memtable = MemTable::default();

    set(&memtable, "key1", 1, "value1");

    assert_eq!(get(&memtable, "key1", 1), Ok(b"value1".to_vec()));
    assert!(!memtable.is_empty());
}

#[test]
fn test_get_nonexistent_key() {
    let memtable = MemTable::default();
    assert_eq!(get(&memtable, "nonexistent", 100), Err(AtlasError::NotFound));

    set(&memtable, "b", 1, "v");
    // Neighbours on either side are not versions of the probe key
    assert_eq!(get(&memtable, "a", 100), Err(AtlasError::NotFound));
    assert_eq!(get(&memtable, "bb", 100), Err(AtlasError::NotFound));
    assert_eq!(get(&memtable, "c", 100), Err(AtlasError::NotFound));
}

#[test]
fn test_set_multiple_entries() {
    let memtable = MemTable::default();

    set(&memtable, "key1", 1, "value1");
    set(&memtable, "key2", 2, "value2");
    set(&memtable, "key3", 3, "value3");

    assert_eq!(get(&memtable, "key1", 3), Ok(b"value1".to_vec()));
    assert_eq!(get(&memtable, "key2", 3), Ok(b"value2".to_vec()));
    assert_eq!(get(&memtable, "key3", 3), Ok(b"value3".to_vec()));
}

#[test]
fn test_get_with_exact_internal_key() {
    let memtable = MemTable::default();
    let key = InternalKey::new("k", 5, InternalKeyKind::Set);

    memtable.set(&key, b"v").unwrap();
    assert_eq!(memtable.get(&key), Ok(&b"v"[..]));
}

// =============================================================================
// Version Visibility Tests
// =============================================================================

#[test]
fn test_versions_visible_by_seq_num() {
    let memtable = MemTable::default();

    set(&memtable, "k", 5, "v1");
    set(&memtable, "k", 9, "v2");

    assert_eq!(get(&memtable, "k", 5), Ok(b"v1".to_vec()));
    assert_eq!(get(&memtable, "k", 8), Ok(b"v1".to_vec()));
    assert_eq!(get(&memtable, "k", 9), Ok(b"v2".to_vec()));
    assert_eq!(get(&memtable, "k", 1000), Ok(b"v2".to_vec()));
}

#[test]
fn test_no_version_before_first_write() {
    let memtable = MemTable::default();

    set(&memtable, "k", 5, "v1");

    assert_eq!(get(&memtable, "k", 4), Err(AtlasError::NotFound));
}

#[test]
fn test_insert_order_does_not_matter() {
    let memtable = MemTable::default();

    // Newer version written first
    set(&memtable, "k", 9, "v2");
    set(&memtable, "k", 5, "v1");

    assert_eq!(get(&memtable, "k", 6), Ok(b"v1".to_vec()));
    assert_eq!(get(&memtable, "k", 9), Ok(b"v2".to_vec()));
}

#[test]
fn test_merge_operand_is_returned() {
    let memtable = MemTable::default();

    memtable
        .set(&InternalKey::new("k", 3, InternalKeyKind::Merge), b"+1")
        .unwrap();

    assert_eq!(get(&memtable, "k", 3), Ok(b"+1".to_vec()));
}

// =============================================================================
// Delete / Tombstone Tests
// =============================================================================

#[test]
fn test_tombstone_shadows_older_versions() {
    let memtable = MemTable::default();

    set(&memtable, "key1", 1, "value1");
    delete(&memtable, "key1", 2);

    assert_eq!(get(&memtable, "key1", 2), Err(AtlasError::NotFound));
    assert_eq!(get(&memtable, "key1", 50), Err(AtlasError::NotFound));
    // Older snapshot still sees the value
    assert_eq!(get(&memtable, "key1", 1), Ok(b"value1".to_vec()));
}

#[test]
fn test_delete_nonexistent_key() {
    let memtable = MemTable::default();

    delete(&memtable, "nonexistent", 1);

    assert_eq!(get(&memtable, "nonexistent", 1), Err(AtlasError::NotFound));
    assert!(!memtable.is_empty()); // Tombstone is still an entry
}

#[test]
fn test_set_after_delete() {
    let memtable = MemTable::default();

    set(&memtable, "key1", 1, "value1");
    delete(&memtable, "key1", 2);
    set(&memtable, "key1", 3, "value2");

    assert_eq!(get(&memtable, "key1", 3), Ok(b"value2".to_vec()));
    assert_eq!(get(&memtable, "key1", 2), Err(AtlasError::NotFound));
}

// =============================================================================
// Size Tracking Tests
// =============================================================================

#[test]
fn test_size_monotonic() {
    let memtable = MemTable::default();
    let mut last = memtable.approximate_memory_usage();

    let mut check = |memtable: &MemTable| {
        let now = memtable.approximate_memory_usage();
        assert!(now >= last, "usage dropped from {} to {}", last, now);
        last = now;
    };

    set(&memtable, "key", 1, "a-fairly-long-value");
    check(&memtable);
    set(&memtable, "key", 2, "s");
    check(&memtable);
    delete(&memtable, "key", 3);
    check(&memtable);
    let _ = get(&memtable, "key", 3);
    check(&memtable);
}

#[test]
fn test_overwrite_grows_size() {
    let memtable = MemTable::default();

    set(&memtable, "key", 1, "much_longer_value");
    let size_after_first = memtable.approximate_memory_usage();

    set(&memtable, "key", 2, "short");
    assert!(memtable.approximate_memory_usage() > size_after_first);
}

// =============================================================================
// Arena Exhaustion Tests
// =============================================================================

#[test]
fn test_arena_full() {
    let memtable = MemTable::new(&Config::builder().arena_size(2048).build());
    let value = [0xABu8; 64];

    let mut written = 0u64;
    let err = loop {
        match memtable.set(&InternalKey::new(format!("k{:04}", written), written + 1, InternalKeyKind::Set), &value) {
            Ok(()) => written += 1,
            Err(e) => break e,
        }
    };

    assert!(matches!(err, AtlasError::ArenaFull { .. }));
    assert!(written > 0);

    // Everything written before the failure is still readable
    for i in 0..written {
        assert_eq!(get(&memtable, &format!("k{:04}", i), u64::MAX >> 8), Ok(value.to_vec()));
    }
}

#[test]
fn test_failed_set_keeps_memtable_empty() {
    let memtable = MemTable::new(&Config::builder().arena_size(0).build());

    let err = memtable
        .set(&InternalKey::new("k", 1, InternalKeyKind::Set), b"v")
        .unwrap_err();

    assert!(matches!(err, AtlasError::ArenaFull { .. }));
    assert!(memtable.is_empty());
    assert_eq!(get(&memtable, "k", 1), Err(AtlasError::NotFound));
}

#[test]
fn test_oversized_value_rejected() {
    let memtable = MemTable::new(&Config::builder().arena_size(64 * 1024).build());
    let before = memtable.approximate_memory_usage();

    let err = memtable
        .set(&InternalKey::new("big", 1, InternalKeyKind::Set), &vec![0u8; 128 * 1024])
        .unwrap_err();

    assert!(matches!(err, AtlasError::ArenaFull { .. }));
    assert_eq!(memtable.approximate_memory_usage(), before);

    // Smaller writes still fit
    set(&memtable, "small", 2, "v");
    assert_eq!(get(&memtable, "small", 2), Ok(b"v".to_vec()));
}

// =============================================================================
// Edge Cases
// =============================================================================

#[test]
fn test_empty_key() {
    let memtable = MemTable::default();

    set(&memtable, "", 1, "value");

    assert_eq!(get(&memtable, "", 1), Ok(b"value".to_vec()));
}

#[test]
fn test_empty_value() {
    let memtable = MemTable::default();

    set(&memtable, "key", 1, "");

    assert_eq!(get(&memtable, "key", 1), Ok(vec![]));
}

#[test]
fn test_large_value() {
    let memtable = MemTable::default();

    let large_value = vec![0xAB; 1024 * 1024]; // 1 MB
    memtable
        .set(&InternalKey::new("big_key", 1, InternalKeyKind::Set), &large_value)
        .unwrap();

    assert_eq!(memtable.get(&InternalKey::lookup("big_key", 1)), Ok(&large_value[..]));
}

#[test]
fn test_close_is_idempotent() {
    let memtable = MemTable::default();
    set(&memtable, "k", 1, "v");

    assert_eq!(memtable.close(), Ok(()));
    assert_eq!(memtable.close(), Ok(()));
}

#[test]
fn test_custom_comparer() {
    fn reverse(a: &[u8], b: &[u8]) -> Ordering {
        b.cmp(a)
    }
    let comparer = Comparer {
        compare: reverse,
        name: "test.ReverseBytewise",
    };
    let memtable = MemTable::new(&Config::builder().comparer(comparer).build());

    set(&memtable, "a", 1, "a1");
    set(&memtable, "c", 2, "c2");
    set(&memtable, "b", 3, "b3");
    set(&memtable, "a", 4, "a4");

    let mut iter = memtable.new_iter();
    let mut seen = vec![];
    iter.first();
    while iter.valid() {
        let key = iter.key();
        seen.push((String::from_utf8(key.user_key.clone()).unwrap(), key.seq_num()));
        iter.next();
    }
    assert_eq!(
        seen,
        vec![
            ("c".to_string(), 2),
            ("b".to_string(), 3),
            ("a".to_string(), 4),
            ("a".to_string(), 1),
        ]
    );
    assert_eq!(get(&memtable, "a", 3), Ok(b"a1".to_vec()));
    assert_eq!(memtable.comparer().name, "test.ReverseBytewise");
}

#[test]
fn test_reader_trait_object() {
    let memtable = MemTable::default();
    set(&memtable, "k", 1, "v");

    let reader: &dyn InternalReader = &memtable;
    assert_eq!(reader.get(&InternalKey::lookup("k", 1)), Ok(&b"v"[..]));

    let mut iter = reader.new_iter();
    iter.first();
    assert!(iter.valid());
    assert_eq!(iter.key().user_key, b"k");
    assert_eq!(iter.close(), Ok(()));
    assert_eq!(reader.close(), Ok(()));
}

// =============================================================================
// Concurrent Access Tests
// =============================================================================

#[test]
fn test_concurrent_reads() {
    let memtable = Arc::new(MemTable::default());
    set(&memtable, "key", 1, "value");

    let mut handles = vec![];

    for _ in 0..10 {
        let mt = Arc::clone(&memtable);
        let handle = thread::spawn(move || {
            for _ in 0..100 {
                assert_eq!(get(&mt, "key", 1), Ok(b"value".to_vec()));
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_writes() {
    let memtable = Arc::new(MemTable::default());

    let mut handles = vec![];

    for i in 0..10u64 {
        let mt = Arc::clone(&memtable);
        let handle = thread::spawn(move || {
            for j in 0..10u64 {
                let key = format!("key{}_{}", i, j);
                let value = format!("value{}_{}", i, j);
                set(&mt, &key, i * 10 + j + 1, &value);
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    for i in 0..10u64 {
        for j in 0..10u64 {
            let key = format!("key{}_{}", i, j);
            let value = format!("value{}_{}", i, j);
            assert_eq!(get(&memtable, &key, 1000), Ok(value.into_bytes()));
        }
    }

    let mut iter = memtable.new_iter();
    let mut count = 0;
    iter.first();
    while iter.valid() {
        count += 1;
        iter.next();
    }
    assert_eq!(count, 100);
}

#[test]
fn test_concurrent_versions_of_one_key() {
    let memtable = MemTable::default();

    crossbeam::thread::scope(|s| {
        for t in 0..4u64 {
            let memtable = &memtable;
            s.spawn(move |_| {
                for i in 0..250u64 {
                    let seq = i * 4 + t + 1;
                    set(memtable, "hot", seq, &seq.to_string());
                }
            });
        }
    })
    .unwrap();

    for seq in [1u64, 17, 500, 1000] {
        assert_eq!(get(&memtable, "hot", seq), Ok(seq.to_string().into_bytes()));
    }

    // Versions come out newest first
    let mut iter = memtable.new_iter();
    iter.seek_ge(&InternalKey::lookup("hot", u64::MAX >> 8));
    let mut expected = 1000;
    while iter.valid() {
        assert_eq!(iter.key().seq_num(), expected);
        expected -= 1;
        iter.next();
    }
    assert_eq!(expected, 0);
}
