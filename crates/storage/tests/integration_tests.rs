//! Integration tests for the storage layer
//!
//! These tests verify that MemStore works correctly as a complete system:
//! - Snapshot isolation under concurrent writers
//! - All-or-nothing commits
//! - Cursor order and read-your-writes inside a write transaction

use std::sync::Arc;
use std::thread;

use proptest::prelude::*;
use strand_core::{KvStore, StrandError, StrandResult};
use strand_storage::MemStore;

// ============================================================================
// Helper Functions
// ============================================================================

const KS: &[u8] = b"items";

fn put(store: &MemStore, key: &str, value: &str) {
    store
        .update(|tx| tx.keyspace(KS)?.put(key.as_bytes(), value.as_bytes()))
        .unwrap();
}

fn scan(store: &MemStore) -> Vec<(String, String)> {
    store
        .view(|tx| {
            let ks = tx.keyspace(KS)?;
            let mut cur = ks.cursor()?;
            let mut out = Vec::new();
            let mut pair = cur.first();
            while let Some((k, v)) = pair {
                out.push((
                    String::from_utf8_lossy(&k).into_owned(),
                    String::from_utf8_lossy(&v).into_owned(),
                ));
                pair = cur.next();
            }
            Ok(out)
        })
        .unwrap()
}

// ============================================================================
// Transactions
// ============================================================================

mod transactions {
    use super::*;

    #[test]
    fn test_read_your_writes() {
        let store = MemStore::new();
        put(&store, "a", "old");

        let seen = store
            .update(|tx| {
                let ks = tx.keyspace(KS)?;
                ks.put(b"a", b"new")?;
                ks.get(b"a")
            })
            .unwrap();
        assert_eq!(seen, b"new");
    }

    #[test]
    fn test_cursor_merges_pending_writes_in_key_order() {
        let store = MemStore::new();
        put(&store, "b", "1");
        put(&store, "d", "1");

        let keys = store
            .update(|tx| {
                let ks = tx.keyspace(KS)?;
                ks.put(b"c", b"2")?;
                ks.put(b"a", b"2")?;
                let mut cur = ks.cursor()?;
                let mut keys = Vec::new();
                let mut pair = cur.first();
                while let Some((k, _)) = pair {
                    keys.push(k);
                    pair = cur.next();
                }
                Ok(keys)
            })
            .unwrap();
        assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec(), b"d".to_vec()]);
    }

    #[test]
    fn test_failed_update_leaves_every_keyspace_untouched() {
        let store = MemStore::new();
        put(&store, "a", "1");
        let before = store.snapshot();

        let result: StrandResult<()> = store.update(|tx| {
            tx.keyspace(KS)?.put(b"a", b"2")?;
            tx.keyspace(b"other")?.put(b"x", b"y")?;
            Err(StrandError::storage("simulated crash"))
        });

        assert!(result.is_err());
        let after = store.snapshot();
        assert_eq!(after.version(), before.version());
        assert_eq!(after.get(KS, b"a"), Some(&b"1".to_vec()));
        assert!(after.keyspace(b"other").is_none());
    }

    #[test]
    fn test_missing_key_is_not_found() {
        let store = MemStore::new();
        let err = store.view(|tx| tx.keyspace(KS)?.get(b"nope")).unwrap_err();
        assert!(err.is_not_found());
    }
}

// ============================================================================
// Concurrency
// ============================================================================

mod concurrency {
    use super::*;

    #[test]
    fn test_concurrent_writers_all_commit() {
        let store = Arc::new(MemStore::new());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..50 {
                        put(&store, &format!("{}-{:03}", t, i), "v");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(scan(&store).len(), 400);
        assert_eq!(store.stats().commits, 400);
        assert_eq!(store.stats().version, 400);
    }

    #[test]
    fn test_readers_never_see_half_a_commit() {
        let store = Arc::new(MemStore::new());

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..200 {
                    let value = i.to_string();
                    store
                        .update(|tx| {
                            let ks = tx.keyspace(KS)?;
                            ks.put(b"left", value.as_bytes())?;
                            ks.put(b"right", value.as_bytes())
                        })
                        .unwrap();
                }
            })
        };

        for _ in 0..200 {
            let snapshot = store.snapshot();
            assert_eq!(snapshot.get(KS, b"left"), snapshot.get(KS, b"right"));
        }
        writer.join().unwrap();
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_scan_matches_last_write(writes in prop::collection::vec(("[a-e]{1,2}", "[0-9]{1,3}"), 0..40)) {
        let store = MemStore::new();
        let mut expected = std::collections::BTreeMap::new();
        for (k, v) in &writes {
            put(&store, k, v);
            expected.insert(k.clone(), v.clone());
        }
        let expected: Vec<(String, String)> = expected.into_iter().collect();
        prop_assert_eq!(scan(&store), expected);
    }
}
