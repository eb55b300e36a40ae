//! MemStore: in-memory transactional key-value store
//!
//! This module implements the `KvStore` contract using:
//! - `Arc<StoreData>` behind a `parking_lot::RwLock` for committed state
//! - a writer `Mutex` so write transactions run one at a time
//! - `AtomicU64` counters for the commit version and metrics
//!
//! # Design Notes
//!
//! - **Snapshot isolation**: `view` clones the committed `Arc`; a commit
//!   swaps in a new `Arc`, so readers never see a partial write set.
//! - **All-or-nothing commit**: the write set is applied under one write
//!   lock acquisition, and only if the closure returned `Ok`.
//! - **Serialized writers**: two `update` calls never interleave, so the
//!   base snapshot of a write transaction is always the latest commit.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use strand_core::{KvStore, StrandResult, Transaction};

use crate::snapshot::{Snapshot, StoreData};
use crate::txn::{ReadTxn, WriteTxn};

/// Counters describing store activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Latest commit version
    pub version: u64,
    /// Write transactions committed
    pub commits: u64,
    /// Write transactions rolled back
    pub aborts: u64,
    /// Read transactions opened
    pub views: u64,
}

/// In-memory transactional key-value store
#[derive(Debug, Default)]
pub struct MemStore {
    /// Committed state
    data: RwLock<Arc<StoreData>>,
    /// Held for the whole lifetime of a write transaction
    writer: Mutex<()>,
    /// Version of the latest commit
    version: AtomicU64,
    commits: AtomicU64,
    aborts: AtomicU64,
    views: AtomicU64,
}

impl MemStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the latest committed state
    pub fn snapshot(&self) -> Snapshot {
        // Read the version under the data lock so the pair is consistent
        let data = self.data.read();
        Snapshot::new(self.version.load(Ordering::SeqCst), Arc::clone(&data))
    }

    /// Current counters
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            version: self.version.load(Ordering::SeqCst),
            commits: self.commits.load(Ordering::Relaxed),
            aborts: self.aborts.load(Ordering::Relaxed),
            views: self.views.load(Ordering::Relaxed),
        }
    }

    fn apply(&self, write_set: StoreData) -> u64 {
        let mut data = self.data.write();
        let next = Arc::make_mut(&mut data);
        for (keyspace, writes) in write_set {
            next.entry(keyspace).or_default().extend(writes);
        }
        self.version.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl KvStore for MemStore {
    fn view<T, F>(&self, f: F) -> StrandResult<T>
    where
        F: FnOnce(&dyn Transaction) -> StrandResult<T>,
    {
        self.views.fetch_add(1, Ordering::Relaxed);
        let txn = ReadTxn::new(self.snapshot());
        f(&txn)
    }

    fn update<T, F>(&self, f: F) -> StrandResult<T>
    where
        F: FnOnce(&dyn Transaction) -> StrandResult<T>,
    {
        let _writer = self.writer.lock();
        let txn = WriteTxn::new(self.snapshot());
        match f(&txn) {
            Ok(value) => {
                let write_set = txn.into_write_set();
                let keys: usize = write_set.values().map(|ks| ks.len()).sum();
                let version = self.apply(write_set);
                self.commits.fetch_add(1, Ordering::Relaxed);
                debug!(target: "strand::kv", version, keys, "Transaction committed");
                Ok(value)
            }
            Err(e) => {
                self.aborts.fetch_add(1, Ordering::Relaxed);
                warn!(target: "strand::kv", error = %e, "Transaction rolled back");
                Err(e)
            }
        }
    }
}
