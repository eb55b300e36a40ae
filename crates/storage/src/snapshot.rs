//! Immutable point-in-time view of the store
//!
//! The store keeps its committed state behind an `Arc`. Taking a snapshot
//! clones the `Arc`, not the data; a commit replaces the `Arc` wholesale,
//! so a snapshot never observes writes committed after it was taken.

use std::collections::BTreeMap;
use std::sync::Arc;

/// Keys to values of one keyspace
pub type KeyspaceData = BTreeMap<Vec<u8>, Vec<u8>>;

/// Committed state: keyspace name to keyspace contents
pub type StoreData = BTreeMap<Vec<u8>, KeyspaceData>;

/// Immutable view of committed state at one version
#[derive(Debug, Clone)]
pub struct Snapshot {
    version: u64,
    data: Arc<StoreData>,
}

impl Snapshot {
    /// Wrap committed state
    pub(crate) fn new(version: u64, data: Arc<StoreData>) -> Self {
        Self { version, data }
    }

    /// Commit version this snapshot was taken at
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Read one key
    pub fn get(&self, keyspace: &[u8], key: &[u8]) -> Option<&Vec<u8>> {
        self.data.get(keyspace).and_then(|ks| ks.get(key))
    }

    /// Contents of one keyspace, if it has ever been written
    pub fn keyspace(&self, keyspace: &[u8]) -> Option<&KeyspaceData> {
        self.data.get(keyspace)
    }

    /// Number of keys in a keyspace
    pub fn len(&self, keyspace: &[u8]) -> usize {
        self.keyspace(keyspace).map_or(0, |ks| ks.len())
    }

    /// True when the keyspace holds nothing
    pub fn is_empty(&self, keyspace: &[u8]) -> bool {
        self.len(keyspace) == 0
    }
}
