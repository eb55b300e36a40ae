//! Read and write transactions over a [`Snapshot`]
//!
//! A read transaction is the snapshot itself. A write transaction layers a
//! pending write set over its base snapshot; reads see pending writes
//! first (read-your-writes). Nothing reaches the store until the owning
//! `update` call commits the write set.

use std::cell::RefCell;

use strand_core::{
    Cursor, Entity, KvPair, Keyspace, StrandError, StrandResult, Transaction,
};

use crate::snapshot::{KeyspaceData, Snapshot, StoreData};

/// Read-only transaction
pub(crate) struct ReadTxn {
    snapshot: Snapshot,
}

impl ReadTxn {
    pub(crate) fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }
}

impl Transaction for ReadTxn {
    fn keyspace(&self, name: &[u8]) -> StrandResult<Box<dyn Keyspace + '_>> {
        Ok(Box::new(KeyspaceHandle {
            name: name.to_vec(),
            base: &self.snapshot,
            pending: None,
        }))
    }
}

/// Write transaction with a buffered write set
pub(crate) struct WriteTxn {
    base: Snapshot,
    pending: RefCell<StoreData>,
}

impl WriteTxn {
    pub(crate) fn new(base: Snapshot) -> Self {
        Self {
            base,
            pending: RefCell::new(StoreData::new()),
        }
    }

    /// Consume the transaction, yielding its write set
    pub(crate) fn into_write_set(self) -> StoreData {
        self.pending.into_inner()
    }
}

impl Transaction for WriteTxn {
    fn keyspace(&self, name: &[u8]) -> StrandResult<Box<dyn Keyspace + '_>> {
        Ok(Box::new(KeyspaceHandle {
            name: name.to_vec(),
            base: &self.base,
            pending: Some(&self.pending),
        }))
    }
}

struct KeyspaceHandle<'a> {
    name: Vec<u8>,
    base: &'a Snapshot,
    pending: Option<&'a RefCell<StoreData>>,
}

impl Keyspace for KeyspaceHandle<'_> {
    fn get(&self, key: &[u8]) -> StrandResult<Vec<u8>> {
        if let Some(pending) = self.pending {
            if let Some(value) = pending.borrow().get(&self.name).and_then(|ks| ks.get(key)) {
                return Ok(value.clone());
            }
        }
        self.base
            .get(&self.name, key)
            .cloned()
            .ok_or_else(|| StrandError::not_found(Entity::Key, String::from_utf8_lossy(key)))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> StrandResult<()> {
        let pending = self.pending.ok_or(StrandError::TransactionReadOnly)?;
        pending
            .borrow_mut()
            .entry(self.name.clone())
            .or_default()
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn cursor(&self) -> StrandResult<Box<dyn Cursor + '_>> {
        let mut merged: KeyspaceData = self.base.keyspace(&self.name).cloned().unwrap_or_default();
        if let Some(pending) = self.pending {
            if let Some(writes) = pending.borrow().get(&self.name) {
                merged.extend(writes.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        Ok(Box::new(SnapshotCursor {
            pairs: merged.into_iter().collect(),
            pos: 0,
        }))
    }
}

/// Cursor over pairs materialized when it was opened
///
/// Puts made through the same transaction after the cursor opened are not
/// visited, so rewriting keys while iterating is safe.
struct SnapshotCursor {
    pairs: Vec<KvPair>,
    pos: usize,
}

impl Cursor for SnapshotCursor {
    fn first(&mut self) -> Option<KvPair> {
        self.pos = 0;
        self.next()
    }

    fn next(&mut self) -> Option<KvPair> {
        let pair = self.pairs.get(self.pos).cloned();
        if pair.is_some() {
            self.pos += 1;
        }
        pair
    }
}
