//! Bucket keyspace helpers
//!
//! Buckets are stored as JSON under their encoded id.

use strand_core::{Bucket, Id, KvStore, LegacyBucket, StrandResult, Transaction};

/// Keyspace holding bucket records
pub const BUCKETS_KEYSPACE: &[u8] = b"bucketsv1";

/// Upsert a canonical bucket at `key`
pub(crate) fn put_bucket(tx: &dyn Transaction, key: &[u8], bucket: &Bucket) -> StrandResult<()> {
    tx.keyspace(BUCKETS_KEYSPACE)?.put(key, &bucket.to_bytes()?)
}

/// Write legacy-shaped records in one transaction
///
/// Used to import data from older releases and to seed tests.
pub fn put_legacy_buckets<S: KvStore>(store: &S, buckets: &[LegacyBucket]) -> StrandResult<()> {
    store.update(|tx| {
        let ks = tx.keyspace(BUCKETS_KEYSPACE)?;
        for bucket in buckets {
            ks.put(&bucket.id.encode(), &bucket.to_bytes()?)?;
        }
        Ok(())
    })
}

/// All canonical buckets in key order
///
/// # Errors
///
/// `Decode` if any record is not in the current schema.
pub fn find_buckets<S: KvStore>(store: &S) -> StrandResult<Vec<Bucket>> {
    store.view(|tx| {
        let ks = tx.keyspace(BUCKETS_KEYSPACE)?;
        let mut cur = ks.cursor()?;
        let mut out = Vec::new();
        let mut pair = cur.first();
        while let Some((_, value)) = pair {
            out.push(Bucket::from_bytes(&value)?);
            pair = cur.next();
        }
        Ok(out)
    })
}

/// One canonical bucket
pub fn find_bucket<S: KvStore>(store: &S, id: Id) -> StrandResult<Bucket> {
    store.view(|tx| {
        let value = tx.keyspace(BUCKETS_KEYSPACE)?.get(&id.encode())?;
        Bucket::from_bytes(&value)
    })
}
