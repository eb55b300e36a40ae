//! Legacy bucket conversion
//!
//! `convert_bucket_to_new` runs inside exactly one write transaction:
//!
//! 1. cursor over the bucket keyspace in key order
//! 2. decode each value as a [`LegacyBucket`]; a decode failure aborts the
//!    whole transaction with the offending payload
//! 3. resolve the organization's *current* name and upsert the canonical
//!    [`Bucket`] at the same key
//! 4. write the marker
//!
//! A crash or error at any step leaves the store as it was. The result is a
//! pure function of the keyspace contents and the organization names, so
//! re-running on converted data rewrites every record to itself.

use strand_core::{
    Bucket, KvStore, LegacyBucket, OrganizationNames, StrandResult, Transaction,
};
use tracing::{info, warn};

use crate::buckets::{put_bucket, BUCKETS_KEYSPACE};
use crate::marker::write_marker;

/// Something that can convert the bucket keyspace
///
/// The gate talks to the converter through this seam.
pub trait BucketConversion {
    /// Convert every bucket and set the marker; returns records rewritten
    fn convert_bucket_to_new(&self) -> StrandResult<usize>;
}

/// Rewrites legacy bucket records into the current schema
#[derive(Debug, Clone)]
pub struct BucketConverter<S, O> {
    store: S,
    orgs: O,
}

impl<S: KvStore, O: OrganizationNames> BucketConverter<S, O> {
    /// Converter over `store`, resolving names through `orgs`
    pub fn new(store: S, orgs: O) -> Self {
        Self { store, orgs }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    fn convert_in(&self, tx: &dyn Transaction) -> StrandResult<usize> {
        let ks = tx.keyspace(BUCKETS_KEYSPACE)?;
        let mut cur = ks.cursor()?;
        let mut converted = 0;

        let mut pair = cur.first();
        while let Some((key, value)) = pair {
            let legacy = LegacyBucket::from_bytes(&value).map_err(|e| {
                warn!(target: "strand::migrate", key = %String::from_utf8_lossy(&key), error = %e, "Legacy bucket decode failed");
                e
            })?;
            let org = self.orgs.name_of(legacy.org_id)?;
            put_bucket(tx, &key, &Bucket::from_legacy(&legacy, org))?;
            converted += 1;
            pair = cur.next();
        }

        write_marker(tx)?;
        Ok(converted)
    }
}

impl<S: KvStore, O: OrganizationNames> BucketConversion for BucketConverter<S, O> {
    fn convert_bucket_to_new(&self) -> StrandResult<usize> {
        info!(target: "strand::migrate", "Bucket conversion started");
        let converted = self.store.update(|tx| self.convert_in(tx))?;
        info!(target: "strand::migrate", converted, "Bucket conversion finished");
        Ok(converted)
    }
}
