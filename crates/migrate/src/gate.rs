//! Startup gate for the bucket migration
//!
//! The check and the conversion are two separate transactions: a read-only
//! marker check, then (only if needed) the converter's write transaction.
//! Two processes can both see "not migrated" and both convert; conversion
//! is idempotent, so the second run only repeats work.

use strand_core::{KvStore, StrandResult};
use tracing::{debug, info};

use crate::convert::BucketConversion;
use crate::marker::read_marker;

/// What `check_and_migrate` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The marker was already set; nothing was touched
    AlreadyMigrated,
    /// The converter ran and rewrote this many records
    Converted(usize),
}

/// Runs the converter only when the marker is not set
#[derive(Debug, Clone)]
pub struct MigrationGate<S, C> {
    store: S,
    converter: C,
}

impl<S: KvStore, C: BucketConversion> MigrationGate<S, C> {
    /// Gate reading the marker from `store` and converting with `converter`
    pub fn new(store: S, converter: C) -> Self {
        Self { store, converter }
    }

    /// The wrapped converter
    pub fn converter(&self) -> &C {
        &self.converter
    }

    /// Whether the marker holds the expected sentinel
    ///
    /// Any failure (missing key, wrong value, transaction error) reads as
    /// `false` and never surfaces as an error.
    pub fn is_bucket_migrated(&self) -> bool {
        match self.store.view(read_marker) {
            Ok(marked) => marked,
            Err(e) => {
                debug!(target: "strand::migrate", error = %e, "Migration marker not readable");
                false
            }
        }
    }

    /// Convert if the marker is not set
    pub fn check_and_migrate(&self) -> StrandResult<MigrationOutcome> {
        if self.is_bucket_migrated() {
            debug!(target: "strand::migrate", "Buckets already migrated");
            return Ok(MigrationOutcome::AlreadyMigrated);
        }
        let converted = self.converter.convert_bucket_to_new()?;
        info!(target: "strand::migrate", converted, "Buckets migrated");
        Ok(MigrationOutcome::Converted(converted))
    }
}
