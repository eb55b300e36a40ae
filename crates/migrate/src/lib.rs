//! Bucket schema migration
//!
//! Converts every record in the bucket keyspace from the legacy schema to
//! the current one, exactly once per store:
//!
//! - [`marker`]: the durable "already converted" record
//! - [`BucketConverter`]: scan, decode, resolve org name, rewrite, mark; all
//!   inside one write transaction
//! - [`MigrationGate`]: convert only when the marker is not set
//! - [`buckets`]: bucket keyspace helpers (seed legacy records, list
//!   canonical ones)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buckets;
pub mod convert;
pub mod gate;
pub mod marker;

pub use buckets::{find_bucket, find_buckets, put_legacy_buckets, BUCKETS_KEYSPACE};
pub use convert::{BucketConversion, BucketConverter};
pub use gate::{MigrationGate, MigrationOutcome};
pub use marker::{MIGRATION_KEYSPACE, MARKER_KEY, MARKER_VALUE};
