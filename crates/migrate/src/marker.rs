//! The "buckets converted" marker
//!
//! A fixed key in a dedicated keyspace holding a fixed one-byte sentinel.
//! Only the exact sentinel means "converted"; absence or any other value
//! means "not converted". The marker is written only by the converter, in
//! the same transaction that rewrote every bucket.

use strand_core::{StrandResult, Transaction};

/// Keyspace holding the marker
pub const MIGRATION_KEYSPACE: &[u8] = b"bucketIsMigrated_org";

/// Marker key
pub const MARKER_KEY: &[u8] = b"result";

/// Marker sentinel value
pub const MARKER_VALUE: &[u8] = &[0x01];

/// Whether the marker holds the exact sentinel
///
/// Absence is reported as the store's `NotFound`; callers decide whether
/// that is an error.
pub fn read_marker(tx: &dyn Transaction) -> StrandResult<bool> {
    let value = tx.keyspace(MIGRATION_KEYSPACE)?.get(MARKER_KEY)?;
    Ok(value == MARKER_VALUE)
}

/// Set the marker inside a write transaction
pub fn write_marker(tx: &dyn Transaction) -> StrandResult<()> {
    tx.keyspace(MIGRATION_KEYSPACE)?.put(MARKER_KEY, MARKER_VALUE)
}
