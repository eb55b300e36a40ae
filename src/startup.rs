//! Startup hooks

use strand_core::{KvStore, MigrationConfig, OrganizationNames, StrandResult};
use strand_migrate::{BucketConverter, MigrationGate, MigrationOutcome};
use tracing::info;

/// Run the bucket migration check if `[migration] check_on_open` is set
///
/// Returns `None` when the check is disabled. A conversion failure is
/// returned to the caller; the marker stays unset, so the next start
/// retries.
pub fn migrate_on_open<S, O>(
    config: &MigrationConfig,
    store: S,
    orgs: O,
) -> StrandResult<Option<MigrationOutcome>>
where
    S: KvStore + Clone,
    O: OrganizationNames,
{
    if !config.check_on_open {
        info!(target: "strand::migrate", "Bucket migration check disabled");
        return Ok(None);
    }
    let gate = MigrationGate::new(store.clone(), BucketConverter::new(store, orgs));
    gate.check_and_migrate().map(Some)
}
