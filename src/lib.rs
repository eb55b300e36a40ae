//! Strand - bucket migration and run-history archiving for a multi-tenant
//! time-series platform
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use strand::{migrate_on_open, AnalyticalStorage, MemStore, OrgDirectory, StrandConfig};
//!
//! let config = StrandConfig::from_file("strand.toml".as_ref())?;
//!
//! // Bring legacy bucket records up to date before serving
//! let store = Arc::new(MemStore::new());
//! migrate_on_open(&config.migration, Arc::clone(&store), Arc::new(OrgDirectory::new()))?;
//!
//! // Wrap the live task services so finished runs are archived
//! let tasks = AnalyticalStorage::new(live, control, points, queries, config.archive);
//! ```
//!
//! # Architecture
//!
//! - [`strand_core`]: ids, records, errors, config and collaborator traits
//! - [`strand_storage`]: in-memory transactional key-value store
//! - [`strand_migrate`]: marker-gated legacy bucket conversion
//! - [`strand_tasks`]: run archiver and live/archive history reader

#![warn(missing_docs)]

mod startup;

pub use startup::migrate_on_open;

pub use strand_core::*;
pub use strand_migrate::{
    find_bucket, find_buckets, put_legacy_buckets, BucketConversion, BucketConverter,
    MigrationGate, MigrationOutcome,
};
pub use strand_storage::{MemStore, Snapshot, StoreStats};
pub use strand_tasks::{AnalyticalStorage, ArchiveQuery, RunArchiver, RunHistoryReader};
