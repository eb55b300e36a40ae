//! Core types and traits for Strand
//!
//! This crate defines the foundational types used throughout the system:
//! - Id: non-zero 64-bit platform identifier with a fixed 16-hex encoding
//! - Bucket / LegacyBucket: current and legacy bucket records
//! - Organization, Task, Run, LogEntry: tenancy and task-run domain types
//! - Point: time-series record written by the run archiver
//! - Error: error taxonomy with tagged kinds
//! - Traits: collaborator contracts (KvStore, OrganizationNames,
//!   PointsWriter, QueryService, TaskService, TaskControlService)
//! - Config: `strand.toml` settings

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod bucket;
pub mod config;
pub mod error;
pub mod id;
pub mod org;
pub mod point;
pub mod query;
pub mod task;
pub mod traits;

pub use auth::{Authorization, Authorizer, RequestContext, Session, AUTHORIZATION_KIND};
pub use bucket::{Bucket, LegacyBucket};
pub use config::{ArchiveConfig, ArchiveFailurePolicy, MigrationConfig, StrandConfig};
pub use error::{Entity, ErrorKind, StrandError, StrandResult};
pub use id::{Id, TASK_SYSTEM_BUCKET_ID};
pub use org::{OrgDirectory, Organization};
pub use point::{FieldValue, Point};
pub use query::{QueryRequest, QueryResult, QueryService, Record, ResultIterator, Scalar};
pub use task::{LogEntry, LogFilter, Run, RunFilter, RunStatus, Task};
pub use traits::{
    Cursor, KvPair, KvStore, Keyspace, OrganizationNames, PointsWriter, TaskControlService,
    TaskService, Transaction,
};
