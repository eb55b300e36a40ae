//! Collaborator contracts
//!
//! These traits are the narrow seams between Strand and the systems it
//! consumes: the transactional key-value store, organization lookup, point
//! ingestion, and the live task services.

use std::sync::Arc;

use crate::auth::RequestContext;
use crate::error::StrandResult;
use crate::id::Id;
use crate::point::Point;
use crate::task::{LogEntry, LogFilter, Run, RunFilter, Task};

/// A key/value pair produced by a cursor
pub type KvPair = (Vec<u8>, Vec<u8>);

/// Forward cursor over a keyspace, ordered by key
pub trait Cursor {
    /// Position on the first pair
    fn first(&mut self) -> Option<KvPair>;

    /// Advance and return the next pair
    fn next(&mut self) -> Option<KvPair>;
}

/// Named key space inside a transaction
pub trait Keyspace {
    /// Read a value
    ///
    /// # Errors
    ///
    /// `NotFound` if the key is absent.
    fn get(&self, key: &[u8]) -> StrandResult<Vec<u8>>;

    /// Insert or overwrite a value
    ///
    /// # Errors
    ///
    /// `TransactionReadOnly` inside a read-only transaction.
    fn put(&self, key: &[u8], value: &[u8]) -> StrandResult<()>;

    /// Open a cursor over the keyspace as seen by this transaction
    fn cursor(&self) -> StrandResult<Box<dyn Cursor + '_>>;
}

/// An open transaction
pub trait Transaction {
    /// Open a keyspace by name
    fn keyspace(&self, name: &[u8]) -> StrandResult<Box<dyn Keyspace + '_>>;
}

/// Transactional key-value store
///
/// `view` runs its closure against an isolated read-only snapshot.
/// `update` runs its closure in a write transaction that commits only if
/// the closure returns `Ok`; an error commits nothing.
pub trait KvStore: Send + Sync {
    /// Run a read-only transaction
    fn view<T, F>(&self, f: F) -> StrandResult<T>
    where
        F: FnOnce(&dyn Transaction) -> StrandResult<T>;

    /// Run a write transaction
    fn update<T, F>(&self, f: F) -> StrandResult<T>
    where
        F: FnOnce(&dyn Transaction) -> StrandResult<T>;
}

impl<S: KvStore> KvStore for &S {
    fn view<T, F>(&self, f: F) -> StrandResult<T>
    where
        F: FnOnce(&dyn Transaction) -> StrandResult<T>,
    {
        (**self).view(f)
    }

    fn update<T, F>(&self, f: F) -> StrandResult<T>
    where
        F: FnOnce(&dyn Transaction) -> StrandResult<T>,
    {
        (**self).update(f)
    }
}

impl<S: KvStore> KvStore for Arc<S> {
    fn view<T, F>(&self, f: F) -> StrandResult<T>
    where
        F: FnOnce(&dyn Transaction) -> StrandResult<T>,
    {
        (**self).view(f)
    }

    fn update<T, F>(&self, f: F) -> StrandResult<T>
    where
        F: FnOnce(&dyn Transaction) -> StrandResult<T>,
    {
        (**self).update(f)
    }
}

/// Resolves an organization id to its current name
pub trait OrganizationNames: Send + Sync {
    /// Current name of `org_id`
    ///
    /// # Errors
    ///
    /// `NotFound` if the organization does not exist.
    fn name_of(&self, org_id: Id) -> StrandResult<String>;
}

impl<O: OrganizationNames + ?Sized> OrganizationNames for Arc<O> {
    fn name_of(&self, org_id: Id) -> StrandResult<String> {
        (**self).name_of(org_id)
    }
}

/// Point ingestion path
pub trait PointsWriter: Send + Sync {
    /// Durably write points into `bucket_id` of `org_id`
    fn write_points(&self, org_id: Id, bucket_id: Id, points: Vec<Point>) -> StrandResult<()>;
}

/// Live run and log source
///
/// Missing runs are reported as a `NotFound` error whose entity is
/// [`crate::error::Entity::Run`].
pub trait TaskService: Send + Sync {
    /// Look up a task
    fn find_task_by_id(&self, ctx: &RequestContext, id: Id) -> StrandResult<Task>;

    /// One page of a task's runs, ascending by run id, and its length
    fn find_runs(&self, ctx: &RequestContext, filter: &RunFilter) -> StrandResult<(Vec<Run>, usize)>;

    /// A single run
    fn find_run_by_id(&self, ctx: &RequestContext, task_id: Id, run_id: Id) -> StrandResult<Run>;

    /// Log lines of a task or one of its runs, and their count
    fn find_logs(
        &self,
        ctx: &RequestContext,
        filter: &LogFilter,
    ) -> StrandResult<(Vec<LogEntry>, usize)>;

    /// Schedule a new attempt of a finished run
    fn retry_run(&self, ctx: &RequestContext, task_id: Id, run_id: Id) -> StrandResult<Run>;
}

/// Run state transitions driven by the executor
pub trait TaskControlService: Send + Sync {
    /// Mark a run finished and return its final state
    fn finish_run(&self, ctx: &RequestContext, task_id: Id, run_id: Id) -> StrandResult<Run>;
}
