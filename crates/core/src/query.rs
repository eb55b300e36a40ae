//! Query-engine surface consumed by the archive reader
//!
//! The engine itself (language, planning, execution) is external. Strand
//! only sees a request in, and an iterator of named results out. Each
//! result is a list of flat records keyed by column name.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::auth::{Authorization, RequestContext};
use crate::error::StrandResult;
use crate::id::Id;

/// Scalar cell of a result record
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Missing value
    Null,
    /// UTF-8 string
    String(String),
    /// Signed integer
    Integer(i64),
    /// Float
    Float(f64),
    /// Boolean
    Boolean(bool),
    /// Timestamp
    Time(DateTime<Utc>),
}

impl Scalar {
    /// String payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }
}

/// One row of a result, column name to value
pub type Record = BTreeMap<String, Scalar>;

/// One named result produced by a query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Result name (the engine's yield name)
    pub name: String,
    /// Rows in engine order
    pub records: Vec<Record>,
}

/// A compiled query and the principal it runs as
#[derive(Debug, Clone)]
pub struct QueryRequest {
    /// Principal the query runs as
    pub authorization: Authorization,
    /// Organization whose buckets are visible
    pub org_id: Id,
    /// Query text in the engine's surface syntax
    pub query: String,
}

/// Results of a running query
///
/// The engine holds execution resources until [`ResultIterator::release`]
/// is called. Callers must release on every exit path.
pub trait ResultIterator: Send {
    /// Whether another result is available
    fn more(&mut self) -> bool;

    /// Next result, or the error the engine hit producing it
    fn next(&mut self) -> StrandResult<QueryResult>;

    /// Free engine resources; further calls to `more` return false
    fn release(&mut self);
}

/// Query execution entry point
pub trait QueryService: Send + Sync {
    /// Start a query
    fn query(
        &self,
        ctx: &RequestContext,
        request: QueryRequest,
    ) -> StrandResult<Box<dyn ResultIterator>>;
}
