//! Error types for Strand
//!
//! Every fallible operation returns [`StrandResult`]. Callers branch on
//! [`StrandError::kind`], never on the rendered message: the tier fallback
//! in the run history reader depends on `NotFound` being a tagged kind.
//!
//! We use `thiserror` for automatic `Display` and `Error` implementations.

use thiserror::Error;

use crate::id::Id;

/// Result type alias for Strand operations
pub type StrandResult<T> = std::result::Result<T, StrandError>;

/// Coarse error classification used for control flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Transactional store failure
    Storage,
    /// Malformed persisted record
    Decode,
    /// Entity does not exist
    NotFound,
    /// Principal missing or of an unsupported kind
    Unauthorized,
    /// Query engine failure
    Query,
    /// Run finished in the live tier but was not archived
    ArchiveWrite,
    /// Bad argument or configuration
    InvalidInput,
    /// File-system failure outside the transactional store
    Io,
}

/// Entity named by a [`StrandError::NotFound`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    /// Organization
    Organization,
    /// Task
    Task,
    /// Run of a task
    Run,
    /// Bucket record
    Bucket,
    /// Raw key in a keyspace
    Key,
    /// Keyspace inside the store
    Keyspace,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Entity::Organization => "organization",
            Entity::Task => "task",
            Entity::Run => "run",
            Entity::Bucket => "bucket",
            Entity::Key => "key",
            Entity::Keyspace => "keyspace",
        };
        f.write_str(name)
    }
}

/// Error type for all Strand operations
#[derive(Debug, Error)]
pub enum StrandError {
    /// I/O or engine failure inside the transactional store
    #[error("storage error: {message}")]
    Storage {
        /// What failed
        message: String,
    },

    /// A persisted record could not be decoded
    #[error("{message}: {payload}")]
    Decode {
        /// What failed to decode
        message: String,
        /// The offending raw payload (lossy UTF-8)
        payload: String,
    },

    /// Entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity
        entity: Entity,
        /// Identifier that was looked up
        id: String,
    },

    /// Archive queries require an "authorization" principal
    #[error("authorizer not supported: {}", kind.as_deref().unwrap_or("none"))]
    UnsupportedAuthorizer {
        /// Kind of the principal found on the request, if any
        kind: Option<String>,
    },

    /// Query engine reported an error
    #[error("query error: {message}")]
    Query {
        /// Engine message
        message: String,
    },

    /// The run finished in the live tier but could not be archived
    #[error("run {run_id} of task {task_id} finished but was not archived: {source}")]
    ArchiveWrite {
        /// Task owning the run
        task_id: Id,
        /// The finished run
        run_id: Id,
        /// Why the point write failed
        #[source]
        source: Box<StrandError>,
    },

    /// A write was attempted through a read-only transaction
    #[error("transaction is read-only")]
    TransactionReadOnly,

    /// Invalid argument or configuration
    #[error("invalid input: {message}")]
    InvalidInput {
        /// What was wrong
        message: String,
    },

    /// Reading or writing a file (configuration) failed
    #[error("{message}: {source}")]
    Io {
        /// What was being done
        message: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl StrandError {
    /// Storage failure
    pub fn storage(message: impl Into<String>) -> Self {
        StrandError::Storage {
            message: message.into(),
        }
    }

    /// Decode failure carrying the raw payload
    pub fn decode(message: impl Into<String>, payload: &[u8]) -> Self {
        StrandError::Decode {
            message: message.into(),
            payload: String::from_utf8_lossy(payload).into_owned(),
        }
    }

    /// Missing entity
    pub fn not_found(entity: Entity, id: impl ToString) -> Self {
        StrandError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Query engine failure
    pub fn query(message: impl Into<String>) -> Self {
        StrandError::Query {
            message: message.into(),
        }
    }

    /// Invalid argument or configuration
    pub fn invalid_input(message: impl Into<String>) -> Self {
        StrandError::InvalidInput {
            message: message.into(),
        }
    }

    /// File-system failure
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        StrandError::Io {
            message: message.into(),
            source,
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            StrandError::Storage { .. } | StrandError::TransactionReadOnly => ErrorKind::Storage,
            StrandError::Decode { .. } => ErrorKind::Decode,
            StrandError::NotFound { .. } => ErrorKind::NotFound,
            StrandError::UnsupportedAuthorizer { .. } => ErrorKind::Unauthorized,
            StrandError::Query { .. } => ErrorKind::Query,
            StrandError::ArchiveWrite { .. } => ErrorKind::ArchiveWrite,
            StrandError::InvalidInput { .. } => ErrorKind::InvalidInput,
            StrandError::Io { .. } => ErrorKind::Io,
        }
    }

    /// True for any `NotFound`
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// True when a run (as opposed to its task or anything else) is missing
    pub fn is_run_not_found(&self) -> bool {
        matches!(
            self,
            StrandError::NotFound {
                entity: Entity::Run,
                ..
            }
        )
    }
}

impl From<serde_json::Error> for StrandError {
    fn from(e: serde_json::Error) -> Self {
        StrandError::InvalidInput {
            message: format!("serialization failed: {e}"),
        }
    }
}
