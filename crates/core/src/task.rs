//! Tasks, runs and run logs
//!
//! A run is created by the scheduler in the live tier and moves through
//! `Scheduled -> Started -> {Success, Failed, Canceled}`. Once terminal it
//! is copied into the archive; the live tier keeps it until its own
//! retention evicts it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{StrandError, StrandResult};
use crate::id::Id;

/// Recurring unit of scheduled work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Task id
    pub id: Id,
    /// Owning organization
    #[serde(rename = "orgID")]
    pub org_id: Id,
    /// Display name
    pub name: String,
}

/// Lifecycle state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Queued for execution
    Scheduled,
    /// Executing
    Started,
    /// Finished successfully
    Success,
    /// Finished with an error
    Failed,
    /// Canceled before finishing
    Canceled,
}

impl RunStatus {
    /// Whether no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Success | RunStatus::Failed | RunStatus::Canceled
        )
    }

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Scheduled => "scheduled",
            RunStatus::Started => "started",
            RunStatus::Success => "success",
            RunStatus::Failed => "failed",
            RunStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = StrandError;

    fn from_str(s: &str) -> StrandResult<Self> {
        match s {
            "scheduled" => Ok(RunStatus::Scheduled),
            "started" => Ok(RunStatus::Started),
            "success" => Ok(RunStatus::Success),
            "failed" => Ok(RunStatus::Failed),
            "canceled" => Ok(RunStatus::Canceled),
            other => Err(StrandError::decode("unknown run status", other.as_bytes())),
        }
    }
}

/// One line of a run's log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Run that produced the line
    #[serde(rename = "runID")]
    pub run_id: Id,
    /// When it was written
    pub time: DateTime<Utc>,
    /// Message text
    pub message: String,
}

/// One execution of a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    /// Run id
    pub id: Id,
    /// Task this run belongs to
    #[serde(rename = "taskID")]
    pub task_id: Id,
    /// Current state
    pub status: RunStatus,
    /// The time the run was scheduled for; the archive timestamp
    #[serde(rename = "scheduledFor")]
    pub scheduled_for: DateTime<Utc>,
    /// When execution began
    #[serde(rename = "startedAt", default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When execution ended
    #[serde(rename = "finishedAt", default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Set for manually requested runs
    #[serde(rename = "requestedAt", default, skip_serializing_if = "Option::is_none")]
    pub requested_at: Option<DateTime<Utc>>,
    /// Ordered log lines
    #[serde(default)]
    pub log: Vec<LogEntry>,
}

/// Page request over a task's runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFilter {
    /// Task whose runs are listed
    pub task: Id,
    /// Only runs with an id greater than this
    pub after: Option<Id>,
    /// Page size; 0 means "platform maximum"
    pub limit: usize,
}

impl RunFilter {
    /// First page of a task's runs at the platform maximum page size
    pub fn for_task(task: Id) -> Self {
        RunFilter {
            task,
            after: None,
            limit: 0,
        }
    }
}

/// Log request for a task, optionally narrowed to one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    /// Task whose logs are read
    pub task: Id,
    /// Single run, if given
    pub run: Option<Id>,
}
