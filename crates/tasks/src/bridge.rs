//! Task services backed by the live tier plus the run archive
//!
//! [`AnalyticalStorage`] decorates the live task services: run finalization
//! also archives the run, and run/log reads fall back to the archive.
//! Everything else passes straight through.

use std::sync::Arc;

use strand_core::{
    ArchiveConfig, ArchiveFailurePolicy, Id, LogEntry, LogFilter, PointsWriter, QueryService,
    RequestContext, Run, RunFilter, StrandError, StrandResult, Task, TaskControlService,
    TaskService,
};
use tracing::{info, warn};

use crate::archive::RunArchiver;
use crate::history::RunHistoryReader;

/// Live task services with run archiving and archive-backed history
#[derive(Clone)]
pub struct AnalyticalStorage {
    live: Arc<dyn TaskService>,
    control: Arc<dyn TaskControlService>,
    archiver: RunArchiver,
    history: RunHistoryReader,
    on_write_failure: ArchiveFailurePolicy,
}

impl AnalyticalStorage {
    /// Wrap the live services
    pub fn new(
        live: Arc<dyn TaskService>,
        control: Arc<dyn TaskControlService>,
        writer: Arc<dyn PointsWriter>,
        queries: Arc<dyn QueryService>,
        config: ArchiveConfig,
    ) -> Self {
        info!(
            target: "strand::archive",
            bucket = %config.system_bucket_id,
            policy = ?config.on_write_failure,
            "Run archive enabled"
        );
        AnalyticalStorage {
            archiver: RunArchiver::new(writer, config.system_bucket_id),
            on_write_failure: config.on_write_failure,
            history: RunHistoryReader::new(Arc::clone(&live), queries, config),
            live,
            control,
        }
    }

    /// The archive writer
    pub fn archiver(&self) -> &RunArchiver {
        &self.archiver
    }

    /// The history reader
    pub fn history(&self) -> &RunHistoryReader {
        &self.history
    }

    fn archive_finished(&self, ctx: &RequestContext, run: &Run) -> StrandResult<()> {
        let task = self.live.find_task_by_id(ctx, run.task_id)?;
        self.archiver.archive(task.org_id, run)
    }
}

impl TaskService for AnalyticalStorage {
    fn find_task_by_id(&self, ctx: &RequestContext, id: Id) -> StrandResult<Task> {
        self.live.find_task_by_id(ctx, id)
    }

    fn find_runs(&self, ctx: &RequestContext, filter: &RunFilter) -> StrandResult<(Vec<Run>, usize)> {
        self.history.find_runs(ctx, filter)
    }

    fn find_run_by_id(&self, ctx: &RequestContext, task_id: Id, run_id: Id) -> StrandResult<Run> {
        self.history.find_run_by_id(ctx, task_id, run_id)
    }

    fn find_logs(
        &self,
        ctx: &RequestContext,
        filter: &LogFilter,
    ) -> StrandResult<(Vec<LogEntry>, usize)> {
        self.history.find_logs(ctx, filter)
    }

    fn retry_run(&self, ctx: &RequestContext, task_id: Id, run_id: Id) -> StrandResult<Run> {
        self.live.retry_run(ctx, task_id, run_id)
    }
}

impl TaskControlService for AnalyticalStorage {
    /// Finish the run in the live tier, then archive it
    ///
    /// A live failure is returned unchanged and nothing is archived. An
    /// archive failure after a successful live finish is handled by the
    /// configured [`ArchiveFailurePolicy`]: `Fail` returns `ArchiveWrite`,
    /// `Warn` logs and returns the finished run.
    fn finish_run(&self, ctx: &RequestContext, task_id: Id, run_id: Id) -> StrandResult<Run> {
        let run = self.control.finish_run(ctx, task_id, run_id)?;
        if !run.status.is_terminal() {
            warn!(
                target: "strand::archive",
                task = %task_id,
                run = %run_id,
                status = %run.status,
                "Finished run is not in a terminal state, not archiving"
            );
            return Ok(run);
        }

        match self.archive_finished(ctx, &run) {
            Ok(()) => Ok(run),
            Err(e) => {
                warn!(
                    target: "strand::archive",
                    task = %task_id,
                    run = %run_id,
                    error = %e,
                    "Run archive write failed"
                );
                match self.on_write_failure {
                    ArchiveFailurePolicy::Fail => Err(StrandError::ArchiveWrite {
                        task_id,
                        run_id,
                        source: Box::new(e),
                    }),
                    ArchiveFailurePolicy::Warn => Ok(run),
                }
            }
        }
    }
}
