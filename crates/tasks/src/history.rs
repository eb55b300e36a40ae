//! Run history across the live tier and the archive
//!
//! Reads go to the live tier first. The archive is consulted when the live
//! tier returns a short page, or reports a run as missing. Archive
//! queries run as the caller's token authorization, scoped to the task's
//! organization; any other principal fails closed before a query is issued.

use std::collections::BTreeMap;
use std::sync::Arc;

use strand_core::{
    ArchiveConfig, Entity, Id, LogEntry, LogFilter, QueryRequest, QueryService, RequestContext,
    Run, RunFilter, StrandError, StrandResult, TaskService,
};
use tracing::debug;

use crate::guard::ReleaseGuard;
use crate::plan::ArchiveQuery;
use crate::schema::{run_from_record, RUN_ID_FIELD, TASK_ID_TAG};

/// Merges live and archived runs and logs
#[derive(Clone)]
pub struct RunHistoryReader {
    live: Arc<dyn TaskService>,
    queries: Arc<dyn QueryService>,
    config: ArchiveConfig,
}

impl RunHistoryReader {
    /// Reader over `live` falling back to `queries`
    pub fn new(
        live: Arc<dyn TaskService>,
        queries: Arc<dyn QueryService>,
        config: ArchiveConfig,
    ) -> Self {
        RunHistoryReader {
            live,
            queries,
            config,
        }
    }

    /// Effective page size: 0 or anything above the maximum becomes the maximum
    pub fn page_size(&self, requested: usize) -> usize {
        if requested == 0 || requested > self.config.max_page_size {
            self.config.max_page_size
        } else {
            requested
        }
    }

    fn plan(&self, task_id: Id) -> ArchiveQuery {
        ArchiveQuery::runs(self.config.system_bucket_id, self.config.lookback_days)
            .tag_eq(TASK_ID_TAG, task_id)
    }

    /// Run `plan` against the archive of `task_id`'s organization
    fn archived_runs(
        &self,
        ctx: &RequestContext,
        task_id: Id,
        plan: ArchiveQuery,
    ) -> StrandResult<Vec<Run>> {
        let authorization = ctx.authorization()?.clone();
        let task = self.live.find_task_by_id(ctx, task_id)?;
        let request = QueryRequest {
            authorization,
            org_id: task.org_id,
            query: plan.render(),
        };
        debug!(
            target: "strand::history",
            task = %task_id,
            org = %task.org_id,
            query_len = request.query.len(),
            "Querying run archive"
        );

        let records = ReleaseGuard::new(self.queries.query(ctx, request)?).records()?;
        records.iter().map(run_from_record).collect()
    }

    /// One page of a task's runs, live and archived, in ascending run-id order
    ///
    /// The archive is not queried when the live tier fills the page. Otherwise
    /// both tiers are read from the caller's cursor and merged by run id; a run
    /// present in both tiers is taken from the live tier. The merged page never
    /// exceeds the effective page size.
    pub fn find_runs(
        &self,
        ctx: &RequestContext,
        filter: &RunFilter,
    ) -> StrandResult<(Vec<Run>, usize)> {
        let filter = RunFilter {
            limit: self.page_size(filter.limit),
            ..filter.clone()
        };

        let (live, count) = self.live.find_runs(ctx, &filter)?;
        if live.len() >= filter.limit {
            return Ok((live, count));
        }

        let mut plan = self.plan(filter.task);
        if let Some(after) = filter.after {
            plan = plan.field_gt(RUN_ID_FIELD, after);
        }
        let plan = plan.sort_by(RUN_ID_FIELD).limit(filter.limit);

        let archived = self.archived_runs(ctx, filter.task, plan)?;
        debug!(
            target: "strand::history",
            task = %filter.task,
            live = live.len(),
            archived = archived.len(),
            "Merged run page"
        );

        let mut merged: BTreeMap<Id, Run> = archived.into_iter().map(|r| (r.id, r)).collect();
        merged.extend(live.into_iter().map(|r| (r.id, r)));
        let runs: Vec<Run> = merged.into_values().take(filter.limit).collect();
        let count = runs.len();
        Ok((runs, count))
    }

    /// A single run, from the archive if the live tier has no such run
    pub fn find_run_by_id(
        &self,
        ctx: &RequestContext,
        task_id: Id,
        run_id: Id,
    ) -> StrandResult<Run> {
        match self.live.find_run_by_id(ctx, task_id, run_id) {
            Err(e) if e.is_run_not_found() => {
                debug!(target: "strand::history", task = %task_id, run = %run_id, "Run not live, trying archive");
            }
            other => return other,
        }

        let plan = self
            .plan(task_id)
            .field_eq(RUN_ID_FIELD, run_id)
            .limit(1);
        self.archived_runs(ctx, task_id, plan)?
            .into_iter()
            .next()
            .ok_or_else(|| StrandError::not_found(Entity::Run, run_id))
    }

    /// Log lines, from the archive if the live tier has no such run
    ///
    /// Archived logs are returned grouped by run in ascending run-id order.
    pub fn find_logs(
        &self,
        ctx: &RequestContext,
        filter: &LogFilter,
    ) -> StrandResult<(Vec<LogEntry>, usize)> {
        match self.live.find_logs(ctx, filter) {
            Err(e) if e.is_run_not_found() => {
                debug!(target: "strand::history", task = %filter.task, "Logs not live, trying archive");
            }
            other => return other,
        }

        let mut plan = self.plan(filter.task);
        if let Some(run_id) = filter.run {
            plan = plan.field_eq(RUN_ID_FIELD, run_id);
        }
        let runs = self.archived_runs(ctx, filter.task, plan.sort_by(RUN_ID_FIELD))?;

        if runs.is_empty() {
            if let Some(run_id) = filter.run {
                return Err(StrandError::not_found(Entity::Run, run_id));
            }
        }
        let logs: Vec<LogEntry> = runs.into_iter().flat_map(|run| run.log).collect();
        let count = logs.len();
        Ok((logs, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_core::Task;

    struct NoLive;

    impl TaskService for NoLive {
        fn find_task_by_id(&self, _: &RequestContext, id: Id) -> StrandResult<Task> {
            Err(StrandError::not_found(Entity::Task, id))
        }

        fn find_runs(&self, _: &RequestContext, _: &RunFilter) -> StrandResult<(Vec<Run>, usize)> {
            Ok((Vec::new(), 0))
        }

        fn find_run_by_id(&self, _: &RequestContext, _: Id, run_id: Id) -> StrandResult<Run> {
            Err(StrandError::not_found(Entity::Run, run_id))
        }

        fn find_logs(
            &self,
            _: &RequestContext,
            _: &LogFilter,
        ) -> StrandResult<(Vec<LogEntry>, usize)> {
            Ok((Vec::new(), 0))
        }

        fn retry_run(&self, _: &RequestContext, _: Id, run_id: Id) -> StrandResult<Run> {
            Err(StrandError::not_found(Entity::Run, run_id))
        }
    }

    struct NoQueries;

    impl QueryService for NoQueries {
        fn query(
            &self,
            _: &RequestContext,
            _: QueryRequest,
        ) -> StrandResult<Box<dyn strand_core::ResultIterator>> {
            Err(StrandError::query("no engine"))
        }
    }

    fn reader(max_page_size: usize) -> RunHistoryReader {
        RunHistoryReader::new(
            Arc::new(NoLive),
            Arc::new(NoQueries),
            ArchiveConfig {
                max_page_size,
                ..ArchiveConfig::default()
            },
        )
    }

    #[test]
    fn test_page_size_clamp() {
        let r = reader(500);
        assert_eq!(r.page_size(0), 500);
        assert_eq!(r.page_size(1), 1);
        assert_eq!(r.page_size(500), 500);
        assert_eq!(r.page_size(501), 500);
        assert_eq!(r.page_size(usize::MAX), 500);
    }

    #[test]
    fn test_unauthenticated_fallback_fails_closed() {
        let task = Id::new(0x11).unwrap();
        let err = reader(10)
            .find_run_by_id(&RequestContext::background(), task, Id::new(0x21).unwrap())
            .unwrap_err();
        assert_eq!(err.kind(), strand_core::ErrorKind::Unauthorized);
    }
}
