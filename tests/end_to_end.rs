//! End-to-end tests through the `strand` facade
//!
//! Configuration is loaded from TOML, the startup migration runs against a
//! seeded store, and a run is finished and then read back from the archive.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use strand::{
    find_buckets, migrate_on_open, AnalyticalStorage, ArchiveFailurePolicy, Authorization,
    Entity, Id, LegacyBucket, LogEntry, LogFilter, MemStore, MigrationOutcome, OrgDirectory,
    Organization, Point, PointsWriter, QueryRequest, QueryResult, QueryService, Record,
    RequestContext, ResultIterator, Run, RunFilter, RunStatus, Scalar, StrandConfig,
    StrandError, StrandResult, Task, TaskControlService, TaskService,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn id(raw: u64) -> Id {
    Id::new(raw).unwrap()
}

fn orgs() -> Arc<OrgDirectory> {
    Arc::new(OrgDirectory::from_orgs([Organization {
        id: id(1),
        name: "acme".to_string(),
    }]))
}

fn legacy(raw: u64, stale_name: &str) -> LegacyBucket {
    LegacyBucket {
        id: id(raw),
        org_id: id(1),
        organization: Some(stale_name.to_string()),
        org: None,
        name: format!("bucket{}", raw),
        retention_policy_name: "autogen".to_string(),
        retention_period: Duration::from_secs(3600),
    }
}

/// Live tier holding one task and its unfinished runs
struct Live {
    task: Task,
    runs: Mutex<BTreeMap<Id, Run>>,
}

impl Live {
    fn new() -> Arc<Self> {
        Arc::new(Live {
            task: Task {
                id: id(0x11),
                org_id: id(1),
                name: "rollup".to_string(),
            },
            runs: Mutex::new(BTreeMap::new()),
        })
    }
}

impl TaskService for Live {
    fn find_task_by_id(&self, _: &RequestContext, task_id: Id) -> StrandResult<Task> {
        if task_id == self.task.id {
            Ok(self.task.clone())
        } else {
            Err(StrandError::not_found(Entity::Task, task_id))
        }
    }

    fn find_runs(&self, _: &RequestContext, filter: &RunFilter) -> StrandResult<(Vec<Run>, usize)> {
        let runs: Vec<Run> = self.runs.lock().values().take(filter.limit).cloned().collect();
        let count = runs.len();
        Ok((runs, count))
    }

    fn find_run_by_id(&self, _: &RequestContext, _: Id, run_id: Id) -> StrandResult<Run> {
        self.runs
            .lock()
            .get(&run_id)
            .cloned()
            .ok_or_else(|| StrandError::not_found(Entity::Run, run_id))
    }

    fn find_logs(&self, _: &RequestContext, filter: &LogFilter) -> StrandResult<(Vec<LogEntry>, usize)> {
        let run_id = filter.run.unwrap_or(id(0xfff));
        let run = self.find_run_by_id(&RequestContext::background(), filter.task, run_id)?;
        let count = run.log.len();
        Ok((run.log, count))
    }

    fn retry_run(&self, ctx: &RequestContext, task_id: Id, run_id: Id) -> StrandResult<Run> {
        self.find_run_by_id(ctx, task_id, run_id)
    }
}

impl TaskControlService for Live {
    fn finish_run(&self, _: &RequestContext, _: Id, run_id: Id) -> StrandResult<Run> {
        let mut run = self
            .runs
            .lock()
            .remove(&run_id)
            .ok_or_else(|| StrandError::not_found(Entity::Run, run_id))?;
        run.status = RunStatus::Success;
        run.finished_at = Some(run.scheduled_for + chrono::Duration::seconds(3));
        Ok(run)
    }
}

/// Archive that keeps points and returns them pivoted for the query's org
#[derive(Default)]
struct Archive {
    points: Mutex<Vec<(Id, Point)>>,
}

impl PointsWriter for Archive {
    fn write_points(&self, org_id: Id, _: Id, points: Vec<Point>) -> StrandResult<()> {
        self.points
            .lock()
            .extend(points.into_iter().map(|p| (org_id, p)));
        Ok(())
    }
}

impl QueryService for Archive {
    fn query(&self, _: &RequestContext, request: QueryRequest) -> StrandResult<Box<dyn ResultIterator>> {
        let records: Vec<Record> = self
            .points
            .lock()
            .iter()
            .filter(|(org, _)| *org == request.org_id)
            .map(|(_, p)| {
                let mut record: Record = p
                    .fields()
                    .iter()
                    .filter_map(|(k, v)| Some((k.clone(), Scalar::String(v.as_str()?.to_string()))))
                    .collect();
                record.insert("_time".to_string(), Scalar::Time(p.time()));
                record.insert("taskID".to_string(), Scalar::String(p.tags()["taskID"].clone()));
                record
            })
            .filter(|r| {
                let run_id = r["runID"].as_str().unwrap_or_default();
                request.query.contains(&format!("r[\"runID\"] == \"{}\"", run_id))
            })
            .collect();
        Ok(Box::new(Single(VecDeque::from([QueryResult {
            name: "_result".to_string(),
            records,
        }]))))
    }
}

struct Single(VecDeque<QueryResult>);

impl ResultIterator for Single {
    fn more(&mut self) -> bool {
        !self.0.is_empty()
    }

    fn next(&mut self) -> StrandResult<QueryResult> {
        self.0
            .pop_front()
            .ok_or_else(|| StrandError::query("no more results"))
    }

    fn release(&mut self) {
        self.0.clear();
    }
}

fn token_ctx() -> RequestContext {
    RequestContext::with_authorizer(Arc::new(Authorization {
        id: id(0x99),
        org_id: id(1),
        token: "t0k3n".to_string(),
    }))
}

// ============================================================================
// Startup migration
// ============================================================================

#[test]
fn test_startup_migration_runs_once() {
    let config = StrandConfig::from_toml("[migration]\ncheck_on_open = true\n").unwrap();
    let store = Arc::new(MemStore::new());
    strand::put_legacy_buckets(&store, &[legacy(2, "old-acme"), legacy(3, "older")]).unwrap();

    let first = migrate_on_open(&config.migration, Arc::clone(&store), orgs()).unwrap();
    assert_eq!(first, Some(MigrationOutcome::Converted(2)));
    let second = migrate_on_open(&config.migration, Arc::clone(&store), orgs()).unwrap();
    assert_eq!(second, Some(MigrationOutcome::AlreadyMigrated));

    let buckets = find_buckets(&store).unwrap();
    assert_eq!(buckets.len(), 2);
    assert!(buckets.iter().all(|b| b.org == "acme"));
}

#[test]
fn test_startup_migration_can_be_disabled() {
    let config = StrandConfig::from_toml("[migration]\ncheck_on_open = false\n").unwrap();
    let store = Arc::new(MemStore::new());
    strand::put_legacy_buckets(&store, &[legacy(2, "old-acme")]).unwrap();

    let outcome = migrate_on_open(&config.migration, Arc::clone(&store), orgs()).unwrap();
    assert_eq!(outcome, None);
    assert_eq!(store.stats().commits, 1);
}

// ============================================================================
// Run archive
// ============================================================================

#[test]
fn test_finished_run_round_trips_through_archive() {
    let config = StrandConfig::from_toml(
        "[archive]\nsystem_bucket_id = \"000000000000000a\"\non_write_failure = \"warn\"\n",
    )
    .unwrap();
    assert_eq!(config.archive.on_write_failure, ArchiveFailurePolicy::Warn);

    let live = Live::new();
    let archive = Arc::new(Archive::default());
    let scheduled = Utc.with_ymd_and_hms(2026, 6, 1, 9, 30, 0).unwrap();
    live.runs.lock().insert(
        id(0x21),
        Run {
            id: id(0x21),
            task_id: id(0x11),
            status: RunStatus::Started,
            scheduled_for: scheduled,
            started_at: Some(scheduled),
            finished_at: None,
            requested_at: None,
            log: vec![LogEntry {
                run_id: id(0x21),
                time: scheduled,
                message: "rolled up 42 series".to_string(),
            }],
        },
    );

    let tasks = AnalyticalStorage::new(
        live.clone(),
        live.clone(),
        archive.clone(),
        archive.clone(),
        config.archive,
    );
    let ctx = token_ctx();

    let finished = tasks.finish_run(&ctx, id(0x11), id(0x21)).unwrap();
    assert_eq!(archive.points.lock().len(), 1);

    let found = tasks.find_run_by_id(&ctx, id(0x11), id(0x21)).unwrap();
    assert_eq!(found, finished);

    let filter = LogFilter {
        task: id(0x11),
        run: Some(id(0x21)),
    };
    let (logs, count) = tasks.find_logs(&ctx, &filter).unwrap();
    assert_eq!(count, 1);
    assert_eq!(logs[0].message, "rolled up 42 series");
}
