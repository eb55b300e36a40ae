//! The archived-run schema
//!
//! | Part | Name |
//! |------|------|
//! | measurement | `runs` |
//! | tags | `taskID`, `status` |
//! | fields | `status`, `runID`, `startedAt`, `finishedAt`, `requestedAt` (optional), `log` |
//! | timestamp | the run's scheduled-for time |
//!
//! Timestamps in fields are RFC 3339 strings; an absent start or finish
//! time is an empty string. The log is the JSON array of entries.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use strand_core::{
    FieldValue, Id, LogEntry, Point, Record, Run, RunStatus, Scalar, StrandError, StrandResult,
};

/// Measurement holding archived runs
pub const RUNS_MEASUREMENT: &str = "runs";
/// Tag: owning task
pub const TASK_ID_TAG: &str = "taskID";
/// Tag and field: run status
pub const STATUS: &str = "status";
/// Field: run id
pub const RUN_ID_FIELD: &str = "runID";
/// Field: start time
pub const STARTED_AT_FIELD: &str = "startedAt";
/// Field: finish time
pub const FINISHED_AT_FIELD: &str = "finishedAt";
/// Field: manual request time
pub const REQUESTED_AT_FIELD: &str = "requestedAt";
/// Field: serialized log
pub const LOG_FIELD: &str = "log";
/// Column carrying the point timestamp in query results
pub const TIME_COLUMN: &str = "_time";

fn format_time(t: Option<DateTime<Utc>>) -> String {
    t.map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        .unwrap_or_default()
}

/// Build the archive point for a finished run
pub fn run_to_point(run: &Run) -> StrandResult<Point> {
    let tags = BTreeMap::from([
        (TASK_ID_TAG.to_string(), run.task_id.to_string()),
        (STATUS.to_string(), run.status.to_string()),
    ]);

    let mut fields = BTreeMap::from([
        (STATUS.to_string(), FieldValue::from(run.status.as_str())),
        (RUN_ID_FIELD.to_string(), FieldValue::from(run.id.to_string())),
        (STARTED_AT_FIELD.to_string(), FieldValue::from(format_time(run.started_at))),
        (FINISHED_AT_FIELD.to_string(), FieldValue::from(format_time(run.finished_at))),
        (LOG_FIELD.to_string(), FieldValue::from(serde_json::to_string(&run.log)?)),
    ]);
    if run.requested_at.is_some() {
        fields.insert(
            REQUESTED_AT_FIELD.to_string(),
            FieldValue::from(format_time(run.requested_at)),
        );
    }

    Point::new(RUNS_MEASUREMENT, tags, fields, run.scheduled_for)
}

fn record_error(message: String, record: &Record) -> StrandError {
    StrandError::decode(message, format!("{:?}", record).as_bytes())
}

fn string_column<'a>(record: &'a Record, column: &str) -> Option<&'a str> {
    record.get(column).and_then(Scalar::as_str)
}

fn required<'a>(record: &'a Record, column: &str) -> StrandResult<&'a str> {
    string_column(record, column).ok_or_else(|| {
        record_error(format!("archived run is missing column '{}'", column), record)
    })
}

fn optional_time(record: &Record, column: &str) -> StrandResult<Option<DateTime<Utc>>> {
    match string_column(record, column) {
        None | Some("") => Ok(None),
        Some(text) => DateTime::parse_from_rfc3339(text)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|e| record_error(format!("archived run has a bad '{}' ({})", column, e), record)),
    }
}

/// Rebuild a run from one pivoted archive record
///
/// # Errors
///
/// `Decode` if a required column is missing or any value is malformed.
pub fn run_from_record(record: &Record) -> StrandResult<Run> {
    let scheduled_for = match record.get(TIME_COLUMN) {
        Some(Scalar::Time(t)) => *t,
        _ => {
            return Err(record_error(
                format!("archived run is missing column '{}'", TIME_COLUMN),
                record,
            ))
        }
    };
    let log: Vec<LogEntry> = match string_column(record, LOG_FIELD) {
        None | Some("") => Vec::new(),
        Some(blob) => serde_json::from_str(blob)
            .map_err(|e| record_error(format!("archived run has a bad log ({})", e), record))?,
    };

    Ok(Run {
        id: Id::from_hex(required(record, RUN_ID_FIELD)?)?,
        task_id: Id::from_hex(required(record, TASK_ID_TAG)?)?,
        status: required(record, STATUS)?.parse::<RunStatus>()?,
        scheduled_for,
        started_at: optional_time(record, STARTED_AT_FIELD)?,
        finished_at: optional_time(record, FINISHED_AT_FIELD)?,
        requested_at: optional_time(record, REQUESTED_AT_FIELD)?,
        log,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn id(raw: u64) -> Id {
        Id::new(raw).unwrap()
    }

    fn finished_run() -> Run {
        let at = |s| Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, s).unwrap();
        Run {
            id: id(0x21),
            task_id: id(0x11),
            status: RunStatus::Failed,
            scheduled_for: at(0),
            started_at: Some(at(1)),
            finished_at: Some(at(5)),
            requested_at: None,
            log: vec![LogEntry {
                run_id: id(0x21),
                time: at(2),
                message: "query failed: \"bucket\" not found".to_string(),
            }],
        }
    }

    /// The record the engine hands back after pivoting the point's fields
    fn as_record(point: &Point) -> Record {
        let mut record: Record = point
            .fields()
            .iter()
            .map(|(k, v)| (k.clone(), Scalar::String(v.as_str().unwrap().to_string())))
            .collect();
        for (k, v) in point.tags() {
            record.insert(k.clone(), Scalar::String(v.clone()));
        }
        record.insert(TIME_COLUMN.to_string(), Scalar::Time(point.time()));
        record
    }

    #[test]
    fn test_point_shape() {
        let run = finished_run();
        let point = run_to_point(&run).unwrap();

        assert_eq!(point.measurement(), "runs");
        assert_eq!(point.time(), run.scheduled_for);
        assert_eq!(point.tags()[TASK_ID_TAG], "0000000000000011");
        assert_eq!(point.tags()[STATUS], "failed");
        assert_eq!(point.fields()[RUN_ID_FIELD].as_str(), Some("0000000000000021"));
        assert!(!point.fields().contains_key(REQUESTED_AT_FIELD));
    }

    #[test]
    fn test_requested_at_written_when_present() {
        let mut run = finished_run();
        run.requested_at = Some(run.scheduled_for);
        let point = run_to_point(&run).unwrap();
        assert_eq!(
            point.fields()[REQUESTED_AT_FIELD].as_str(),
            Some("2026-03-01T12:00:00Z")
        );
    }

    #[test]
    fn test_record_rebuilds_run() {
        let run = finished_run();
        let rebuilt = run_from_record(&as_record(&run_to_point(&run).unwrap())).unwrap();
        assert_eq!(rebuilt, run);
    }

    #[test]
    fn test_missing_start_is_empty_string() {
        let mut run = finished_run();
        run.started_at = None;
        let point = run_to_point(&run).unwrap();
        assert_eq!(point.fields()[STARTED_AT_FIELD].as_str(), Some(""));
        assert_eq!(run_from_record(&as_record(&point)).unwrap().started_at, None);
    }

    #[test]
    fn test_record_without_run_id_is_decode_error() {
        let mut record = as_record(&run_to_point(&finished_run()).unwrap());
        record.remove(RUN_ID_FIELD);
        let err = run_from_record(&record).unwrap_err();
        assert_eq!(err.kind(), strand_core::ErrorKind::Decode);
        assert!(err.to_string().contains("runID"));
    }

    #[test]
    fn test_record_with_bad_log_is_decode_error() {
        let mut record = as_record(&run_to_point(&finished_run()).unwrap());
        record.insert(LOG_FIELD.to_string(), Scalar::String("[{".to_string()));
        assert!(run_from_record(&record).is_err());
    }
}
