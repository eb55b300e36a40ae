//! Archiving of finished runs

use std::sync::Arc;

use strand_core::{Id, PointsWriter, Run, StrandResult};
use tracing::debug;

use crate::schema::run_to_point;

/// Writes one `runs` point per finished run into the system bucket
#[derive(Clone)]
pub struct RunArchiver {
    writer: Arc<dyn PointsWriter>,
    bucket_id: Id,
}

impl RunArchiver {
    /// Archiver writing through `writer` into `bucket_id`
    pub fn new(writer: Arc<dyn PointsWriter>, bucket_id: Id) -> Self {
        RunArchiver { writer, bucket_id }
    }

    /// Bucket that receives archived runs
    pub fn bucket_id(&self) -> Id {
        self.bucket_id
    }

    /// Write `run` into the archive of `org_id`
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the run cannot be shaped into a point, or whatever
    /// the points writer returns.
    pub fn archive(&self, org_id: Id, run: &Run) -> StrandResult<()> {
        let point = run_to_point(run)?;
        self.writer.write_points(org_id, self.bucket_id, vec![point])?;
        debug!(
            target: "strand::archive",
            org = %org_id,
            task = %run.task_id,
            run = %run.id,
            status = %run.status,
            "Run archived"
        );
        Ok(())
    }
}
