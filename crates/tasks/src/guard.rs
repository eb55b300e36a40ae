//! Release of query iterators on every exit path

use strand_core::{Record, ResultIterator, StrandResult};

/// Owns a result iterator and releases it when dropped
///
/// Dropping covers the success path, an early `?` return and unwinding.
pub struct ReleaseGuard {
    iter: Box<dyn ResultIterator>,
}

impl ReleaseGuard {
    /// Take ownership of `iter`
    pub fn new(iter: Box<dyn ResultIterator>) -> Self {
        ReleaseGuard { iter }
    }

    /// Drain every result and flatten their records in engine order
    pub fn records(mut self) -> StrandResult<Vec<Record>> {
        let mut records = Vec::new();
        while self.iter.more() {
            records.extend(self.iter.next()?.records);
        }
        Ok(records)
    }
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.iter.release();
    }
}
