//! Run archive bridge
//!
//! Finished task runs are copied from the live tier into the platform's
//! own time-series storage, and run/log history is read back by merging
//! the live tier with that archive:
//!
//! - [`schema`]: the `runs` measurement and run <-> point/record mapping
//! - [`plan`]: engine-agnostic archive query builder, rendered at the edge
//! - [`guard`]: releases query iterators on every exit path
//! - [`RunArchiver`]: writes one point per finished run
//! - [`RunHistoryReader`]: live-first reads with archive fallback
//! - [`AnalyticalStorage`]: both of the above behind the live task traits

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod archive;
pub mod bridge;
pub mod guard;
pub mod history;
pub mod plan;
pub mod schema;

pub use archive::RunArchiver;
pub use bridge::AnalyticalStorage;
pub use guard::ReleaseGuard;
pub use history::RunHistoryReader;
pub use plan::{ArchiveQuery, Predicate};
