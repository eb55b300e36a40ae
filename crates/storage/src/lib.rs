//! Storage layer for Strand
//!
//! This crate implements the transactional key-value contract from
//! `strand-core` in memory:
//! - MemStore: committed state behind `Arc` + `RwLock`, serialized writers
//! - Snapshot: immutable point-in-time view used by read transactions
//! - Write transactions buffer a write set and commit it atomically
//!
//! It backs tests and embedded use; a disk-backed engine can implement the
//! same `KvStore` trait without the layers above noticing.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod snapshot;
pub mod store;
mod txn;

pub use snapshot::Snapshot;
pub use store::{MemStore, StoreStats};
