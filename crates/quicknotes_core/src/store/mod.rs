//! Async note store and live feed.
//!
//! # Responsibility
//! - Own the single SQLite connection behind a mutex.
//! - Run every storage call on a blocking worker, off the caller's thread.
//! - Publish a fresh ordered snapshot after each successful mutation.
//!
//! # Invariants
//! - Writes and their snapshot publication happen under the same lock, so
//!   observers see snapshots in write order.
//! - A write commits only together with a successful snapshot reload.
//! - Dropping a caller's future never aborts a write already handed to a
//!   worker.

use crate::repo::note_repo::{StoreError, StoreResult};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::sync::Arc;

pub mod feed;
pub mod note_store;
pub mod prefs_store;

/// Shared handle to the store's connection.
pub type DbHandle = Arc<Mutex<Connection>>;

/// Runs `job` on the blocking pool and waits for it.
///
/// The job keeps running if the returned future is dropped.
pub(crate) async fn run_blocking<T, F>(job: F) -> StoreResult<T>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|err| StoreError::Worker(err.to_string()))?
}
