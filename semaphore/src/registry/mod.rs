//! Storage seam of the semaphore.
//!
//! The protocol only ever appends lock rows, counts rows held by other runs and deletes its
//! own rows. [`LockRegistry`] captures exactly those three operations so the protocol runs
//! unchanged against the in-memory registry and the SQL-backed one.

mod memory;
mod pg;
mod sql;

use std::future::Future;

use crate::error::LockResult;
use crate::types::{CheckPath, LockRecord, RunId};

pub use memory::MemoryLockRegistry;
pub use pg::PgExecutor;
pub use sql::{LockTable, SqlExecutor, SqlLockRegistry};

/// Shared registry of lock rows.
///
/// Implementations must be safe to use from concurrently running tasks and must not
/// deduplicate rows: every inserted record is kept until deleted.
pub trait LockRegistry {
    /// Appends `records` in one bulk operation. An empty batch is valid.
    fn insert_locks(&self, records: Vec<LockRecord>) -> impl Future<Output = LockResult<()>> + Send;

    /// Counts the rows whose run differs from `run_id` and whose path is in `check_path`,
    /// whatever their `lock_status`.
    fn count_conflicting(
        &self,
        run_id: RunId,
        check_path: &CheckPath,
    ) -> impl Future<Output = LockResult<u64>> + Send;

    /// Deletes the rows owned by `run_id` whose path is in `check_path` and returns how many
    /// were removed.
    fn delete_locks(
        &self,
        run_id: RunId,
        check_path: &CheckPath,
    ) -> impl Future<Output = LockResult<u64>> + Send;
}
