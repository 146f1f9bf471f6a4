use chrono::Utc;
use tracing::info;

use crate::error::LockResult;
use crate::registry::LockRegistry;
use crate::types::{CheckPath, LockRecord, RunId};

/// Registers the intent of `run_id` to use `paths` and returns their check path.
///
/// All rows go to the registry in a single bulk insert, one per path, even when the run
/// already registered the same path. An empty `paths` still performs the (empty) insert
/// and returns the empty check path.
pub async fn semaphore_queue<R, S>(registry: &R, run_id: RunId, paths: &[S]) -> LockResult<CheckPath>
where
    R: LockRegistry,
    S: AsRef<str>,
{
    let paths: Vec<&str> = paths.iter().map(<S as AsRef<str>>::as_ref).collect();

    let created_at = Utc::now();
    let records: Vec<LockRecord> = paths
        .iter()
        .map(|path| LockRecord::queued(run_id, *path, created_at))
        .collect();

    registry.insert_locks(records).await?;

    let check_path = CheckPath::from_paths(paths.iter().copied());

    info!(%run_id, %check_path, paths = paths.len(), "queued run for lock paths");

    Ok(check_path)
}
