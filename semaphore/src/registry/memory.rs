use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::LockResult;
use crate::registry::LockRegistry;
use crate::types::{CheckPath, LockRecord, RunId};

#[derive(Debug, Default)]
struct Inner {
    /// Rows in insertion order.
    records: Vec<LockRecord>,
    /// Size of every bulk insert received, empty ones included.
    insert_batches: Vec<usize>,
}

/// In-memory lock registry shared by clones.
///
/// Clones see the same rows, so tasks standing in for separate runs can coordinate
/// through it the way processes coordinate through the registry table.
#[derive(Debug, Clone, Default)]
pub struct MemoryLockRegistry {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every row currently registered.
    pub async fn records(&self) -> Vec<LockRecord> {
        self.inner.lock().await.records.clone()
    }

    /// Returns the rows registered by `run_id`.
    pub async fn records_of(&self, run_id: RunId) -> Vec<LockRecord> {
        let inner = self.inner.lock().await;

        inner
            .records
            .iter()
            .filter(|record| record.run_id == run_id)
            .cloned()
            .collect()
    }

    /// Returns the size of every bulk insert received so far.
    pub async fn insert_batches(&self) -> Vec<usize> {
        self.inner.lock().await.insert_batches.clone()
    }
}

impl LockRegistry for MemoryLockRegistry {
    async fn insert_locks(&self, records: Vec<LockRecord>) -> LockResult<()> {
        let mut inner = self.inner.lock().await;

        inner.insert_batches.push(records.len());
        inner.records.extend(records);

        Ok(())
    }

    async fn count_conflicting(&self, run_id: RunId, check_path: &CheckPath) -> LockResult<u64> {
        let inner = self.inner.lock().await;

        let count = inner
            .records
            .iter()
            .filter(|record| record.run_id != run_id && check_path.contains(&record.lock_path))
            .count();

        Ok(count as u64)
    }

    async fn delete_locks(&self, run_id: RunId, check_path: &CheckPath) -> LockResult<u64> {
        let mut inner = self.inner.lock().await;

        let before = inner.records.len();
        inner
            .records
            .retain(|record| record.run_id != run_id || !check_path.contains(&record.lock_path));

        Ok((before - inner.records.len()) as u64)
    }
}
