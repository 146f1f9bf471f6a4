use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{ErrorKind, LockResult};
use crate::lock_error;
use crate::registry::{LockRegistry, MemoryLockRegistry};
use crate::types::{CheckPath, LockRecord, RunId};

/// Operation of a [`LockRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryMethod {
    Insert,
    Count,
    Delete,
}

#[derive(Debug, Default)]
struct Faults {
    calls: HashMap<RegistryMethod, usize>,
    /// Method and 1-based call number to fail.
    fail_on: Option<(RegistryMethod, usize)>,
}

/// [`MemoryLockRegistry`] wrapper failing one chosen call.
///
/// A failed call does not reach the wrapped registry.
#[derive(Debug, Clone, Default)]
pub struct FaultyRegistry {
    registry: MemoryLockRegistry,
    faults: Arc<Mutex<Faults>>,
}

impl FaultyRegistry {
    pub fn new(registry: MemoryLockRegistry) -> Self {
        Self {
            registry,
            faults: Arc::default(),
        }
    }

    /// Fails the `call`-th invocation (1-based) of `method`.
    pub fn fail_on(self, method: RegistryMethod, call: usize) -> Self {
        self.lock().fail_on = Some((method, call));
        self
    }

    /// Returns how many times `method` was invoked, failed call included.
    pub fn calls(&self, method: RegistryMethod) -> usize {
        self.lock().calls.get(&method).copied().unwrap_or(0)
    }

    pub fn inner(&self) -> &MemoryLockRegistry {
        &self.registry
    }

    fn lock(&self) -> MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register_call(&self, method: RegistryMethod) -> LockResult<()> {
        let mut faults = self.lock();

        let calls = faults.calls.entry(method).or_default();
        *calls += 1;
        let call = *calls;

        if faults.fail_on == Some((method, call)) {
            return Err(lock_error!(
                ErrorKind::RegistryQueryFailed,
                "Injected registry failure",
                format!("{method:?} call {call}")
            ));
        }

        Ok(())
    }
}

impl LockRegistry for FaultyRegistry {
    async fn insert_locks(&self, records: Vec<LockRecord>) -> LockResult<()> {
        self.register_call(RegistryMethod::Insert)?;
        self.registry.insert_locks(records).await
    }

    async fn count_conflicting(&self, run_id: RunId, check_path: &CheckPath) -> LockResult<u64> {
        self.register_call(RegistryMethod::Count)?;
        self.registry.count_conflicting(run_id, check_path).await
    }

    async fn delete_locks(&self, run_id: RunId, check_path: &CheckPath) -> LockResult<u64> {
        self.register_call(RegistryMethod::Delete)?;
        self.registry.delete_locks(run_id, check_path).await
    }
}
