use config::shared::SemaphoreConfig;
use sqlx::PgPool;

use crate::acquisition::semaphore_acquisition;
use crate::checker::check_lock;
use crate::error::LockResult;
use crate::policy::PollPolicy;
use crate::queue::semaphore_queue;
use crate::registry::{LockRegistry, LockTable, PgExecutor, SqlLockRegistry};
use crate::release::release_semaphore;
use crate::types::{CheckPath, RunId};

/// Registry and poll policy bundled for one caller.
///
/// Cloning is cheap when the registry is, so every task of a run can hold its own handle.
#[derive(Debug, Clone)]
pub struct RunSemaphore<R> {
    registry: R,
    policy: PollPolicy,
}

impl<R> RunSemaphore<R>
where
    R: LockRegistry,
{
    pub fn new(registry: R, policy: PollPolicy) -> Self {
        Self { registry, policy }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    pub async fn queue<S: AsRef<str>>(&self, run_id: RunId, paths: &[S]) -> LockResult<CheckPath> {
        semaphore_queue(&self.registry, run_id, paths).await
    }

    pub async fn check(&self, run_id: RunId, check_path: CheckPath) -> LockResult<CheckPath> {
        check_lock(&self.registry, run_id, check_path, &self.policy).await
    }

    pub async fn acquire<S: AsRef<str>>(
        &self,
        run_id: RunId,
        paths: &[S],
    ) -> LockResult<Vec<CheckPath>> {
        semaphore_acquisition(&self.registry, run_id, paths, &self.policy).await
    }

    pub async fn release(&self, run_id: RunId, check_path: &CheckPath) -> LockResult<()> {
        release_semaphore(&self.registry, run_id, check_path).await
    }
}

impl RunSemaphore<SqlLockRegistry<PgExecutor>> {
    /// Builds a semaphore over the Postgres registry table described by `config`.
    pub fn postgres(pool: PgPool, config: &SemaphoreConfig) -> LockResult<Self> {
        config.validate()?;

        let registry = SqlLockRegistry::new(PgExecutor::new(pool), LockTable::from_config(config));

        Ok(Self::new(registry, PollPolicy::from(&config.poll)))
    }
}
