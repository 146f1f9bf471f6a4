use tracing::{debug, info};

use crate::error::LockResult;
use crate::registry::LockRegistry;
use crate::types::{CheckPath, RunId};

/// Deletes every row of `run_id` whose path is in `check_path`, whatever its status.
///
/// Only the run's own rows are removed. Releasing the empty check path is a no-op.
pub async fn release_semaphore<R>(registry: &R, run_id: RunId, check_path: &CheckPath) -> LockResult<()>
where
    R: LockRegistry,
{
    if check_path.is_empty() {
        debug!(%run_id, "no lock paths to release");
        return Ok(());
    }

    let released = registry.delete_locks(run_id, check_path).await?;

    info!(%run_id, %check_path, released, "released lock paths");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::registry::{LockTable, SqlLockRegistry};
    use crate::test_utils::ScriptedExecutor;

    fn registry() -> SqlLockRegistry<ScriptedExecutor> {
        SqlLockRegistry::new(ScriptedExecutor::new(), LockTable::new("test_catalog"))
    }

    #[tokio::test]
    async fn issues_delete_scoped_to_the_run() {
        let registry = registry();
        let check_path = CheckPath::parse("'/tmp/lock1'").unwrap();

        release_semaphore(&registry, RunId::new(101), &check_path)
            .await
            .unwrap();

        assert_eq!(
            registry.executor().statements(),
            vec![
                "DELETE FROM test_catalog.internal_tp.tp_run_lock_plc WHERE run_id = 101 AND lock_path IN ('/tmp/lock1')"
                    .to_string()
            ]
        );
    }

    #[tokio::test]
    async fn keeps_multi_path_literal_verbatim() {
        let registry = registry();
        let check_path = CheckPath::parse("'/tmp/lock1','/tmp/lock2'").unwrap();

        release_semaphore(&registry, RunId::new(101), &check_path)
            .await
            .unwrap();

        assert_eq!(
            registry.executor().statements(),
            vec![
                "DELETE FROM test_catalog.internal_tp.tp_run_lock_plc WHERE run_id = 101 AND lock_path IN ('/tmp/lock1','/tmp/lock2')"
                    .to_string()
            ]
        );
    }

    #[tokio::test]
    async fn empty_release_issues_nothing() {
        let registry = registry();

        release_semaphore(&registry, RunId::new(101), &CheckPath::empty())
            .await
            .unwrap();

        assert!(registry.executor().statements().is_empty());
    }

    #[tokio::test]
    async fn registry_errors_propagate() {
        let registry = registry();
        registry.executor().fail_next(ErrorKind::RegistryIoError);

        let err = release_semaphore(&registry, RunId::new(101), &CheckPath::from_paths(["/a"]))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::RegistryIoError);
        assert_eq!(registry.executor().statements().len(), 1);
    }
}
