use tracing::info;

use crate::checker::check_lock;
use crate::error::LockResult;
use crate::policy::PollPolicy;
use crate::queue::semaphore_queue;
use crate::registry::LockRegistry;
use crate::types::{CheckPath, RunId};

/// Queues and confirms each of `paths` in order, one path at a time.
///
/// Returns one confirmed single-path check path per input path. The first failure is
/// returned immediately and rows queued earlier in the same call stay in the registry;
/// callers that give up must release them.
pub async fn semaphore_acquisition<R, S>(
    registry: &R,
    run_id: RunId,
    paths: &[S],
    policy: &PollPolicy,
) -> LockResult<Vec<CheckPath>>
where
    R: LockRegistry,
    S: AsRef<str>,
{
    let mut acquired = Vec::with_capacity(paths.len());

    for path in paths {
        let queued = semaphore_queue(registry, run_id, std::slice::from_ref(path)).await?;
        let confirmed = check_lock(registry, run_id, queued, policy).await?;
        acquired.push(confirmed);
    }

    info!(%run_id, paths = acquired.len(), "acquired lock paths");

    Ok(acquired)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::ErrorKind;
    use crate::registry::MemoryLockRegistry;
    use crate::test_utils::{FaultyRegistry, RegistryMethod};

    #[tokio::test]
    async fn returns_one_confirmed_check_path_per_path() {
        let registry = MemoryLockRegistry::new();

        let acquired = semaphore_acquisition(
            &registry,
            RunId::new(101),
            &["/tmp/lock1", "/tmp/lock2"],
            &PollPolicy::default(),
        )
        .await
        .unwrap();

        let literals: Vec<_> = acquired.iter().map(ToString::to_string).collect();
        assert_eq!(literals, vec!["'/tmp/lock1'", "'/tmp/lock2'"]);
        assert_eq!(registry.insert_batches().await, vec![1, 1]);
    }

    #[tokio::test]
    async fn no_paths_means_no_registry_interaction() {
        let registry = FaultyRegistry::default();

        let acquired = semaphore_acquisition::<_, String>(
            &registry,
            RunId::new(101),
            &[],
            &PollPolicy::default(),
        )
        .await
        .unwrap();

        assert!(acquired.is_empty());
        assert_eq!(registry.calls(RegistryMethod::Insert), 0);
        assert_eq!(registry.calls(RegistryMethod::Count), 0);
    }

    #[tokio::test]
    async fn failing_queue_keeps_earlier_rows() {
        let registry =
            FaultyRegistry::new(MemoryLockRegistry::new()).fail_on(RegistryMethod::Insert, 2);

        let err = semaphore_acquisition(
            &registry,
            RunId::new(101),
            &["/a", "/b", "/c"],
            &PollPolicy::default(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::RegistryQueryFailed);
        let leaked: Vec<_> = registry
            .inner()
            .records()
            .await
            .into_iter()
            .map(|record| record.lock_path)
            .collect();
        assert_eq!(leaked, vec!["/a".to_string()]);
    }

    #[tokio::test]
    async fn failing_check_stops_acquisition() {
        let registry =
            FaultyRegistry::new(MemoryLockRegistry::new()).fail_on(RegistryMethod::Count, 1);

        let err = semaphore_acquisition(
            &registry,
            RunId::new(101),
            &["/a", "/b"],
            &PollPolicy::default(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::RegistryQueryFailed);
        assert_eq!(registry.calls(RegistryMethod::Insert), 1);
        assert_eq!(registry.inner().records().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_check_stops_acquisition() {
        let registry = MemoryLockRegistry::new();
        semaphore_queue(&registry, RunId::new(1), &["/b"]).await.unwrap();

        let policy = PollPolicy::unbounded(Duration::from_secs(1)).with_max_attempts(2);
        let err = semaphore_acquisition(&registry, RunId::new(2), &["/a", "/b"], &policy)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::LockPollExhausted);
        assert_eq!(registry.records_of(RunId::new(2)).await.len(), 2);
    }
}
