use std::time::Duration;

use futures::future::join_all;
use semaphore::error::{ErrorKind, LockError};
use semaphore::policy::PollPolicy;
use semaphore::registry::MemoryLockRegistry;
use semaphore::semaphore::RunSemaphore;
use semaphore::types::{CheckPath, RunId};
use telemetry::tracing::init_test_tracing;
use tokio::time::{Instant, sleep};

fn fast_policy() -> PollPolicy {
    PollPolicy::unbounded(Duration::from_secs(1))
}

#[tokio::test(start_paused = true)]
async fn second_run_waits_until_first_run_releases() {
    init_test_tracing();

    let registry = MemoryLockRegistry::new();
    let first = RunSemaphore::new(registry.clone(), fast_policy());
    let second = RunSemaphore::new(registry.clone(), fast_policy());

    let held = first.acquire(RunId::new(1), &["/shared"]).await.unwrap();

    let started = Instant::now();
    let waiter = tokio::spawn(async move { second.acquire(RunId::new(2), &["/shared"]).await });

    sleep(Duration::from_millis(5_500)).await;
    assert!(!waiter.is_finished());

    first.release(RunId::new(1), &held[0]).await.unwrap();

    let acquired = waiter.await.unwrap().unwrap();
    assert_eq!(acquired, vec![CheckPath::from_paths(["/shared"])]);
    assert_eq!(started.elapsed(), Duration::from_secs(6));

    let remaining = registry.records().await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].run_id, RunId::new(2));
}

#[tokio::test(start_paused = true)]
async fn runs_queued_on_the_same_path_wait_for_each_other() {
    init_test_tracing();

    let registry = MemoryLockRegistry::new();
    let policy = fast_policy().with_max_attempts(3);
    let first = RunSemaphore::new(registry.clone(), policy.clone());
    let second = RunSemaphore::new(registry.clone(), policy);

    let first_queued = first.queue(RunId::new(1), &["/shared"]).await.unwrap();
    let second_queued = second.queue(RunId::new(2), &["/shared"]).await.unwrap();

    let (first_result, second_result) = tokio::join!(
        first.check(RunId::new(1), first_queued),
        second.check(RunId::new(2), second_queued)
    );

    assert_eq!(first_result.unwrap_err().kind(), ErrorKind::LockPollExhausted);
    assert_eq!(second_result.unwrap_err().kind(), ErrorKind::LockPollExhausted);
    assert_eq!(registry.records().await.len(), 2);
}

#[tokio::test]
async fn runs_on_disjoint_paths_do_not_block_each_other() {
    init_test_tracing();

    let registry = MemoryLockRegistry::new();

    let runs = (1..=8).map(|id| {
        let run = RunSemaphore::new(registry.clone(), fast_policy());
        tokio::spawn(async move {
            let run_id = RunId::new(id);
            let path = format!("/data/run_{id}");
            let acquired = run.acquire(run_id, &[path]).await?;
            for check_path in &acquired {
                run.release(run_id, check_path).await?;
            }
            Ok::<_, LockError>(acquired)
        })
    });

    for result in join_all(runs).await {
        let acquired = result.unwrap().unwrap();
        assert_eq!(acquired.len(), 1);
    }

    assert!(registry.records().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn release_only_removes_the_callers_rows() {
    init_test_tracing();

    let registry = MemoryLockRegistry::new();
    let first = RunSemaphore::new(registry.clone(), fast_policy());
    let second = RunSemaphore::new(registry.clone(), fast_policy());

    let queued = first.queue(RunId::new(1), &["/a", "/b"]).await.unwrap();
    second.queue(RunId::new(2), &["/a"]).await.unwrap();

    second.release(RunId::new(2), &queued).await.unwrap();

    assert_eq!(registry.records_of(RunId::new(1)).await.len(), 2);
    assert!(registry.records_of(RunId::new(2)).await.is_empty());
}
