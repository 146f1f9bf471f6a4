use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::bail;
use crate::error::{ErrorKind, LockResult};
use crate::policy::PollPolicy;
use crate::registry::LockRegistry;
use crate::types::{CheckPath, RunId};

/// Waits until no other run holds any path of `check_path`, then returns it unchanged.
///
/// Returns at once when nothing is held. Otherwise sleeps according to `policy` and
/// polls again, forever unless the policy sets a poll limit or a deadline, in which case
/// [`ErrorKind::LockPollExhausted`] is returned. Registry failures are returned as is and
/// never retried. The rows of `run_id` are never touched, even when giving up.
pub async fn check_lock<R>(
    registry: &R,
    run_id: RunId,
    check_path: CheckPath,
    policy: &PollPolicy,
) -> LockResult<CheckPath>
where
    R: LockRegistry,
{
    if check_path.is_empty() {
        debug!(%run_id, "no lock paths to check");
        return Ok(check_path);
    }

    let started = Instant::now();
    let mut delay = policy.interval;
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let held = registry.count_conflicting(run_id, &check_path).await?;

        debug!(%run_id, %check_path, held, attempt, "polled lock registry");

        if held == 0 {
            info!(%run_id, %check_path, attempt, "lock paths are free");
            return Ok(check_path);
        }

        if policy.max_attempts.is_some_and(|max| attempt >= max) {
            bail!(
                ErrorKind::LockPollExhausted,
                "Lock paths still held after the last allowed poll",
                format!(
                    "run {run_id} gave up on {check_path} after {attempt} polls, {held} rows held by other runs"
                )
            );
        }

        let mut wait = delay;
        if let Some(deadline) = policy.deadline {
            let elapsed = started.elapsed();
            if elapsed >= deadline {
                bail!(
                    ErrorKind::LockPollExhausted,
                    "Lock paths still held at the wait deadline",
                    format!(
                        "run {run_id} gave up on {check_path} after {elapsed:?}, {held} rows held by other runs"
                    )
                );
            }
            wait = wait.min(deadline - elapsed);
        }

        warn!(
            %run_id,
            %check_path,
            held,
            wait_ms = wait.as_millis() as u64,
            "lock paths are held by other runs, waiting"
        );

        sleep(wait).await;
        delay = policy.next_delay(delay);
    }
}
