//! Retry loop around a single task attempt

use tracing::info;

use super::config::CancelFlag;
use super::process::{ProcessError, ProcessOutcome};
use crate::plan::schema::RetryPolicy;

/// Final attempt of a retried run
pub(crate) struct RetryOutcome {
    pub result: Result<ProcessOutcome, ProcessError>,
    pub attempts: u32,
}

/// Run `attempt` until it succeeds or the policy is exhausted.
///
/// Only non-zero exits and timeouts are retried. Spawn failures and
/// cancellation end the loop at once, as does a cancelled retry delay.
pub(crate) fn run_with_retry<F>(
    task_id: &str,
    policy: Option<&RetryPolicy>,
    cancel: &CancelFlag,
    mut attempt: F,
) -> RetryOutcome
where
    F: FnMut(u32) -> Result<ProcessOutcome, ProcessError>,
{
    let max_attempts = policy.map_or(1, |p| p.max_attempts.max(1));
    let mut attempts = 0;

    loop {
        attempts += 1;
        let result = attempt(attempts);

        let retryable =
            matches!(&result, Ok(outcome) if !outcome.succeeded() && !outcome.cancelled);
        if !retryable || attempts >= max_attempts {
            return RetryOutcome { result, attempts };
        }

        let delay = policy
            .map(|p| p.delay_before_retry(attempts))
            .unwrap_or_default();
        info!(
            task = task_id,
            attempt = attempts,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            "task attempt failed, retrying"
        );
        if !cancel.sleep(delay) {
            return RetryOutcome { result, attempts };
        }
    }
}
