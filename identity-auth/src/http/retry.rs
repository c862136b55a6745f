//! Retry policy for provider API calls.

use std::time::{Duration, SystemTime};

use reqwest_retry::{RetryDecision, RetryPolicy};

const FIRST_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// Doubling backoff that never schedules a retry past the caller's budget.
///
/// The budget is measured from the start of the original request, so a login
/// waits at most about `budget` in total however many retries are allowed.
#[derive(Debug, Clone, Copy)]
pub struct ProviderRetryPolicy {
    max_retries: u32,
    budget: Duration,
}

impl ProviderRetryPolicy {
    pub fn new(max_retries: u32, budget: Duration) -> Self {
        Self {
            max_retries,
            budget,
        }
    }

    fn backoff(n_past_retries: u32) -> Duration {
        FIRST_BACKOFF
            .checked_mul(1u32.checked_shl(n_past_retries).unwrap_or(u32::MAX))
            .map_or(MAX_BACKOFF, |delay| delay.min(MAX_BACKOFF))
    }
}

impl RetryPolicy for ProviderRetryPolicy {
    fn should_retry(&self, request_start_time: SystemTime, n_past_retries: u32) -> RetryDecision {
        if n_past_retries >= self.max_retries {
            return RetryDecision::DoNotRetry;
        }

        let execute_after = SystemTime::now() + Self::backoff(n_past_retries);
        match execute_after.duration_since(request_start_time) {
            Ok(elapsed) if elapsed >= self.budget => RetryDecision::DoNotRetry,
            _ => RetryDecision::Retry { execute_after },
        }
    }
}
