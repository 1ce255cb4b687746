// In crates/api-client/src/retry.rs

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Linear backoff: the wait after failed attempt `n` is `n * backoff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Runs `operation` until it succeeds or the attempts run out, returning the
/// last error. There is no wait after the final attempt.
pub async fn retry_with_linear_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts => {
                tracing::warn!(%label, attempt, error = %e, "Giving up after final attempt.");
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(%label, attempt, ?delay, error = %e, "Attempt failed, retrying.");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[test]
    fn delays_grow_linearly() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_secs(1));
        assert_eq!(policy.delay_after(2), Duration::from_secs(2));
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_the_third_attempt() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let started = Instant::now();

        let result: Result<&str, String> = retry_with_linear_backoff(&RetryPolicy::default(), "test", move || async move {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 { Err(format!("failure {n}")) } else { Ok("candles") }
        })
        .await;

        assert_eq!(result, Ok("candles"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn returns_the_last_error_without_a_trailing_wait() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let started = Instant::now();

        let result: Result<(), String> = retry_with_linear_backoff(&RetryPolicy::default(), "test", move || async move {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            Err(format!("failure {n}"))
        })
        .await;

        assert_eq!(result, Err("failure 3".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s after the first failure, 2s after the second, nothing after the third.
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }
}
