//! Retry decorator with exponential backoff.
//!
//! The rendering backend wraps its single-attempt render in [`Retry`] so the
//! retry policy can be tested without a browser.
//!
//! # Architecture
//!
//! - [`AttemptAsync`]: One fallible async operation keyed by URL
//! - [`RetryPolicy`]: Attempt cap and backoff schedule
//! - [`Retry`]: Decorator that re-runs any `AttemptAsync` on retryable errors
//!
//! # Backoff Strategy
//!
//! The delay after failed attempt `n` is:
//! ```text
//! delay = min(base_delay * 2^(n-1), max_delay) + random_jitter(0..=jitter)
//! ```

use rand::{Rng, rng};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, instrument, warn};

/// One fallible asynchronous operation on a URL.
pub trait AttemptAsync {
    /// Value produced by a successful attempt.
    type Output;
    /// Error produced by a failed attempt.
    type Error: fmt::Display;

    /// Run the operation once.
    async fn attempt(&self, url: &str) -> Result<Self::Output, Self::Error>;
}

/// Attempt cap and backoff schedule for [`Retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: usize,
    /// Delay after the first failure; doubles for each further failure.
    pub base_delay: Duration,
    /// Upper bound for the exponential part of the delay.
    pub max_delay: Duration,
    /// Upper bound of the random jitter added to every delay.
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(10),
            jitter: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay (without jitter) after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: usize) -> Duration {
        let exp = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        let factor = 2u32.saturating_pow(exp);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    fn jittered(&self, attempt: usize) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        let extra = if jitter_ms == 0 {
            0
        } else {
            rng().random_range(0..=jitter_ms)
        };
        self.backoff(attempt) + Duration::from_millis(extra)
    }
}

/// Decorator that re-runs an [`AttemptAsync`] while its errors are retryable.
///
/// Errors rejected by the predicate are returned immediately. When the attempt
/// cap is reached the last error is returned.
pub struct Retry<T: AttemptAsync> {
    inner: T,
    policy: RetryPolicy,
    retryable: fn(&T::Error) -> bool,
}

impl<T> Retry<T>
where
    T: AttemptAsync,
{
    /// Wrap `inner`, retrying every error accepted by `retryable`.
    pub fn new(inner: T, policy: RetryPolicy, retryable: fn(&T::Error) -> bool) -> Self {
        Self {
            inner,
            policy,
            retryable,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    #[cfg(test)]
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: AttemptAsync> fmt::Debug for Retry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retry").field("policy", &self.policy).finish()
    }
}

impl<T> AttemptAsync for Retry<T>
where
    T: AttemptAsync,
{
    type Output = T::Output;
    type Error = T::Error;

    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn attempt(&self, url: &str) -> Result<Self::Output, Self::Error> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.attempt(url).await {
                Ok(out) => return Ok(out),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if !(self.retryable)(&e) {
                        warn!(
                            attempt,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                            error = %e,
                            "attempt failed with non-retryable error"
                        );
                        return Err(e);
                    }

                    if attempt >= self.policy.max_attempts {
                        error!(
                            attempt,
                            max = self.policy.max_attempts,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "attempts exhausted"
                        );
                        return Err(e);
                    }

                    let delay = self.policy.jittered(attempt);
                    warn!(
                        attempt,
                        max = self.policy.max_attempts,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    enum FlakyError {
        Transient,
        Fatal,
    }

    impl fmt::Display for FlakyError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                FlakyError::Transient => f.write_str("transient"),
                FlakyError::Fatal => f.write_str("fatal"),
            }
        }
    }

    /// Fails with `error` for the first `failures` calls, then succeeds.
    struct Flaky {
        failures: usize,
        fatal: bool,
        calls: AtomicUsize,
    }

    impl Flaky {
        fn new(failures: usize) -> Self {
            Self {
                failures,
                fatal: false,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl AttemptAsync for Flaky {
        type Output = usize;
        type Error = FlakyError;

        async fn attempt(&self, _url: &str) -> Result<usize, FlakyError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= self.failures {
                if self.fatal {
                    Err(FlakyError::Fatal)
                } else {
                    Err(FlakyError::Transient)
                }
            } else {
                Ok(n)
            }
        }
    }

    fn is_transient(e: &FlakyError) -> bool {
        matches!(e, FlakyError::Transient)
    }

    #[test]
    fn test_backoff_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
        assert_eq!(policy.backoff(3), Duration::from_secs(8));
        assert_eq!(policy.backoff(4), Duration::from_secs(10));
        assert_eq!(policy.backoff(40), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_third_attempt_after_backoff() {
        let retry = Retry::new(Flaky::new(2), RetryPolicy::default(), is_transient);
        let t0 = tokio::time::Instant::now();

        let out = retry.attempt("https://example.com").await.unwrap();

        assert_eq!(out, 3);
        assert!(t0.elapsed() >= Duration::from_secs(6));
        assert_eq!(retry.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let retry = Retry::new(Flaky::new(10), RetryPolicy::default(), is_transient);

        let out = retry.attempt("https://example.com").await;

        assert!(matches!(out, Err(FlakyError::Transient)));
        assert_eq!(retry.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_returns_immediately() {
        let mut flaky = Flaky::new(1);
        flaky.fatal = true;
        let retry = Retry::new(flaky, RetryPolicy::default(), is_transient);
        let t0 = tokio::time::Instant::now();

        let out = retry.attempt("https://example.com").await;

        assert!(matches!(out, Err(FlakyError::Fatal)));
        assert_eq!(retry.inner().calls.load(Ordering::SeqCst), 1);
        assert!(t0.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_zero_jitter_policy() {
        let policy = RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
            jitter: Duration::ZERO,
        };
        let retry = Retry::new(Flaky::new(1), policy, is_transient);
        assert_eq!(retry.attempt("u").await.unwrap(), 2);
    }
}
