// src/ingest/retry.rs
use std::future::Future;
use std::time::Duration;

use crate::ingest::types::FetchError;

/// Uniform attempt/backoff/timeout policy wrapped around every source fetch.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u8,
    pub base_backoff: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_backoff: Duration::from_millis(250),
            timeout: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_attempts(mut self, attempts: u8) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_backoff(mut self, base: Duration) -> Self {
        self.base_backoff = base;
        self
    }

    /// Backoff before attempt `attempt + 1` (1-based): base, 2×base, 4×base, ...
    pub fn backoff_for(&self, attempt: u8) -> Duration {
        let shift = u32::from(attempt.saturating_sub(1)).min(10);
        self.base_backoff.saturating_mul(1u32 << shift)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent. Each attempt is bounded by `timeout`.
    pub async fn run<T, F, Fut>(&self, source_name: &str, mut op: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let max = self.max_attempts.max(1);
        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = match tokio::time::timeout(self.timeout, op()).await {
                Ok(r) => r,
                Err(_) => Err(FetchError::timeout(source_name)),
            };
            match res {
                Ok(v) => return Ok(v),
                Err(e) if e.is_retryable() && attempt < max => {
                    tracing::debug!(
                        provider = source_name,
                        attempt,
                        error = %e,
                        "retrying source fetch"
                    );
                    tokio::time::sleep(self.backoff_for(attempt)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::FetchErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast() -> RetryPolicy {
        RetryPolicy::default()
            .with_attempts(3)
            .with_backoff(Duration::from_millis(1))
            .with_timeout(Duration::from_millis(200))
    }

    #[test]
    fn backoff_doubles() {
        let p = RetryPolicy::default().with_backoff(Duration::from_millis(100));
        assert_eq!(p.backoff_for(1), Duration::from_millis(100));
        assert_eq!(p.backoff_for(2), Duration::from_millis(200));
        assert_eq!(p.backoff_for(3), Duration::from_millis(400));
    }

    #[tokio::test]
    async fn retries_transient_then_succeeds() {
        let calls = AtomicUsize::new(0);
        let out = fast()
            .run("t", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(FetchError::status("t", 503))
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;
        assert_eq!(out.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let calls = AtomicUsize::new(0);
        let out: Result<(), _> = fast()
            .run("t", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(FetchError::status("t", 401)) }
            })
            .await;
        assert_eq!(out.unwrap_err().http_status, Some(401));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn slow_attempts_time_out() {
        let calls = AtomicUsize::new(0);
        let out: Result<(), _> = fast()
            .with_timeout(Duration::from_millis(20))
            .run("t", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(())
                }
            })
            .await;
        assert_eq!(out.unwrap_err().kind, FetchErrorKind::Timeout);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
