//! Retry with exponential backoff for model gateway calls.
//!
//! Transient failures (transport errors, timeouts, 429 and 5xx) are retried up
//! to `max_attempts` times. A `Retry-After` hint from the server replaces the
//! computed delay, still capped at `max_delay`.

use std::future::Future;
use std::time::Duration;

use toolrelay_application::GatewayError;
use tracing::warn;

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first
    pub max_attempts: usize,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    /// Add up to 25% jitter on top of the computed delay
    pub add_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            add_jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_jitter(mut self, add_jitter: bool) -> Self {
        self.add_jitter = add_jitter;
        self
    }

    /// Delay before retry number `attempt` (0-indexed)
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let base = self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        let clamped = base.min(self.max_delay.as_millis() as f64);

        let delay = if self.add_jitter {
            clamped + clamped * 0.25 * rand_jitter()
        } else {
            clamped
        };
        Duration::from_millis(delay as u64)
    }

    /// Delay to wait after `error`, preferring the server's hint.
    fn delay_after(&self, error: &GatewayError, attempt: usize) -> Duration {
        match error.retry_after() {
            Some(hint) => hint.min(self.max_delay),
            None => self.delay_for_attempt(attempt),
        }
    }
}

/// Pseudo-random value in `[0, 1)` from a small LCG
fn rand_jitter() -> f64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    static SEED: AtomicU64 = AtomicU64::new(0);

    const A: u64 = 1103515245;
    const C: u64 = 12345;
    const M: u64 = 1 << 31;

    let seed = SEED.fetch_add(1, Ordering::Relaxed);
    let time_component = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);

    let next = (A.wrapping_mul(seed.wrapping_add(time_component)).wrapping_add(C)) % M;
    (next as f64) / (M as f64)
}

/// Run `operation` until it succeeds, fails permanently, or attempts run out.
///
/// Exhausting the attempts on a retryable error yields
/// [`GatewayError::RetriesExhausted`]; a non-retryable error is returned as is.
pub async fn with_retry<F, Fut, T>(config: &RetryConfig, operation: F) -> Result<T, GatewayError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, GatewayError>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => {
                attempt += 1;
                if attempt >= max_attempts {
                    return Err(GatewayError::RetriesExhausted {
                        attempts: attempt,
                        last_error: e.to_string(),
                    });
                }

                let delay = config.delay_after(&e, attempt - 1);
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Model request failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast() -> RetryConfig {
        RetryConfig::default()
            .with_initial_delay(Duration::from_millis(1))
            .with_jitter(false)
    }

    #[test]
    fn test_delay_grows_and_is_capped() {
        let config = RetryConfig::default()
            .with_jitter(false)
            .with_max_delay(Duration::from_millis(1500));

        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(500));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(1000));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(1500));
    }

    #[test]
    fn test_jitter_stays_within_a_quarter() {
        let config = RetryConfig::default();
        for _ in 0..20 {
            let delay = config.delay_for_attempt(0);
            assert!(delay >= Duration::from_millis(500));
            assert!(delay <= Duration::from_millis(625));
        }
    }

    #[test]
    fn test_retry_after_hint_is_capped() {
        let config = RetryConfig::default().with_max_delay(Duration::from_secs(2));
        let error = GatewayError::RateLimited {
            retry_after: Some(Duration::from_secs(90)),
        };
        assert_eq!(config.delay_after(&error, 0), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicUsize::new(0);
        let result = with_retry(&fast(), || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(GatewayError::Timeout)
            } else {
                Ok("done")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_is_not_retried() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), _> = with_retry(&fast(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(GatewayError::RequestFailed {
                status: 401,
                message: "bad key".into(),
            })
        })
        .await;

        assert!(matches!(
            result,
            Err(GatewayError::RequestFailed { status: 401, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhaustion_reports_attempts() {
        let result: Result<(), _> = with_retry(&fast().with_max_attempts(2), || async {
            Err(GatewayError::ConnectionError("refused".into()))
        })
        .await;

        match result {
            Err(GatewayError::RetriesExhausted { attempts, last_error }) => {
                assert_eq!(attempts, 2);
                assert!(last_error.contains("refused"));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }
}
