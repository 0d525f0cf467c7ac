// Exponential backoff for rate-limited (HTTP 429) calls
use crate::domain::error::TranslateError;
use crate::domain::traits::Sleeper;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Delay before retry number `attempt` (0-based): `base * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Real sleeper on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Run `op`, retrying only while it fails with HTTP 429 and retries remain.
///
/// Any other error, or the 429 left after the last retry, is returned unchanged.
pub async fn retry_rate_limited<T, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut op: F,
) -> Result<T, TranslateError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TranslateError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Err(err) if err.is_rate_limited() && attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                warn!(
                    retry = attempt + 1,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "rate limited (429), backing off"
                );
                sleeper.sleep(delay).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSleeper {
        slept: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
        }
    }

    fn rate_limited() -> TranslateError {
        TranslateError::Api {
            status: 429,
            status_text: "Too Many Requests".to_string(),
            body: String::new(),
        }
    }

    #[test]
    fn delays_double() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4000));
        assert_eq!(RetryPolicy::new(1, Duration::MAX).delay_for(40), Duration::MAX);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let sleeper = RecordingSleeper::default();
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_rate_limited(&RetryPolicy::default(), &sleeper, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(rate_limited()) }
        })
        .await;

        assert!(result.unwrap_err().is_rate_limited());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(
            *sleeper.slept.lock().unwrap(),
            vec![
                Duration::from_millis(1000),
                Duration::from_millis(2000),
                Duration::from_millis(4000)
            ]
        );
    }

    #[tokio::test]
    async fn recovers_when_limit_clears() {
        let sleeper = RecordingSleeper::default();
        let calls = AtomicU32::new(0);
        let result = retry_rate_limited(&RetryPolicy::default(), &sleeper, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(rate_limited())
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(sleeper.slept.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let sleeper = RecordingSleeper::default();
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_rate_limited(&RetryPolicy::default(), &sleeper, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(TranslateError::Api {
                    status: 503,
                    status_text: "Service Unavailable".to_string(),
                    body: "busy".to_string(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(TranslateError::Api { status: 503, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.slept.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_retries_means_single_attempt() {
        let sleeper = RecordingSleeper::default();
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(0, Duration::from_millis(10));
        let result: Result<(), _> = retry_rate_limited(&policy, &sleeper, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(rate_limited()) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
