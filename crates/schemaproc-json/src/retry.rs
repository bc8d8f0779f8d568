//! Retry logic with exponential backoff for schema HTTP fetches.
//!
//! Retries only on transport errors (connection failures, timeouts).
//! Non-2xx responses are returned to the caller on the first attempt.

use std::time::Duration;

/// Backoff schedule for HTTP fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the initial request.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub base_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_millis(800),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (zero-based): 200ms, 400ms,
    /// 800ms, then `max_delay` for every later retry.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_delay)
    }
}

/// Call `f` up to `policy.max_retries + 1` times, sleeping between
/// transport failures.
pub(crate) fn retry_send<F>(
    policy: &RetryPolicy,
    f: F,
) -> Result<reqwest::blocking::Response, reqwest::Error>
where
    F: Fn() -> Result<reqwest::blocking::Response, reqwest::Error>,
{
    for attempt in 0..policy.max_retries {
        match f() {
            Ok(resp) => return Ok(resp),
            Err(e) => {
                let delay = policy.delay(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    "schema fetch failed, retrying in {delay:?}: {e}"
                );
                std::thread::sleep(delay);
            }
        }
    }
    f()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn delays_double() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(0), Duration::from_millis(200));
        assert_eq!(policy.delay(1), Duration::from_millis(400));
        assert_eq!(policy.delay(2), Duration::from_millis(800));
    }

    #[test]
    fn delay_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(3), policy.max_delay);
        assert_eq!(policy.delay(40), policy.max_delay);
        assert_eq!(policy.delay(u32::MAX), policy.max_delay);
    }

    #[test]
    fn retry_exhausts_all_attempts_on_transport_failure() {
        let policy = RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        };
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();
        let calls = AtomicU32::new(0);

        // Closed port: connection refused.
        let result = retry_send(&policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            client.get("http://127.0.0.1:1/").send()
        });

        assert!(result.is_err(), "request to closed port must fail");
        assert_eq!(calls.load(Ordering::SeqCst), policy.max_retries + 1);
    }
}
