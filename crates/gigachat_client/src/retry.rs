use rand::{RngExt, rng};
use std::time::Duration;

/// A simple retry policy with capped exponential backoff and jitter.
///
/// `max_attempts` counts every call, including the first one. The default
/// matches the credential-exchange schedule: three attempts, backoff
/// starting at 4s, capped at 10s.
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub async fn retry_async<F, Fut, T, E>(&self, mut f: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        let mut attempt = 0u32;
        loop {
            match f().await {
                Ok(v) => return Ok(v),
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.max_attempts {
                        return Err(e);
                    }
                    // exponential backoff with jitter, capped at max_delay
                    let ceiling = self
                        .base_delay
                        .saturating_mul(1u32 << (attempt - 1))
                        .min(self.max_delay);
                    let mut rng = rng();
                    let jitter = rng.random_range(0..=ceiling.as_millis() as u64);
                    tokio::time::sleep(Duration::from_millis(jitter)).await;
                }
            }
        }
    }
}
