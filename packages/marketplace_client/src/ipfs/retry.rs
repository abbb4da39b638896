use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::UploadError;

/// Attempts, per-attempt timeout and backoff for one pinning request.
///
/// After failed attempt `n` (1-based) the next attempt waits `base_delay * 2^n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub timeout: Duration,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub const fn new(retries: u32, timeout: Duration) -> Self {
        Self {
            retries,
            timeout,
            base_delay: Duration::from_secs(1),
        }
    }

    /// Batch endpoint: 3 attempts, 60s each
    pub const fn batch() -> Self {
        Self::new(3, Duration::from_secs(60))
    }

    /// Direct JSON pin: 3 attempts, 30s each
    pub const fn json() -> Self {
        Self::new(3, Duration::from_secs(30))
    }

    /// A single attempt
    pub const fn once(timeout: Duration) -> Self {
        Self::new(1, timeout)
    }

    pub fn backoff(&self, failed_attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(failed_attempt)
    }
}

/// Run `op` under `policy`, returning the first success
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T, UploadError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, UploadError>>,
{
    let attempts = policy.retries.max(1);
    let mut last = String::new();

    for attempt in 1..=attempts {
        info!(label, attempt, attempts, "upload attempt");
        let error = match tokio::time::timeout(policy.timeout, op()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) => err,
            Err(_) => UploadError::Timeout(policy.timeout.as_secs()),
        };
        warn!(label, attempt, error = %error, "upload attempt failed");
        last = error.to_string();

        if attempt < attempts {
            let wait = policy.backoff(attempt);
            info!(label, wait_secs = wait.as_secs(), "waiting before retry");
            tokio::time::sleep(wait).await;
        }
    }

    Err(UploadError::Exhausted { attempts, last })
}
