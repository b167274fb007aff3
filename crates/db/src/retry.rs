//! Bounded retry for operations that lose a race.
//!
//! Only errors classified as `ConcurrencyConflict` are retried. Every attempt
//! must run a whole unit of work, so a retry starts from a clean transaction.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use folio_shared::error::Classify;
use tracing::warn;

const BASE_DELAY_MS: u64 = 10;
const MAX_DELAY_MS: u64 = 500;

/// Exponential backoff: `base * 2^attempt`, capped.
#[must_use]
pub fn delay_for_attempt(attempt: u32) -> Duration {
    let exponential = BASE_DELAY_MS.saturating_mul(1u64 << attempt.min(16));
    Duration::from_millis(exponential.min(MAX_DELAY_MS))
}

/// Runs `op` up to `max_attempts` times while it fails with a retryable error.
///
/// `max_attempts` counts the first attempt; zero is treated as one.
///
/// # Errors
///
/// Returns the last error once attempts are exhausted, or the first
/// non-retryable error.
pub async fn with_retry<T, E, F, Fut>(max_attempts: u32, operation: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                warn!(
                    operation,
                    attempt,
                    max_attempts,
                    error = %err,
                    "Concurrency conflict, retrying"
                );
                tokio::time::sleep(delay_for_attempt(attempt)).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::ledger::LedgerError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_delay_grows_and_caps() {
        assert_eq!(delay_for_attempt(0), Duration::from_millis(10));
        assert_eq!(delay_for_attempt(1), Duration::from_millis(20));
        assert_eq!(delay_for_attempt(3), Duration::from_millis(80));
        assert_eq!(delay_for_attempt(30), Duration::from_millis(MAX_DELAY_MS));
    }

    #[tokio::test]
    async fn test_retries_conflicts_until_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<u32, LedgerError> = with_retry(3, "test", || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 {
                Err(LedgerError::ConcurrentModification)
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), LedgerError> = with_retry(2, "test", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(LedgerError::ConcurrentModification)
        })
        .await;

        assert!(matches!(result, Err(LedgerError::ConcurrentModification)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_does_not_retry_validation_errors() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), LedgerError> = with_retry(5, "test", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(LedgerError::EntryNotFound(uuid::Uuid::nil()))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
