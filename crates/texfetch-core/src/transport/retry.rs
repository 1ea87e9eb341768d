//! Retry classification and exponential backoff for the HTTP transport.

use std::time::Duration;

/// Upper bound for a single backoff sleep.
const MAX_BACKOFF_MS: u64 = 30_000;

/// Whether a response status should be retried.
pub fn is_retryable_status(status: u16, retry_statuses: &[u16]) -> bool {
    retry_statuses.contains(&status)
}

/// Whether a transport error should be retried.
///
/// Connection failures and timeouts are transient; anything else (bad URL,
/// redirect loop, body construction) is not.
pub fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect()
}

/// Calculate exponential backoff duration before retry number `attempt` (0-based).
///
/// Uses `base_delay * 2^attempt` with a cap at 30 seconds.
pub fn backoff_duration(attempt: u32, base_delay_ms: u64) -> Duration {
    let delay = base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay.min(MAX_BACKOFF_MS))
}
