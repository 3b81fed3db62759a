//! Retry with exponential backoff for idempotent ledger gateway reads.
//!
//! Only transport errors (connection refused, timeouts) are retried. A
//! response with any status code is returned to the caller as-is.

use std::time::Duration;

/// Retry attempts after the initial request.
const MAX_RETRIES: u32 = 3;

/// Delay before the first retry; doubles each attempt.
const BASE_DELAY_MS: u64 = 200;

pub(crate) async fn retry_send<F, Fut>(endpoint: &str, f: F) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    for attempt in 0..MAX_RETRIES {
        match f().await {
            Ok(resp) => return Ok(resp),
            Err(e) => {
                let delay = Duration::from_millis(BASE_DELAY_MS * 2u64.pow(attempt));
                tracing::warn!(
                    endpoint,
                    attempt = attempt + 1,
                    max_retries = MAX_RETRIES,
                    "ledger gateway request failed, retrying in {delay:?}: {e}"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
    f().await
}
