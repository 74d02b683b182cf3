//! Exponential back-off with jitter for shopping API calls.
//!
//! Only HTTP 429 and network-level failures are retried. Everything else,
//! including a missing API key and unparseable bodies, returns at once.

use std::future::Future;
use std::time::Duration;

use crate::error::ShoppingError;

const MAX_DELAY_MS: u64 = 60_000;

pub(crate) fn is_retriable(err: &ShoppingError) -> bool {
    matches!(
        err,
        ShoppingError::RateLimited { .. } | ShoppingError::Http(_)
    )
}

/// Delay before retry number `attempt` (1-based): the jittered exponential
/// back-off, raised to the server's `Retry-After` when a 429 carried one.
fn backoff_delay_ms(err: &ShoppingError, attempt: u32, backoff_base_secs: u64) -> u64 {
    let computed = backoff_base_secs
        .saturating_mul(1_000)
        .saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    let capped = computed.min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;

    match err {
        ShoppingError::RateLimited {
            retry_after_secs, ..
        } => jittered.max(retry_after_secs.saturating_mul(1_000)),
        _ => jittered,
    }
}

/// Runs `operation`, retrying up to `max_retries` more times on transient
/// errors. The n-th retry waits `backoff_base_secs * 2^(n-1)` seconds
/// ±25 % jitter, capped at 60 s. A 429 never waits less than its
/// `Retry-After`.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ShoppingError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ShoppingError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay_ms = backoff_delay_ms(&err, attempt, backoff_base_secs);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient shopping API error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
