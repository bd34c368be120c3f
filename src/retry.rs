//! Bounded fixed-delay retry around the single-attempt ledger fetcher.
//!
//! Transient node failures (rate limiting, temporary unavailability) are
//! expected during a multi-hour export and must not abort the batch. The
//! wrapper absorbs them up to the attempt limit; exhaustion becomes an
//! explicit [`FetchOutcome::Unavailable`] that the caller decides how to
//! handle, never a propagated error.

use crate::error::IsRetryable;
use crate::rpc::LedgerFetcher;
use crate::types::{FetchOutcome, LedgerIndex};
use rand::Rng;
use std::time::Duration;

/// Bounded-attempt, fixed-delay retry policy
///
/// Call sites build their own policy, so the first index of a partition can
/// carry a different attempt limit than subsequent indices (see
/// [`crate::config::RetryConfig`]).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of fetch attempts; a limit of zero is treated as one
    pub max_attempts: u32,
    /// Fixed delay between attempts
    pub delay: Duration,
    /// Add up to 100% uniform random jitter to the delay
    pub jitter: bool,
}

/// Fetch one ledger index with bounded retries.
///
/// Calls the fetcher up to `policy.max_attempts` times, sleeping
/// `policy.delay` between attempts. Every failed attempt is reported via a
/// `tracing::warn!` identifying the index and attempt number. After the
/// last failure the outcome is [`FetchOutcome::Unavailable`] carrying the
/// final error. A non-retryable error short-circuits to `Unavailable`
/// without consuming the remaining attempts.
pub async fn fetch_with_retry(
    fetcher: &dyn LedgerFetcher,
    index: LedgerIndex,
    policy: &RetryPolicy,
) -> FetchOutcome {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match fetcher.fetch(index).await {
            Ok(transactions) => {
                if attempt > 1 {
                    tracing::info!(
                        ledger_index = index.get(),
                        attempts = attempt,
                        "Fetch succeeded after retry"
                    );
                }
                return FetchOutcome::Success(transactions);
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                tracing::warn!(
                    ledger_index = index.get(),
                    attempt = attempt,
                    max_attempts = max_attempts,
                    error = %e,
                    "Fetch attempt failed, retrying"
                );

                let delay = if policy.jitter {
                    add_jitter(policy.delay)
                } else {
                    policy.delay
                };
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                tracing::warn!(
                    ledger_index = index.get(),
                    attempts = attempt,
                    error = %e,
                    "Ledger unavailable, giving up"
                );
                return FetchOutcome::Unavailable(e);
            }
        }
    }
}

/// Add random jitter to a delay to avoid synchronized hammering of the node
/// by concurrent partitions.
///
/// Jitter is uniformly distributed between 0% and 100% of the delay, so the
/// actual delay falls between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
}
