use std::time::Duration;

/// Delay before retrying a failed attempt.
///
/// `base_delay_ms * 2^attempt` plus a uniform random component in
/// `[0, base_delay_ms)`. The exponent is the current 1-based attempt number,
/// so the first retry waits roughly `2*base..3*base`. The jitter spreads out
/// callers that failed at the same instant.
pub fn backoff_delay(base_delay_ms: u64, attempt: u32) -> Duration {
    backoff_delay_with_jitter(base_delay_ms, attempt, rand::random::<f64>())
}

/// Same as [`backoff_delay`] with the jitter fraction supplied by the caller.
///
/// `jitter` must be in `[0, 1)`; the added component is `jitter * base_delay_ms`.
pub fn backoff_delay_with_jitter(base_delay_ms: u64, attempt: u32, jitter: f64) -> Duration {
    let exponential = base_delay_ms.saturating_mul(2_u64.saturating_pow(attempt));
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let total_ms = exponential as f64 + jitter * base_delay_ms as f64;
    Duration::from_millis(total_ms as u64)
}
