use std::time::Duration;

/// Delay before the first reconnect attempt.
pub const BASE_DELAY_MS: u64 = 1000;
/// Upper bound for the reconnect delay.
pub const MAX_DELAY_MS: u64 = 30_000;

/// Exponential reconnect backoff for a zero-based attempt counter.
pub fn reconnect_delay(attempt: u32) -> Duration {
    let exponent = attempt.min(30);
    let delay = BASE_DELAY_MS.saturating_mul(2u64.saturating_pow(exponent));
    Duration::from_millis(delay.min(MAX_DELAY_MS))
}
