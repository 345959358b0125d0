use pirouette_infra::BackoffConfig;
use std::time::Duration;

/// Exponentially growing delay for the given zero-based attempt number,
/// capped at `max_millis`.
pub fn backoff_delay(config: &BackoffConfig, attempt: u32) -> Duration {
    let exp = config
        .initial_millis
        .saturating_mul(1u64 << attempt.min(16));
    Duration::from_millis(exp.min(config.max_millis))
}
