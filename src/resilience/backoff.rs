//! Exponential backoff with jitter for same-provider retries.

use std::time::Duration;

use rand::Rng;

use crate::config::RetryConfig;

/// Doubling delay from `base_ms`, capped at `max_ms`, plus up to 10% jitter.
///
/// `attempt` is 1-based; attempt 0 yields no delay.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let Some(exponent) = attempt.checked_sub(1) else {
        return Duration::ZERO;
    };

    let delay_ms = base_ms
        .saturating_mul(1u64.checked_shl(exponent).unwrap_or(u64::MAX))
        .min(max_ms);
    let jitter_ms = match delay_ms / 10 {
        0 => 0,
        spread => rand::thread_rng().gen_range(0..spread),
    };

    Duration::from_millis(delay_ms + jitter_ms)
}

/// Delay before retrying the same provider: backoff raised to the
/// classifier's wait hint, never beyond `max_delay_ms`.
pub fn retry_delay(attempt: u32, wait_hint: Duration, config: &RetryConfig) -> Duration {
    let backoff = calculate_backoff(attempt, config.base_delay_ms, config.max_delay_ms);
    backoff
        .max(wait_hint)
        .min(Duration::from_millis(config.max_delay_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        assert_eq!(calculate_backoff(0, 100, 2000), Duration::ZERO);

        let b1 = calculate_backoff(1, 100, 2000);
        assert!(b1.as_millis() >= 100 && b1.as_millis() < 110);

        let b2 = calculate_backoff(2, 100, 2000);
        assert!(b2.as_millis() >= 200);

        let max = calculate_backoff(10, 100, 1000);
        assert!(max.as_millis() >= 1000 && max.as_millis() < 1100);
    }

    #[test]
    fn test_retry_delay_honors_hint_and_cap() {
        let config = RetryConfig {
            max_same_provider_retries: 2,
            base_delay_ms: 100,
            max_delay_ms: 10_000,
        };

        // 60s rate-limit hint is capped
        assert_eq!(
            retry_delay(1, Duration::from_secs(60), &config),
            Duration::from_millis(10_000)
        );
        // 3s network hint dominates a 100ms backoff
        assert_eq!(
            retry_delay(1, Duration::from_secs(3), &config),
            Duration::from_secs(3)
        );
    }
}
