//! Exponential backoff with jitter.

use rand::Rng;
use std::time::Duration;

use crate::config::RetryConfig;

/// Delay before retry number `attempt` (1-based): `base * 2^(attempt-1)`,
/// capped at `max_delay_ms`, plus jitter.
pub fn retry_delay(attempt: u32, config: &RetryConfig) -> Duration {
    let Some(exponent) = attempt.checked_sub(1) else {
        return Duration::ZERO;
    };

    let factor = 1u64.checked_shl(exponent).unwrap_or(u64::MAX);
    let delay = Duration::from_millis(config.base_delay_ms.saturating_mul(factor))
        .min(Duration::from_millis(config.max_delay_ms));

    delay + jitter(delay)
}

/// Uniform in `[0, delay / 10)`; zero below 10ms.
fn jitter(delay: Duration) -> Duration {
    let tenth_ms = (delay.as_millis() / 10) as u64;
    if tenth_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..tenth_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(base: u64, max: u64) -> RetryConfig {
        RetryConfig {
            enabled: true,
            max_attempts: 5,
            base_delay_ms: base,
            max_delay_ms: max,
        }
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let config = policy(100, 1000);
        assert_eq!(retry_delay(0, &config), Duration::ZERO);

        let first = retry_delay(1, &config).as_millis();
        assert!((100..110).contains(&first));

        let second = retry_delay(2, &config).as_millis();
        assert!((200..220).contains(&second));

        let capped = retry_delay(30, &config).as_millis();
        assert!((1000..1100).contains(&capped));
    }

    #[test]
    fn test_huge_attempt_saturates_at_cap() {
        let config = policy(u64::MAX / 2, 2000);
        let delay = retry_delay(u32::MAX, &config).as_millis();
        assert!((2000..2200).contains(&delay));
    }

    #[test]
    fn test_small_delays_have_no_jitter() {
        let config = policy(5, 5);
        assert_eq!(retry_delay(3, &config), Duration::from_millis(5));
    }
}
