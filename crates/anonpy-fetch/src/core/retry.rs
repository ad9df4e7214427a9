use std::time::Duration;

/// Upper bound for a single backoff sleep.
pub const BACKOFF_MAX: Duration = Duration::from_secs(120);

/// Calculate the delay before a retry using exponential backoff.
///
/// The delay formula is: `backoff_factor * 2^(retry - 1)` seconds, capped at
/// [`BACKOFF_MAX`]. `retry` is 1-based; `retry == 0` (the initial attempt)
/// never waits.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use anonpy_fetch::core::retry_delay;
///
/// assert_eq!(retry_delay(0, 1.0), Duration::ZERO);
/// assert_eq!(retry_delay(1, 0.5), Duration::from_millis(500));
/// assert_eq!(retry_delay(3, 0.5), Duration::from_secs(2));
/// ```
pub fn retry_delay(retry: u32, backoff_factor: f64) -> Duration {
    if retry == 0 || !backoff_factor.is_finite() || backoff_factor <= 0.0 {
        return Duration::ZERO;
    }

    // 2^63 already exceeds any cap, so clamp the exponent before converting
    let exponent = (retry - 1).min(63) as i32;
    let seconds = backoff_factor * 2f64.powi(exponent);

    Duration::try_from_secs_f64(seconds)
        .map(|delay| delay.min(BACKOFF_MAX))
        .unwrap_or(BACKOFF_MAX)
}

/// Parse a `Retry-After` header given in whole seconds.
///
/// HTTP-date values are ignored and yield `None`.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| Duration::from_secs(secs).min(BACKOFF_MAX))
}

/// Status codes for which servers commonly send `Retry-After`.
pub fn honours_retry_after(status: u16) -> bool { matches!(status, 413 | 429 | 503) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_basic() {
        assert_eq!(retry_delay(1, 1.0), Duration::from_secs(1));
        assert_eq!(retry_delay(2, 1.0), Duration::from_secs(2));
        assert_eq!(retry_delay(3, 1.0), Duration::from_secs(4));
        assert_eq!(retry_delay(4, 1.0), Duration::from_secs(8));
    }

    #[test]
    fn test_retry_delay_zero_factor() {
        assert_eq!(retry_delay(1, 0.0), Duration::ZERO);
        assert_eq!(retry_delay(10, 0.0), Duration::ZERO);
    }

    #[test]
    fn test_retry_delay_is_capped() {
        assert_eq!(retry_delay(20, 1.0), BACKOFF_MAX);
        assert_eq!(retry_delay(u32::MAX, 1.0), BACKOFF_MAX);
        assert_eq!(retry_delay(2, 1e300), BACKOFF_MAX);
    }

    #[test]
    fn test_retry_delay_exponential_growth() {
        let delays: Vec<Duration> = (1..6).map(|i| retry_delay(i, 0.01)).collect();
        for pair in delays.windows(2) {
            let ratio = pair[1].as_secs_f64() / pair[0].as_secs_f64();
            assert!((ratio - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after("7"), Some(Duration::from_secs(7)));
        assert_eq!(parse_retry_after(" 3600 "), Some(BACKOFF_MAX));
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }

    #[test]
    fn test_honours_retry_after() {
        assert!(honours_retry_after(429));
        assert!(honours_retry_after(503));
        assert!(!honours_retry_after(500));
    }
}
