use std::collections::BTreeSet;
use std::time::Duration;

use crate::core::retry_delay;
use crate::error::{Error, Result};

/// Status codes retried unless configured otherwise.
pub const DEFAULT_STATUS_FORCELIST: [u16; 6] = [413, 429, 500, 502, 503, 504];

/// How often and how patiently a failed request is repeated.
///
/// # Examples
///
/// ```
/// use anonpy_fetch::RetryPolicy;
///
/// let policy = RetryPolicy::new(3, [503], 0.5).unwrap();
/// assert_eq!(policy.max_attempts(), 4);
/// assert!(policy.is_retryable_status(503));
/// assert!(!policy.is_retryable_status(404));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    total_retries:    u32,
    status_forcelist: BTreeSet<u16>,
    backoff_factor:   f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            total_retries:    5,
            status_forcelist: DEFAULT_STATUS_FORCELIST.into_iter().collect(),
            backoff_factor:   1.0,
        }
    }
}

impl RetryPolicy {
    /// # Errors
    ///
    /// [`Error::Configuration`] for a negative retry count, or a negative or
    /// non-finite backoff factor.
    pub fn new(
        total_retries: i64,
        status_forcelist: impl IntoIterator<Item = u16>,
        backoff_factor: f64,
    ) -> Result<Self> {
        let total_retries = u32::try_from(total_retries).map_err(|_| {
            Error::Configuration(format!(
                "total retries must be between 0 and {}, got {total_retries}",
                u32::MAX
            ))
        })?;

        if !backoff_factor.is_finite() || backoff_factor < 0.0 {
            return Err(Error::Configuration(format!(
                "backoff factor must be a non-negative number, got {backoff_factor}"
            )));
        }

        Ok(Self {
            total_retries,
            status_forcelist: status_forcelist.into_iter().collect(),
            backoff_factor,
        })
    }

    /// Every request is attempted exactly once.
    pub fn none() -> Self {
        Self {
            total_retries: 0,
            ..Self::default()
        }
    }

    pub fn total_retries(&self) -> u32 { self.total_retries }

    pub fn status_forcelist(&self) -> &BTreeSet<u16> { &self.status_forcelist }

    pub fn backoff_factor(&self) -> f64 { self.backoff_factor }

    /// Initial attempt plus all retries.
    pub fn max_attempts(&self) -> u32 { self.total_retries.saturating_add(1) }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.status_forcelist.contains(&status)
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay(&self, retry: u32) -> Duration { retry_delay(retry, self.backoff_factor) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_common_forcelist() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.total_retries(), 5);
        assert_eq!(policy.backoff_factor(), 1.0);
        for status in DEFAULT_STATUS_FORCELIST {
            assert!(policy.is_retryable_status(status));
        }
        assert!(!policy.is_retryable_status(404));
    }

    #[test]
    fn negative_retries_are_rejected() {
        assert!(matches!(
            RetryPolicy::new(-1, DEFAULT_STATUS_FORCELIST, 1.0),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn invalid_backoff_is_rejected() {
        assert!(RetryPolicy::new(1, [], -0.1).is_err());
        assert!(RetryPolicy::new(1, [], f64::NAN).is_err());
    }

    #[test]
    fn zero_retries_means_one_attempt() {
        assert_eq!(RetryPolicy::none().max_attempts(), 1);
        assert_eq!(RetryPolicy::new(0, [503], 1.0).unwrap().max_attempts(), 1);
    }
}
