//! Retry and backoff policy shared by every HTTP provider

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Minimum attempts per endpoint; a single attempt cannot absorb one 429
pub const MIN_ATTEMPTS: u32 = 2;

/// Bounded retry policy with capped exponential backoff
///
/// Rate-limited attempts wait `base * multiplier^attempt` (capped at
/// `max_delay`); other retryable failures wait `base`.
///
/// # Examples
///
/// ```
/// use foundry_llm::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.delay_for(0), Duration::from_secs(2));
/// assert_eq!(policy.delay_for(1), Duration::from_secs(4));
/// assert_eq!(policy.delay_for(10), Duration::from_secs(30)); // capped
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Attempts per endpoint (at least [`MIN_ATTEMPTS`])
    pub max_attempts: u32,

    /// Base delay in milliseconds
    pub base_delay_ms: u64,

    /// Backoff multiplier applied per attempt on rate limiting
    pub multiplier: f64,

    /// Upper bound on any single delay in milliseconds
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 2_000,
            multiplier: 2.0,
            max_delay_ms: 30_000,
        }
    }
}

impl RetryPolicy {
    /// Policy without any waiting, for tests and dry runs
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay_ms: 0,
            multiplier: 1.0,
            max_delay_ms: 0,
        }
    }

    /// Effective attempts per endpoint
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(MIN_ATTEMPTS)
    }

    /// Backoff before retrying after a 429 on the given zero-based attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.max(1.0).powi(attempt.min(32) as i32);
        let millis = (self.base_delay_ms as f64 * factor).min(self.max_delay_ms as f64);
        Duration::from_millis(millis as u64)
    }

    /// Pause before retrying after any other failure
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms.min(self.max_delay_ms))
    }

    /// Validate the policy
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts < MIN_ATTEMPTS {
            return Err(format!("max_attempts must be at least {}", MIN_ATTEMPTS));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err("multiplier must be a finite number >= 1.0".to_string());
        }
        if self.max_delay_ms < self.base_delay_ms {
            return Err("max_delay_ms cannot be below base_delay_ms".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_valid() {
        assert!(RetryPolicy::default().validate().is_ok());
    }

    #[test]
    fn test_attempts_never_below_minimum() {
        let policy = RetryPolicy {
            max_attempts: 1,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.attempts(), MIN_ATTEMPTS);
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_backoff_grows_then_caps() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay_ms: 100,
            multiplier: 3.0,
            max_delay_ms: 1_000,
        };
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(300));
        assert_eq!(policy.delay_for(2), Duration::from_millis(900));
        assert_eq!(policy.delay_for(3), Duration::from_millis(1_000));
        assert_eq!(policy.retry_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_immediate_policy_never_waits() {
        let policy = RetryPolicy::immediate(2);
        assert_eq!(policy.delay_for(5), Duration::ZERO);
        assert_eq!(policy.retry_delay(), Duration::ZERO);
    }

    #[test]
    fn test_invalid_multiplier() {
        let policy = RetryPolicy {
            multiplier: 0.5,
            ..RetryPolicy::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let policy: RetryPolicy = toml::from_str("max_attempts = 4").unwrap();
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.base_delay_ms, 2_000);
    }
}
