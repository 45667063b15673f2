//! Rate Limiting Infrastructure
//!
//! Fixed-window rate limiting for data-access entry points.
//!
//! Every instance keeps its own in-process token map; there is no shared
//! store, so limits reset on restart and diverge across instances. That is
//! a deliberate non-goal of this design.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use thiserror::Error;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_tokens: u32,
    /// Time window duration
    pub interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_tokens: 10,
            interval: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_tokens: u32, interval_ms: u64) -> Self {
        Self {
            max_tokens,
            interval: Duration::from_millis(interval_ms),
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval.as_millis() as u64
    }
}

/// Rejection returned when a caller has exhausted its window budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Too Many Requests")]
pub struct RateLimitExceeded;

/// Per-key token window state
#[derive(Debug)]
struct TokenRecord {
    tokens: u32,
    window_start: Instant,
}

/// Fixed-window rate limiter
///
/// One [`TokenRecord`] per distinct key, created lazily and kept for the
/// process lifetime. The window resets discretely: a caller straddling a
/// window boundary can spend close to twice the budget in a short span.
/// That burst is an accepted property of the fixed-window scheme, traded
/// for simplicity over a sliding window.
pub struct FixedWindowLimiter {
    config: RateLimitConfig,
    records: Mutex<HashMap<String, TokenRecord>>,
}

impl FixedWindowLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            records: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check and account one request for `key`
    ///
    /// Allows and decrements inside the current window; resets the budget
    /// when the window has elapsed; rejects once the budget is exhausted.
    pub fn check(&self, key: &str) -> Result<(), RateLimitExceeded> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), RateLimitExceeded> {
        let mut records = self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        match records.get_mut(key) {
            None => {
                records.insert(
                    key.to_string(),
                    TokenRecord {
                        tokens: self.config.max_tokens.saturating_sub(1),
                        window_start: now,
                    },
                );
                Ok(())
            }
            Some(record) => {
                if now.duration_since(record.window_start) > self.config.interval {
                    record.tokens = self.config.max_tokens.saturating_sub(1);
                    record.window_start = now;
                    Ok(())
                } else if record.tokens > 0 {
                    record.tokens -= 1;
                    Ok(())
                } else {
                    Err(RateLimitExceeded)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_tokens: u32, interval_ms: u64) -> FixedWindowLimiter {
        FixedWindowLimiter::new(RateLimitConfig::new(max_tokens, interval_ms))
    }

    #[test]
    fn test_fourth_call_in_window_rejected() {
        let limiter = limiter(3, 1000);
        let now = Instant::now();

        assert!(limiter.check_at("10.0.0.1", now).is_ok());
        assert!(limiter.check_at("10.0.0.1", now).is_ok());
        assert!(limiter.check_at("10.0.0.1", now).is_ok());
        assert_eq!(limiter.check_at("10.0.0.1", now), Err(RateLimitExceeded));
    }

    #[test]
    fn test_window_reset_restores_budget() {
        let limiter = limiter(3, 1000);
        let start = Instant::now();

        for _ in 0..3 {
            assert!(limiter.check_at("10.0.0.1", start).is_ok());
        }
        assert!(limiter.check_at("10.0.0.1", start).is_err());

        // Strictly past the window boundary: allowed, budget back to max - 1
        let later = start + Duration::from_millis(1001);
        assert!(limiter.check_at("10.0.0.1", later).is_ok());
        assert!(limiter.check_at("10.0.0.1", later).is_ok());
        assert!(limiter.check_at("10.0.0.1", later).is_ok());
        assert_eq!(limiter.check_at("10.0.0.1", later), Err(RateLimitExceeded));
    }

    #[test]
    fn test_boundary_is_exclusive() {
        let limiter = limiter(1, 1000);
        let start = Instant::now();

        assert!(limiter.check_at("k", start).is_ok());
        // Exactly interval later is still the same window
        let boundary = start + Duration::from_millis(1000);
        assert_eq!(limiter.check_at("k", boundary), Err(RateLimitExceeded));
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = limiter(1, 1000);
        let now = Instant::now();

        assert!(limiter.check_at("10.0.0.1", now).is_ok());
        assert_eq!(limiter.check_at("10.0.0.1", now), Err(RateLimitExceeded));
        assert!(limiter.check_at("10.0.0.2", now).is_ok());
    }

    #[test]
    fn test_zero_budget_never_allows_second_call() {
        let limiter = limiter(0, 1000);
        let now = Instant::now();

        // First observation creates the record and allows
        assert!(limiter.check_at("k", now).is_ok());
        assert_eq!(limiter.check_at("k", now), Err(RateLimitExceeded));
    }
}
