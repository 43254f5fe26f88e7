//! Application Configuration
//!
//! Configuration for the newsletter application layer.

use std::time::Duration;

use platform::rate_limit::RateLimitConfig;

use crate::domain::value_objects::Difficulty;

/// Newsletter application configuration
#[derive(Debug, Clone)]
pub struct NewsletterConfig {
    /// PoW difficulty (leading zero hex characters)
    pub difficulty: Difficulty,
    /// Challenge TTL
    pub challenge_ttl: Duration,
    /// Rate limit for challenge issuance
    pub token_rate: RateLimitConfig,
    /// Rate limit for subscribe attempts
    pub subscribe_rate: RateLimitConfig,
    /// Minimum elapsed time between page load and submission
    pub min_submit_delay: Duration,
    /// Minimum number of interaction signals when the client reports them
    pub min_interactions: usize,
    /// Interval for the background expired-challenge sweep
    pub sweep_interval: Duration,
}

impl Default for NewsletterConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::DEFAULT,
            challenge_ttl: Duration::from_secs(600),
            token_rate: RateLimitConfig::new(5, 300),
            subscribe_rate: RateLimitConfig::new(3, 3600),
            min_submit_delay: Duration::from_secs(5),
            min_interactions: 2,
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl NewsletterConfig {
    /// Create config for development (easier puzzle, no submit delay gate)
    pub fn development() -> Self {
        Self {
            difficulty: Difficulty::new(2).unwrap_or_default(),
            min_submit_delay: Duration::from_secs(1),
            ..Default::default()
        }
    }

    /// Challenge TTL as a chrono duration for expiry arithmetic
    pub fn challenge_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.challenge_ttl)
            .unwrap_or_else(|_| chrono::Duration::minutes(10))
    }

    pub fn min_submit_delay_ms(&self) -> i64 {
        self.min_submit_delay.as_millis() as i64
    }
}
