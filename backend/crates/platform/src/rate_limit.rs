//! Rate Limiting Infrastructure
//!
//! Common rate limiting abstractions and implementations. Limits are
//! counted per (identifier, endpoint) pair over fixed windows so one
//! backend can serve several endpoints with different budgets.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }
}

/// Rate limit check result
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at_ms: i64,
}

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Check and increment the counter for one (identifier, endpoint) pair
    async fn check_and_increment(
        &self,
        identifier: &str,
        endpoint: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, Box<dyn std::error::Error + Send + Sync>>;
}

/// In-memory fixed-window rate limiter
///
/// Counters are keyed by (identifier, endpoint, window start). Stale
/// windows for the same key are pruned on access, so the map stays
/// bounded by the active client set.
#[derive(Debug, Default)]
pub struct MemoryRateLimiter {
    counters: RwLock<HashMap<(String, String, i64), u32>>,
}

impl MemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    fn now_ms() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }
}

impl RateLimitStore for MemoryRateLimiter {
    async fn check_and_increment(
        &self,
        identifier: &str,
        endpoint: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, Box<dyn std::error::Error + Send + Sync>> {
        let now_ms = Self::now_ms();
        let window_ms = config.window_ms().max(1);
        let window_start = (now_ms / window_ms) * window_ms;

        let mut counters = self
            .counters
            .write()
            .map_err(|_| "rate limit lock poisoned".to_string())?;

        counters.retain(|(id, ep, start), _| {
            !(id == identifier && ep == endpoint && *start < window_start)
        });

        let key = (identifier.to_string(), endpoint.to_string(), window_start);
        let count = counters.entry(key).or_insert(0);
        *count += 1;

        let allowed = *count <= config.max_requests;
        Ok(RateLimitResult {
            allowed,
            remaining: config.max_requests.saturating_sub(*count),
            reset_at_ms: window_start + window_ms,
        })
    }
}
