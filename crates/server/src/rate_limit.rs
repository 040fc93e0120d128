//! Per-session rate limiting
//!
//! Token bucket per session id, refilled continuously. Buckets for
//! sessions that stay idle longer than the refill horizon are dropped on
//! the next sweep through `check`.

use std::collections::HashMap;
use std::time::Instant;

use parking_lot::Mutex;

use concierge_config::RateLimitConfig;

#[derive(Debug, thiserror::Error)]
#[error("rate limit exceeded")]
pub struct RateLimitError;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token-bucket limiter keyed by session id.
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, Bucket>>,
    rate: f64,
    burst: f64,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let rate = f64::from(config.messages_per_second);
        Self {
            buckets: Mutex::new(HashMap::new()),
            rate,
            burst: rate * f64::from(config.burst_multiplier),
        }
    }

    /// Take one token for the given session, or refuse the turn.
    pub fn check(&self, key: &str) -> Result<(), RateLimitError> {
        let now = Instant::now();
        let mut buckets = self.buckets.lock();

        // Drop buckets that have fully refilled; they carry no state.
        buckets.retain(|_, b| {
            b.tokens + b.last_refill.elapsed().as_secs_f64() * self.rate < self.burst
        });

        let bucket = buckets.entry(key.to_string()).or_insert(Bucket {
            tokens: self.burst,
            last_refill: now,
        });

        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.burst);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Ok(())
        } else {
            Err(RateLimitError)
        }
    }
}
