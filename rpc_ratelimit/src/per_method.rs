use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;

use crate::clock::Clock;
use crate::limiter::RateLimiter;
use crate::token_bucket::TokenBucket;

/// Per-method rate limiter
///
/// Maps RPC method names to their own token buckets so expensive calls can
/// be paced independently of cheap ones. Admission is fail-open:
/// unregistered methods are never throttled.
pub struct PerMethodLimiter {
    /// Registered buckets; registration and lookup share this guard so an
    /// entry is either fully visible or absent
    buckets: Mutex<HashMap<String, TokenBucket>>,

    /// Time source handed to each registered bucket
    clock: Clock,
}

impl PerMethodLimiter {
    /// Create a new per-method limiter with no methods registered
    pub fn new() -> Self {
        Self::with_clock(Clock::monotonic())
    }

    pub(crate) fn with_clock(clock: Clock) -> Self {
        Self { buckets: Mutex::new(HashMap::new()), clock }
    }

    /// Register a method with its own capacity and refill rate
    ///
    /// Re-registering a method replaces its bucket, resetting any
    /// accumulated state. Last writer wins.
    pub fn register_method(&self, method: impl Into<String>, capacity: u32, refill_rate: f64) {
        let method = method.into();
        let bucket = TokenBucket::with_clock(capacity, refill_rate, self.clock.clone());

        debug!(method = %method, capacity, refill_rate, "registered method rate limit");
        self.buckets.lock().insert(method, bucket);
    }

    /// Try to admit a call to `method`
    ///
    /// Unregistered methods are admitted unconditionally.
    pub fn try_acquire(&self, method: &str) -> bool {
        match self.buckets.lock().get(method) {
            Some(bucket) => bucket.try_acquire_one(),
            None => true,
        }
    }

    /// Get the wait hint for `method` in milliseconds
    ///
    /// Unregistered methods are admitted immediately, so their hint is 0.
    pub fn time_until_available_ms(&self, method: &str) -> u64 {
        match self.buckets.lock().get(method) {
            Some(bucket) => bucket.time_until_available_ms(),
            None => 0,
        }
    }

    /// Number of registered methods
    pub fn method_count(&self) -> usize {
        self.buckets.lock().len()
    }
}

impl Default for PerMethodLimiter {
    fn default() -> Self {
        Self::new()
    }
}
