use parking_lot::Mutex;
use tracing::trace;

use crate::clock::Clock;
use crate::limiter::RateLimiter;

/// Token bucket rate limiter
///
/// Tokens refill continuously at a fixed rate up to the bucket's capacity,
/// and each admitted request consumes tokens. Refill credit is truncated to
/// whole tokens: elapsed time is only banked once at least one full token
/// has accrued, so callers must not assume fractional-token accounting.
pub struct TokenBucket {
    /// Mutable counters, guarded as a unit so refill-and-decide is atomic
    state: Mutex<BucketState>,

    /// Maximum number of tokens (burst capacity)
    capacity: u32,

    /// Tokens added per second
    refill_rate: f64,

    /// Time source for refill measurements
    clock: Clock,
}

#[derive(Debug)]
struct BucketState {
    /// Currently available whole tokens
    tokens: u32,

    /// Timestamp (nanos) of the last refill that credited a token
    last_refill: u64,
}

impl TokenBucket {
    /// Create a new token bucket, full at construction
    pub fn new(capacity: u32, refill_rate: f64) -> Self {
        Self::with_clock(capacity, refill_rate, Clock::monotonic())
    }

    pub(crate) fn with_clock(capacity: u32, refill_rate: f64, clock: Clock) -> Self {
        assert!(capacity > 0, "Capacity must be greater than 0");
        assert!(refill_rate > 0.0, "Refill rate must be greater than 0");

        let now = clock.now_nanos();

        Self { state: Mutex::new(BucketState { tokens: capacity, last_refill: now }), capacity, refill_rate, clock }
    }

    /// Create a builder for configuring a token bucket
    pub fn builder() -> TokenBucketBuilder {
        TokenBucketBuilder::new()
    }

    /// Credit whole tokens for the time elapsed since the last refill
    ///
    /// `last_refill` only advances when at least one token is credited, so
    /// sub-token elapsed time keeps accumulating across calls and a
    /// fractional-rate bucket still refills at its nominal rate.
    fn refill(&self, state: &mut BucketState) {
        let now = self.clock.now_nanos();
        let elapsed = now.saturating_sub(state.last_refill);

        let elapsed_secs = elapsed as f64 / 1_000_000_000.0;
        let tokens_to_add = (elapsed_secs * self.refill_rate) as u64;

        if tokens_to_add > 0 {
            let credited = tokens_to_add.min(u64::from(self.capacity)) as u32;
            state.tokens = state.tokens.saturating_add(credited).min(self.capacity);
            state.last_refill = now;
        }
    }

    /// Get time to wait before the next single token is available (ms)
    ///
    /// Returns 0 when a token is already present. The estimate covers one
    /// token only; a request needing several may have to wait longer.
    pub fn time_until_available_ms(&self) -> u64 {
        let mut state = self.state.lock();
        self.refill(&mut state);

        if state.tokens > 0 {
            return 0;
        }

        (1000.0 / self.refill_rate).ceil() as u64
    }

    /// Tokens per second this bucket refills at
    pub fn refill_rate(&self) -> f64 {
        self.refill_rate
    }
}

impl RateLimiter for TokenBucket {
    fn try_acquire(&self, permits: u32) -> bool {
        if permits == 0 {
            return true;
        }

        let mut state = self.state.lock();
        self.refill(&mut state);

        if state.tokens >= permits {
            state.tokens -= permits;
            true
        } else {
            trace!(permits, available = state.tokens, "token bucket denied");
            false
        }
    }

    fn available(&self) -> u32 {
        let mut state = self.state.lock();
        self.refill(&mut state);
        state.tokens
    }

    fn capacity(&self) -> u32 {
        self.capacity
    }

    fn reset(&self) {
        let mut state = self.state.lock();
        state.tokens = self.capacity;
        state.last_refill = self.clock.now_nanos();
    }
}

/// Builder for configuring a token bucket rate limiter
pub struct TokenBucketBuilder {
    capacity: Option<u32>,
    rate: Option<f64>,
}

impl TokenBucketBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self { capacity: None, rate: None }
    }

    /// Set the bucket capacity (max tokens)
    pub fn capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Set the refill rate in tokens per second
    pub fn rate_per_second(mut self, rate: f64) -> Self {
        self.rate = Some(rate);
        self
    }

    /// Set rate in requests per minute
    pub fn rate_per_minute(mut self, rate: f64) -> Self {
        self.rate = Some(rate / 60.0);
        self
    }

    /// Build the token bucket
    ///
    /// # Panics
    /// Panics if capacity or rate is not set
    pub fn build(self) -> TokenBucket {
        let capacity = self.capacity.expect("Capacity must be set");
        let rate = self.rate.expect("Rate must be set");
        TokenBucket::new(capacity, rate)
    }
}

impl Default for TokenBucketBuilder {
    fn default() -> Self {
        Self::new()
    }
}
