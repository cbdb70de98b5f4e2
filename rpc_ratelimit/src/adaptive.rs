use parking_lot::Mutex;
use tracing::debug;
use tracing::trace;

use crate::clock::Clock;
use crate::token_bucket::TokenBucket;

/// Adaptive rate limiter
///
/// Tunes a target request rate from caller feedback: each success nudges
/// the rate up 10%, each rate-limit rejection halves it, and the result is
/// always clamped to the configured band. Adjustment is multiplicative
/// only, so convergence is geometric in both directions.
pub struct AdaptiveRateLimiter {
    /// Target rate in requests per second
    current_rate: Mutex<f64>,

    /// Lower clamp on the rate
    min_rate: f64,

    /// Upper clamp on the rate
    max_rate: f64,

    /// Time source handed to snapshot buckets
    clock: Clock,
}

impl AdaptiveRateLimiter {
    /// Multiplier applied on success (10% increase)
    pub const INCREASE_FACTOR: f64 = 1.1;

    /// Multiplier applied on a rate-limit error (halve)
    pub const DECREASE_FACTOR: f64 = 0.5;

    /// Create a new adaptive rate limiter
    pub fn new(initial_rate: f64, min_rate: f64, max_rate: f64) -> Self {
        Self::with_clock(initial_rate, min_rate, max_rate, Clock::monotonic())
    }

    pub(crate) fn with_clock(initial_rate: f64, min_rate: f64, max_rate: f64, clock: Clock) -> Self {
        assert!(min_rate > 0.0, "Minimum rate must be greater than 0");
        assert!(
            min_rate <= initial_rate && initial_rate <= max_rate,
            "Rates must satisfy min <= initial <= max"
        );

        Self { current_rate: Mutex::new(initial_rate), min_rate, max_rate, clock }
    }

    /// Record a successful request, increasing the target rate
    pub fn record_success(&self) {
        let mut rate = self.current_rate.lock();
        *rate = (*rate * Self::INCREASE_FACTOR).min(self.max_rate);
        trace!(rate = *rate, "adaptive rate increased");
    }

    /// Record a rate-limit rejection from the endpoint, halving the rate
    pub fn record_rate_limit_error(&self) {
        let mut rate = self.current_rate.lock();
        *rate = (*rate * Self::DECREASE_FACTOR).max(self.min_rate);
        debug!(rate = *rate, "adaptive rate decreased");
    }

    /// Get the current target rate in requests per second
    pub fn current_rate(&self) -> f64 {
        *self.current_rate.lock()
    }

    /// Mint a token bucket matching the current target rate
    ///
    /// The bucket is a derived snapshot, not a live view: consuming its
    /// tokens never feeds back into this limiter, and later rate changes do
    /// not affect buckets already minted. Capacity is the whole-token floor
    /// of the rate, with a minimum of one.
    pub fn snapshot_bucket(&self) -> TokenBucket {
        let rate = self.current_rate();
        let capacity = (rate.floor() as u32).max(1);
        TokenBucket::with_clock(capacity, rate, self.clock.clone())
    }
}
