//! Infura rate limit presets
//!
//! Infura meters requests per second, with daily credit quotas on top that
//! this layer does not track.
//!
//! Reference: https://docs.infura.io/api/learn/rate-limits

use crate::token_bucket::TokenBucket;

/// Infura standard plan limits
///
/// - 100 requests per second, bursting up to the same
pub fn standard_limits() -> TokenBucket {
    TokenBucket::builder().capacity(100).rate_per_second(100.0).build()
}

/// Conservative Infura limits
///
/// Half the published rate, leaving headroom for other consumers sharing
/// the same API key.
pub fn conservative_limits() -> TokenBucket {
    TokenBucket::builder().capacity(50).rate_per_second(50.0).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limiter::RateLimiter;

    #[test]
    fn test_standard_limits() {
        let limiter = standard_limits();

        assert_eq!(limiter.capacity(), 100);
        assert!(limiter.try_acquire(10));
    }

    #[test]
    fn test_conservative_limits() {
        let limiter = conservative_limits();

        assert_eq!(limiter.capacity(), 50);
        assert!(limiter.capacity() < standard_limits().capacity());
    }
}
