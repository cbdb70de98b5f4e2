//! QuickNode rate limit presets
//!
//! QuickNode caps requests per second by plan tier.
//!
//! Reference: https://www.quicknode.com/docs

use crate::token_bucket::TokenBucket;

/// QuickNode core plan limits
///
/// - 100 requests per second
pub fn core_plan_limits() -> TokenBucket {
    TokenBucket::builder().capacity(100).rate_per_second(100.0).build()
}

/// QuickNode pro plan limits
///
/// - 200 requests per second
pub fn pro_plan_limits() -> TokenBucket {
    TokenBucket::builder().capacity(200).rate_per_second(200.0).build()
}
