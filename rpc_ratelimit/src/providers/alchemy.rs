//! Alchemy rate limit presets
//!
//! Alchemy meters throughput in compute units rather than raw requests;
//! each method has a fixed CU cost and plans cap CU per second.
//!
//! Reference: https://docs.alchemy.com/reference/throughput

use crate::token_bucket::TokenBucket;

/// Alchemy request-rate limits
///
/// - 300 requests per second on the growth plan
pub fn growth_limits() -> TokenBucket {
    TokenBucket::builder().capacity(300).rate_per_second(300.0).build()
}

/// Alchemy compute-unit limits
///
/// - 3000 compute units per second; acquire with the method's CU cost as
///   the permit count
pub fn compute_unit_limits() -> TokenBucket {
    TokenBucket::builder().capacity(3000).rate_per_second(3000.0).build()
}
