//! Pre-configured rate limiters for hosted Ethereum RPC providers
//!
//! This module provides factory functions that create limiters matched to
//! the published rate limits of the RPC services this client is typically
//! pointed at. Published limits change and vary by plan; treat these as
//! sane starting points and override from configuration when a plan
//! differs.
//!
//! # Supported providers
//!
//! - **Infura**: 100 requests/second standard plan
//! - **Alchemy**: 300 requests/second, compute-unit metered
//! - **QuickNode**: 100-200 requests/second depending on plan
//! - **Etherscan**: 5 calls/second free tier

pub mod alchemy;
pub mod etherscan;
pub mod infura;
pub mod quicknode;

use crate::per_method::PerMethodLimiter;

/// Per-method defaults for a general-purpose Ethereum JSON-RPC endpoint
///
/// Read-heavy methods get generous buckets; transaction submission is
/// paced hardest.
pub fn default_method_limits() -> PerMethodLimiter {
    let limiter = PerMethodLimiter::new();
    limiter.register_method("eth_call", 100, 50.0);
    limiter.register_method("eth_getBalance", 50, 20.0);
    limiter.register_method("eth_sendRawTransaction", 10, 5.0);
    limiter
}
