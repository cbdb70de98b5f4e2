//! Etherscan rate limit presets
//!
//! Etherscan enforces a strict calls-per-second cap, so the sliding window
//! policy fits better than a bursting bucket.
//!
//! Reference: https://docs.etherscan.io/support/rate-limits

use crate::sliding_window::SlidingWindow;

/// Etherscan free tier limits
///
/// - 5 calls per second, no bursting
pub fn free_tier_limits() -> SlidingWindow {
    SlidingWindow::per_second(5)
}

/// Etherscan pro tier limits
///
/// - 10 calls per second
pub fn pro_tier_limits() -> SlidingWindow {
    SlidingWindow::per_second(10)
}
