pub mod adaptive;
pub mod backoff;
pub mod config;
pub mod error;
pub mod limiter;
pub mod per_method;
pub mod providers;
pub mod sliding_window;
pub mod token_bucket;
mod clock;

pub use adaptive::AdaptiveRateLimiter;
pub use backoff::ExponentialBackoff;
pub use config::RateLimitConfig;
pub use error::RateLimitError;
pub use error::Result;
pub use limiter::RateLimiter;
pub use per_method::PerMethodLimiter;
pub use sliding_window::SlidingWindow;
pub use sliding_window::SlidingWindowBuilder;
pub use token_bucket::TokenBucket;
pub use token_bucket::TokenBucketBuilder;
