use thiserror::Error;

/// Result type for rate limiting operations
pub type Result<T> = std::result::Result<T, RateLimitError>;

/// Errors produced while building limiters from configuration
///
/// Admission denial is not an error: `try_acquire` reports it as an
/// ordinary `false`.
#[derive(Error, Debug)]
pub enum RateLimitError {
    #[error("invalid rate limiter configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse rate limit configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
