use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::adaptive::AdaptiveRateLimiter;
use crate::backoff::ExponentialBackoff;
use crate::error::RateLimitError;
use crate::error::Result;
use crate::limiter::RateLimiter;
use crate::per_method::PerMethodLimiter;
use crate::sliding_window::SlidingWindow;
use crate::token_bucket::TokenBucket;

/// Admission policy for an endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LimiterConfig {
    /// Continuously refilling token bucket with burst capacity
    TokenBucket {
        /// Maximum tokens (burst capacity)
        capacity: u32,

        /// Tokens added per second
        refill_rate: f64,
    },

    /// Hard cap on requests inside a trailing window
    SlidingWindow {
        /// Maximum requests in the window
        max_requests: u32,

        /// Window length in seconds
        window_secs: f64,
    },
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self::TokenBucket { capacity: 100, refill_rate: 100.0 }
    }
}

impl LimiterConfig {
    /// Check the parameters the constructors would reject
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::TokenBucket { capacity, refill_rate } => {
                if capacity < 1 {
                    return Err(RateLimitError::InvalidConfig(
                        "token bucket capacity must be at least 1".into(),
                    ));
                }
                if !(refill_rate > 0.0) || !refill_rate.is_finite() {
                    return Err(RateLimitError::InvalidConfig(
                        "token bucket refill rate must be a positive number".into(),
                    ));
                }
            }
            Self::SlidingWindow { max_requests, window_secs } => {
                if max_requests < 1 {
                    return Err(RateLimitError::InvalidConfig(
                        "sliding window max requests must be at least 1".into(),
                    ));
                }
                if !(window_secs > 0.0) || !window_secs.is_finite() {
                    return Err(RateLimitError::InvalidConfig(
                        "sliding window duration must be a positive number of seconds".into(),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Build the configured limiter behind the shared admission seam
    pub fn build(&self) -> Result<Box<dyn RateLimiter>> {
        self.validate()?;

        let limiter: Box<dyn RateLimiter> = match *self {
            Self::TokenBucket { capacity, refill_rate } => Box::new(TokenBucket::new(capacity, refill_rate)),
            Self::SlidingWindow { max_requests, window_secs } => {
                Box::new(SlidingWindow::new(max_requests, Duration::from_secs_f64(window_secs)))
            }
        };

        Ok(limiter)
    }
}

/// Retry backoff schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay before the first retry in milliseconds
    pub initial_delay_ms: u64,

    /// Upper clamp on the retry delay in milliseconds
    pub max_delay_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self { initial_delay_ms: 100, max_delay_ms: 30_000 }
    }
}

impl BackoffConfig {
    /// Check the parameters the constructor would reject
    pub fn validate(&self) -> Result<()> {
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(RateLimitError::InvalidConfig(
                "backoff initial delay must not exceed max delay".into(),
            ));
        }

        Ok(())
    }

    /// Build the backoff sequence
    pub fn build(&self) -> Result<ExponentialBackoff> {
        self.validate()?;
        Ok(ExponentialBackoff::new(self.initial_delay_ms, self.max_delay_ms))
    }
}

/// Adaptive pacing band
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveConfig {
    /// Starting rate in requests per second
    pub initial_rate: f64,

    /// Lower clamp on the rate
    pub min_rate: f64,

    /// Upper clamp on the rate
    pub max_rate: f64,
}

impl AdaptiveConfig {
    /// Check the parameters the constructor would reject
    pub fn validate(&self) -> Result<()> {
        if !(self.min_rate > 0.0) || !self.min_rate.is_finite() {
            return Err(RateLimitError::InvalidConfig(
                "adaptive min rate must be a positive number".into(),
            ));
        }
        if !self.initial_rate.is_finite() || !self.max_rate.is_finite() {
            return Err(RateLimitError::InvalidConfig("adaptive rates must be finite".into()));
        }
        if self.min_rate > self.initial_rate || self.initial_rate > self.max_rate {
            return Err(RateLimitError::InvalidConfig(
                "adaptive rates must satisfy min <= initial <= max".into(),
            ));
        }

        Ok(())
    }

    /// Build the adaptive limiter
    pub fn build(&self) -> Result<AdaptiveRateLimiter> {
        self.validate()?;
        Ok(AdaptiveRateLimiter::new(self.initial_rate, self.min_rate, self.max_rate))
    }
}

/// Bucket parameters for one method
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodLimit {
    /// Token bucket capacity for the method
    pub capacity: u32,

    /// Tokens added per second
    pub refill_rate: f64,
}

/// Top-level rate limiting configuration
///
/// ```toml
/// [limiter]
/// kind = "token_bucket"
/// capacity = 100
/// refill_rate = 100.0
///
/// [backoff]
/// initial_delay_ms = 100
/// max_delay_ms = 30000
///
/// [adaptive]
/// initial_rate = 50.0
/// min_rate = 5.0
/// max_rate = 100.0
///
/// [methods.eth_call]
/// capacity = 100
/// refill_rate = 50.0
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Admission policy for the endpoint as a whole
    pub limiter: LimiterConfig,

    /// Retry backoff schedule
    pub backoff: BackoffConfig,

    /// Adaptive pacing; absent means the rate is fixed
    pub adaptive: Option<AdaptiveConfig>,

    /// Per-method overrides, keyed by RPC method name
    pub methods: BTreeMap<String, MethodLimit>,
}

impl RateLimitConfig {
    /// Parse and validate a TOML configuration
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section for parameters the constructors would reject
    pub fn validate(&self) -> Result<()> {
        self.limiter.validate()?;
        self.backoff.validate()?;

        if let Some(adaptive) = &self.adaptive {
            adaptive.validate()?;
        }

        for (method, limit) in &self.methods {
            if limit.capacity < 1 {
                return Err(RateLimitError::InvalidConfig(format!(
                    "method {method}: capacity must be at least 1"
                )));
            }
            if !(limit.refill_rate > 0.0) || !limit.refill_rate.is_finite() {
                return Err(RateLimitError::InvalidConfig(format!(
                    "method {method}: refill rate must be a positive number"
                )));
            }
        }

        Ok(())
    }

    /// Build the endpoint-wide limiter
    pub fn build_limiter(&self) -> Result<Box<dyn RateLimiter>> {
        self.limiter.build()
    }

    /// Build the retry backoff sequence
    pub fn build_backoff(&self) -> Result<ExponentialBackoff> {
        self.backoff.build()
    }

    /// Build the adaptive limiter, if one is configured
    pub fn build_adaptive(&self) -> Result<Option<AdaptiveRateLimiter>> {
        self.adaptive.as_ref().map(AdaptiveConfig::build).transpose()
    }

    /// Build the per-method registry with every configured method registered
    pub fn build_method_limiter(&self) -> Result<PerMethodLimiter> {
        self.validate()?;

        let limiter = PerMethodLimiter::new();
        for (method, limit) in &self.methods {
            limiter.register_method(method.clone(), limit.capacity, limit.refill_rate);
        }

        Ok(limiter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
        [limiter]
        kind = "sliding_window"
        max_requests = 5
        window_secs = 1.0

        [backoff]
        initial_delay_ms = 100
        max_delay_ms = 30000

        [adaptive]
        initial_rate = 50.0
        min_rate = 5.0
        max_rate = 100.0

        [methods.eth_call]
        capacity = 100
        refill_rate = 50.0

        [methods.eth_sendRawTransaction]
        capacity = 10
        refill_rate = 5.0
    "#;

    #[test]
    fn test_defaults_are_valid() {
        let config = RateLimitConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.build_limiter().is_ok());
        assert!(config.build_adaptive().unwrap().is_none());
    }

    #[test]
    fn test_parse_full_example() {
        let config = RateLimitConfig::from_toml_str(EXAMPLE).unwrap();

        assert!(matches!(config.limiter, LimiterConfig::SlidingWindow { max_requests: 5, .. }));
        assert_eq!(config.backoff.max_delay_ms, 30_000);
        assert_eq!(config.methods.len(), 2);
    }

    #[test]
    fn test_built_limiter_enforces_policy() {
        let config = RateLimitConfig::from_toml_str(EXAMPLE).unwrap();
        let limiter = config.build_limiter().unwrap();

        for _ in 0..5 {
            assert!(limiter.try_acquire_one());
        }
        assert!(!limiter.try_acquire_one());
    }

    #[test]
    fn test_built_method_limiter_registers_methods() {
        let config = RateLimitConfig::from_toml_str(EXAMPLE).unwrap();
        let limiter = config.build_method_limiter().unwrap();

        assert_eq!(limiter.method_count(), 2);
        assert!(limiter.try_acquire("eth_call"));
        assert!(limiter.try_acquire("not_configured"));
    }

    #[test]
    fn test_built_adaptive_uses_band() {
        let config = RateLimitConfig::from_toml_str(EXAMPLE).unwrap();
        let adaptive = config.build_adaptive().unwrap().unwrap();

        assert!((adaptive.current_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let result = RateLimitConfig::from_toml_str("limiter = not toml");
        assert!(matches!(result, Err(RateLimitError::Parse(_))));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let toml = r#"
            [limiter]
            kind = "token_bucket"
            capacity = 0
            refill_rate = 10.0
        "#;
        let result = RateLimitConfig::from_toml_str(toml);
        assert!(matches!(result, Err(RateLimitError::InvalidConfig(_))));
    }

    #[test]
    fn test_inverted_backoff_rejected() {
        let config = RateLimitConfig {
            backoff: BackoffConfig { initial_delay_ms: 1000, max_delay_ms: 100 },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(RateLimitError::InvalidConfig(_))));
    }

    #[test]
    fn test_adaptive_band_violation_rejected() {
        let adaptive = AdaptiveConfig { initial_rate: 200.0, min_rate: 5.0, max_rate: 100.0 };
        assert!(matches!(adaptive.validate(), Err(RateLimitError::InvalidConfig(_))));
    }

    #[test]
    fn test_bad_method_limit_rejected() {
        let toml = r#"
            [methods.eth_call]
            capacity = 10
            refill_rate = -1.0
        "#;
        let result = RateLimitConfig::from_toml_str(toml);
        assert!(matches!(result, Err(RateLimitError::InvalidConfig(_))));
    }
}
