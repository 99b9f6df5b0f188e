//! Errors for the token bucket rate limiter.

use std::fmt;

/// Errors that can occur when checking a tenant's rate limit bucket.
#[derive(Debug, Clone)]
pub enum RateLimiterError {
    /// The tenant's bucket held fewer than one token.
    RateLimited {
        /// Seconds until the bucket is expected to hold another token.
        retry_after_secs: f64,
    },
}

impl fmt::Display for RateLimiterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateLimiterError::RateLimited { retry_after_secs } => {
                write!(f, "rate limited, retry after {retry_after_secs:.2}s")
            }
        }
    }
}

impl std::error::Error for RateLimiterError {}

impl From<RateLimiterError> for toolgate_core::GatewayError {
    fn from(err: RateLimiterError) -> Self {
        match err {
            RateLimiterError::RateLimited { retry_after_secs } => {
                toolgate_core::GatewayError::RateLimited {
                    retry_after_secs: Some(retry_after_secs),
                }
            }
        }
    }
}
