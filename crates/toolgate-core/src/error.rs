//! The error type shared by every toolgate crate.
//!
//! Each pattern crate (bulkhead, circuit breaker, rate limiter, ...) defines
//! its own narrow error enum for its own unit tests, but every public
//! boundary in the workspace converts into [`GatewayError`] so a caller never
//! has to match on more than one error type, and so the dispatch adapter can
//! return a single `Result<_, GatewayError>` regardless of which component
//! rejected the call.

use std::fmt;

/// The kinds of failure the gateway core can surface to a caller.
///
/// Retriable kinds (`Overloaded`, `CircuitOpen`, `RateLimited`, `Timeout`)
/// are safe for a caller to retry; the core itself never retries a dispatch
/// on their behalf. `ProviderError` wraps the provider's own error verbatim.
#[derive(Debug)]
pub enum GatewayError {
    /// The tool, provider, or token could not be found.
    NotFound(String),
    /// The caller is not permitted to act on this resource.
    Forbidden(String),
    /// The bulkhead queue is full; the call was rejected without reaching
    /// the provider.
    Overloaded,
    /// The provider's circuit breaker is open.
    CircuitOpen {
        /// Name of the provider whose breaker is open.
        provider: String,
    },
    /// The tenant has exhausted its rate limit budget.
    RateLimited {
        /// Seconds until the bucket is expected to admit another request.
        retry_after_secs: Option<f64>,
    },
    /// Input failed validation (including a detected injection attempt).
    InvalidInput(String),
    /// The supplied credential is invalid, expired, or inactive.
    AuthenticationFailed(String),
    /// The provider itself returned an error executing the operation.
    ProviderError {
        /// Name of the provider that raised the error.
        provider: String,
        /// The provider's own error, preserved verbatim.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A deadline was exceeded (context cancellation or discovery timeout).
    Timeout,
    /// An unexpected failure, including a caught panic at the executor
    /// boundary.
    Internal(String),
}

impl GatewayError {
    /// Returns `true` for errors a caller may safely retry.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            GatewayError::Overloaded
                | GatewayError::CircuitOpen { .. }
                | GatewayError::RateLimited { .. }
                | GatewayError::Timeout
        )
    }

    /// Short, stable label used as a metric/log field (`outcome`, `error_kind`).
    pub fn kind_label(&self) -> &'static str {
        match self {
            GatewayError::NotFound(_) => "not_found",
            GatewayError::Forbidden(_) => "forbidden",
            GatewayError::Overloaded => "overloaded",
            GatewayError::CircuitOpen { .. } => "circuit_open",
            GatewayError::RateLimited { .. } => "rate_limited",
            GatewayError::InvalidInput(_) => "invalid_input",
            GatewayError::AuthenticationFailed(_) => "authentication_failed",
            GatewayError::ProviderError { .. } => "provider_error",
            GatewayError::Timeout => "timeout",
            GatewayError::Internal(_) => "internal",
        }
    }

    /// Wraps a provider-originated error, preserving it as the cause chain.
    pub fn provider_error(
        provider: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        GatewayError::ProviderError {
            provider: provider.into(),
            source: Box::new(source),
        }
    }

    /// Converts a caught panic payload into an `Internal` error, matching
    /// the boundary contract in spec §7 ("panics must be caught at the
    /// executor boundary and converted to `Internal`").
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&'static str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic with non-string payload".to_string());
        GatewayError::Internal(message)
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::NotFound(what) => write!(f, "not found: {what}"),
            GatewayError::Forbidden(why) => write!(f, "forbidden: {why}"),
            GatewayError::Overloaded => write!(f, "bulkhead queue full"),
            GatewayError::CircuitOpen { provider } => {
                write!(f, "circuit open for provider '{provider}'")
            }
            GatewayError::RateLimited { retry_after_secs } => match retry_after_secs {
                Some(secs) => write!(f, "rate limited, retry after {secs:.2}s"),
                None => write!(f, "rate limited"),
            },
            GatewayError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            GatewayError::AuthenticationFailed(msg) => write!(f, "authentication failed: {msg}"),
            GatewayError::ProviderError { provider, source } => {
                write!(f, "provider '{provider}' error: {source}")
            }
            GatewayError::Timeout => write!(f, "timed out"),
            GatewayError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GatewayError::ProviderError { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
