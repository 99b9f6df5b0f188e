//! Errors surfaced from a coalesced call.

use std::sync::Arc;
use toolgate_core::GatewayError;

/// A displayable stand-in for a provider error that can no longer be moved
/// out of the shared `Arc` it was broadcast through.
#[derive(Debug)]
struct ShadowProviderError(String);

impl std::fmt::Display for ShadowProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ShadowProviderError {}

/// Error from [`crate::Coalescer::coalesce`].
///
/// The leader's own error is wrapped in an `Arc` because it is broadcast to
/// every observer sharing the key; [`CoalesceError::into_gateway_error`]
/// reconstructs an equivalent, independently owned [`GatewayError`] for each
/// observer.
#[derive(Debug, Clone)]
pub enum CoalesceError {
    /// The caller's cancellation token fired while waiting on the leader.
    Cancelled,
    /// The leader's closure returned this error.
    Failed(Arc<GatewayError>),
    /// The leader task was dropped (e.g. panicked) before broadcasting a
    /// result.
    LeaderLost,
}

impl CoalesceError {
    /// Reconstructs an owned [`GatewayError`] equivalent to the shared one,
    /// since [`GatewayError`] itself does not implement `Clone`.
    pub fn into_gateway_error(self) -> GatewayError {
        match self {
            CoalesceError::Cancelled => GatewayError::Timeout,
            CoalesceError::LeaderLost => {
                GatewayError::Internal("coalescer leader task was lost".to_string())
            }
            CoalesceError::Failed(err) => reconstruct(&err),
        }
    }
}

fn reconstruct(err: &GatewayError) -> GatewayError {
    match err {
        GatewayError::NotFound(what) => GatewayError::NotFound(what.clone()),
        GatewayError::Forbidden(why) => GatewayError::Forbidden(why.clone()),
        GatewayError::Overloaded => GatewayError::Overloaded,
        GatewayError::CircuitOpen { provider } => GatewayError::CircuitOpen {
            provider: provider.clone(),
        },
        GatewayError::RateLimited { retry_after_secs } => GatewayError::RateLimited {
            retry_after_secs: *retry_after_secs,
        },
        GatewayError::InvalidInput(msg) => GatewayError::InvalidInput(msg.clone()),
        GatewayError::AuthenticationFailed(msg) => {
            GatewayError::AuthenticationFailed(msg.clone())
        }
        GatewayError::ProviderError { provider, source } => GatewayError::provider_error(
            provider.clone(),
            ShadowProviderError(source.to_string()),
        ),
        GatewayError::Timeout => GatewayError::Timeout,
        GatewayError::Internal(msg) => GatewayError::Internal(msg.clone()),
    }
}

impl std::fmt::Display for CoalesceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoalesceError::Cancelled => write!(f, "coalesced call cancelled while waiting"),
            CoalesceError::LeaderLost => write!(f, "coalescer leader task was lost"),
            CoalesceError::Failed(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CoalesceError {}

impl From<CoalesceError> for GatewayError {
    fn from(err: CoalesceError) -> Self {
        err.into_gateway_error()
    }
}
