//! Errors raised while resolving a caller's permissions against a provider.

use std::fmt;
use toolgate_core::GatewayError;

#[derive(Debug, thiserror::Error)]
pub enum PermissionError {
    #[error("permission discovery against provider '{provider}' failed: {reason}")]
    DiscoveryFailed { provider: String, reason: String },
    #[error("permission discovery against provider '{provider}' timed out")]
    Timeout { provider: String },
}

/// Preserves a discovery failure's text as a `std::error::Error` so it can
/// ride inside `GatewayError::ProviderError`'s boxed `source`.
#[derive(Debug)]
struct DiscoveryFailureCause(String);

impl fmt::Display for DiscoveryFailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for DiscoveryFailureCause {}

impl From<PermissionError> for GatewayError {
    fn from(err: PermissionError) -> Self {
        match err {
            PermissionError::DiscoveryFailed { provider, reason } => {
                GatewayError::provider_error(provider, DiscoveryFailureCause(reason))
            }
            PermissionError::Timeout { .. } => GatewayError::Timeout,
        }
    }
}
