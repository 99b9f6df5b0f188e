//! Error types for the circuit breaker registry.

/// Errors that can occur when executing a call through a provider's breaker.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CircuitBreakerError {
    /// The named provider's breaker is open; the closure was never entered.
    #[error("circuit open for provider '{provider}'")]
    Open {
        /// Name of the provider whose breaker rejected the call.
        provider: String,
    },
}

impl CircuitBreakerError {
    /// Returns `true` for an open-circuit rejection.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, CircuitBreakerError::Open { .. })
    }
}

impl From<CircuitBreakerError> for toolgate_core::GatewayError {
    fn from(err: CircuitBreakerError) -> Self {
        match err {
            CircuitBreakerError::Open { provider } => {
                toolgate_core::GatewayError::CircuitOpen { provider }
            }
        }
    }
}
