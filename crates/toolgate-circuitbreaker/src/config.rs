//! Configuration for the circuit breaker registry.

use crate::events::CircuitBreakerEvent;
use std::time::Duration;
use toolgate_core::events::{EventListeners, FnListener};

/// Configuration shared by every provider's breaker in a registry.
///
/// A single `CircuitBreakerConfig` constructs every per-provider breaker
/// lazily, so all providers share the same trip thresholds unless a caller
/// builds a separate registry per provider.
#[derive(Clone)]
pub struct CircuitBreakerConfig {
    /// Minimum sample size in the closed-state rolling window before a trip
    /// can occur, and the number of consecutive successful probes required
    /// to close again from half-open.
    pub(crate) max_requests: u64,
    /// Length of the rolling window used while closed.
    pub(crate) interval: Duration,
    /// Cooldown after tripping open before a half-open probe is permitted.
    pub(crate) timeout: Duration,
    /// Failure fraction within the window that trips the breaker open.
    pub(crate) failure_ratio: f64,
    /// Name used in events, metrics, and logs (usually the provider name).
    pub(crate) name: String,
    pub(crate) event_listeners: EventListeners<CircuitBreakerEvent>,
}

impl CircuitBreakerConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }
}

/// Builder for [`CircuitBreakerConfig`].
pub struct CircuitBreakerConfigBuilder {
    max_requests: u64,
    interval: Duration,
    timeout: Duration,
    failure_ratio: f64,
    name: String,
    event_listeners: EventListeners<CircuitBreakerEvent>,
}

impl CircuitBreakerConfigBuilder {
    pub fn new() -> Self {
        Self {
            max_requests: 5,
            interval: Duration::from_secs(60),
            timeout: Duration::from_secs(30),
            failure_ratio: 0.6,
            name: "circuit-breaker".to_string(),
            event_listeners: EventListeners::new(),
        }
    }

    /// Default: 5
    pub fn max_requests(mut self, max_requests: u64) -> Self {
        self.max_requests = max_requests;
        self
    }

    /// Default: 60s
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Default: 30s
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Default: 0.6
    pub fn failure_ratio(mut self, ratio: f64) -> Self {
        self.failure_ratio = ratio;
        self
    }

    /// Default: "circuit-breaker"
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked on every state transition, for any
    /// provider in the registry.
    pub fn on_state_transition<F>(mut self, f: F) -> Self
    where
        F: Fn(crate::circuit::CircuitState, crate::circuit::CircuitState) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CircuitBreakerEvent::StateTransition {
                from_state,
                to_state,
                ..
            } = event
            {
                f(*from_state, *to_state);
            }
        }));
        self
    }

    /// Builds a [`crate::CircuitBreakerRegistry`] from this configuration.
    pub fn build(self) -> crate::CircuitBreakerRegistry {
        let config = CircuitBreakerConfig {
            max_requests: self.max_requests,
            interval: self.interval,
            timeout: self.timeout,
            failure_ratio: self.failure_ratio,
            name: self.name,
            event_listeners: self.event_listeners,
        };
        crate::CircuitBreakerRegistry::new(config)
    }
}

impl Default for CircuitBreakerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
