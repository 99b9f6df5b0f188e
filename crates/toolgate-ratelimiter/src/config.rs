//! Configuration for the token bucket rate limiter.

use crate::events::RateLimiterEvent;
use toolgate_core::events::{EventListeners, FnListener};

/// Configuration shared by every tenant's bucket in a [`crate::RateLimiterRegistry`].
pub struct RateLimiterConfig {
    pub(crate) requests_per_minute: f64,
    pub(crate) burst_size: f64,
    /// Idle duration after which a tenant's bucket is eligible for GC.
    pub(crate) idle_retention: std::time::Duration,
    pub(crate) event_listeners: EventListeners<RateLimiterEvent>,
    pub(crate) name: String,
}

/// Builder for [`RateLimiterConfig`].
pub struct RateLimiterConfigBuilder {
    requests_per_minute: f64,
    burst_size: f64,
    idle_retention: std::time::Duration,
    event_listeners: EventListeners<RateLimiterEvent>,
    name: String,
}

impl Default for RateLimiterConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiterConfigBuilder {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - requests_per_minute: 60
    /// - burst_size: 10
    /// - idle_retention: 10 minutes
    /// - name: `"rate-limiter"`
    pub fn new() -> Self {
        Self {
            requests_per_minute: 60.0,
            burst_size: 10.0,
            idle_retention: std::time::Duration::from_secs(600),
            event_listeners: EventListeners::new(),
            name: "rate-limiter".to_string(),
        }
    }

    /// Steady-state refill rate, in tokens per minute.
    pub fn requests_per_minute(mut self, rpm: f64) -> Self {
        self.requests_per_minute = rpm;
        self
    }

    /// Maximum number of tokens a bucket can accumulate.
    pub fn burst_size(mut self, burst: f64) -> Self {
        self.burst_size = burst;
        self
    }

    /// How long a tenant's bucket survives with no checks before the
    /// background GC sweep reclaims it.
    pub fn idle_retention(mut self, retention: std::time::Duration) -> Self {
        self.idle_retention = retention;
        self
    }

    /// Sets the name for this rate limiter instance (used in events).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked whenever a tenant is admitted.
    pub fn on_permit_acquired<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, f64) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RateLimiterEvent::PermitAcquired {
                tenant,
                tokens_remaining,
                ..
            } = event
            {
                f(tenant, *tokens_remaining);
            }
        }));
        self
    }

    /// Registers a callback invoked whenever a tenant is rejected.
    pub fn on_permit_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, f64) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RateLimiterEvent::PermitRejected {
                tenant,
                retry_after_secs,
                ..
            } = event
            {
                f(tenant, *retry_after_secs);
            }
        }));
        self
    }

    /// Builds a [`crate::RateLimiterRegistry`] from this configuration.
    pub fn build(self) -> crate::RateLimiterRegistry {
        let config = RateLimiterConfig {
            requests_per_minute: self.requests_per_minute,
            burst_size: self.burst_size,
            idle_retention: self.idle_retention,
            event_listeners: self.event_listeners,
            name: self.name,
        };
        crate::RateLimiterRegistry::new(config)
    }
}

impl RateLimiterConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> RateLimiterConfigBuilder {
        RateLimiterConfigBuilder::new()
    }
}
