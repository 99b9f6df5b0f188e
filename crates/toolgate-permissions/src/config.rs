//! Configuration for the permission cache and discovery mode.

use crate::events::PermissionEvent;
use std::time::Duration;
use toolgate_core::events::{EventListeners, FnListener};

/// Whether `GetOrganizationTools` discovers permissions synchronously
/// (blocking the caller on a cache miss) or asynchronously (provisionally
/// allowing while discovery runs detached).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryMode {
    Sync,
    Async,
}

pub struct PermissionConfig {
    pub cache_ttl: Duration,
    pub discovery_mode: DiscoveryMode,
    /// Fixed deadline for async discovery; not cancelled by the caller's
    /// own context per spec §5.
    pub discovery_timeout: Duration,
    pub(crate) event_listeners: EventListeners<PermissionEvent>,
}

impl Default for PermissionConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
            discovery_mode: DiscoveryMode::Sync,
            discovery_timeout: Duration::from_secs(30),
            event_listeners: EventListeners::new(),
        }
    }
}

pub struct PermissionConfigBuilder {
    config: PermissionConfig,
}

impl Default for PermissionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: PermissionConfig::default(),
        }
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.cache_ttl = ttl;
        self
    }

    pub fn discovery_mode(mut self, mode: DiscoveryMode) -> Self {
        self.config.discovery_mode = mode;
        self
    }

    pub fn discovery_timeout(mut self, timeout: Duration) -> Self {
        self.config.discovery_timeout = timeout;
        self
    }

    /// Registers a callback invoked whenever discovery fails or times out
    /// and the caller defaults to allow.
    pub fn on_discovery_failed<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &str) + Send + Sync + 'static,
    {
        self.config
            .event_listeners
            .add(FnListener::new(move |event| {
                if let PermissionEvent::DiscoveryFailed {
                    provider, reason, ..
                } = event
                {
                    f(provider, reason);
                }
            }));
        self
    }

    pub fn build(self) -> crate::PermissionService {
        crate::PermissionService::new(self.config)
    }
}

impl PermissionConfig {
    pub fn builder() -> PermissionConfigBuilder {
        PermissionConfigBuilder::new()
    }
}
