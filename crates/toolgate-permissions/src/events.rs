//! Events emitted by the permission cache and discoverer.

use std::time::Instant;
use toolgate_core::ResilienceEvent;

#[derive(Debug, Clone)]
pub enum PermissionEvent {
    /// A cache lookup found a non-expired, non-empty entry.
    CacheHit { provider: String, timestamp: Instant },
    /// A cache lookup missed and discovery was invoked.
    CacheMiss { provider: String, timestamp: Instant },
    /// Discovery completed and the result was written through to the cache.
    DiscoveryCompleted {
        provider: String,
        scope_count: usize,
        timestamp: Instant,
    },
    /// Discovery failed or timed out; the caller defaulted to allow.
    DiscoveryFailed {
        provider: String,
        reason: String,
        timestamp: Instant,
    },
}

impl ResilienceEvent for PermissionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PermissionEvent::CacheHit { .. } => "cache_hit",
            PermissionEvent::CacheMiss { .. } => "cache_miss",
            PermissionEvent::DiscoveryCompleted { .. } => "discovery_completed",
            PermissionEvent::DiscoveryFailed { .. } => "discovery_failed",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            PermissionEvent::CacheHit { timestamp, .. }
            | PermissionEvent::CacheMiss { timestamp, .. }
            | PermissionEvent::DiscoveryCompleted { timestamp, .. }
            | PermissionEvent::DiscoveryFailed { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            PermissionEvent::CacheHit { provider, .. }
            | PermissionEvent::CacheMiss { provider, .. }
            | PermissionEvent::DiscoveryCompleted { provider, .. }
            | PermissionEvent::DiscoveryFailed { provider, .. } => provider,
        }
    }
}
