//! Events emitted by the token bucket rate limiter.

use std::time::Instant;
use toolgate_core::ResilienceEvent;

/// An observable event from a tenant's token bucket.
#[derive(Debug, Clone)]
pub enum RateLimiterEvent {
    /// A request was admitted and a token was decremented.
    PermitAcquired {
        tenant: String,
        timestamp: Instant,
        tokens_remaining: f64,
    },
    /// A request found fewer than one token and was rejected.
    PermitRejected {
        tenant: String,
        timestamp: Instant,
        retry_after_secs: f64,
    },
    /// A tenant's bucket was dropped by the background GC sweep for being
    /// idle past the retention window.
    BucketReclaimed {
        tenant: String,
        timestamp: Instant,
    },
}

impl ResilienceEvent for RateLimiterEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RateLimiterEvent::PermitAcquired { .. } => "permit_acquired",
            RateLimiterEvent::PermitRejected { .. } => "permit_rejected",
            RateLimiterEvent::BucketReclaimed { .. } => "bucket_reclaimed",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RateLimiterEvent::PermitAcquired { timestamp, .. }
            | RateLimiterEvent::PermitRejected { timestamp, .. }
            | RateLimiterEvent::BucketReclaimed { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            RateLimiterEvent::PermitAcquired { tenant, .. }
            | RateLimiterEvent::PermitRejected { tenant, .. }
            | RateLimiterEvent::BucketReclaimed { tenant, .. } => tenant,
        }
    }
}
