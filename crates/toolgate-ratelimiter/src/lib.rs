//! Per-tenant token bucket rate limiting.
//!
//! Each tenant gets its own bucket, created lazily on first check from the
//! registry's configured rate and burst size. A background sweep reclaims
//! buckets that have gone idle past a retention window so long-lived
//! deployments don't accumulate an unbounded map of stale tenants.
//!
//! # Example
//!
//! ```rust
//! use toolgate_ratelimiter::RateLimiterConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let limiter = RateLimiterConfig::builder()
//!     .requests_per_minute(60.0)
//!     .burst_size(1.0)
//!     .build();
//!
//! limiter.check("tenant-a")?;
//! # Ok(())
//! # }
//! ```

mod bucket;
mod config;
mod error;
mod events;

pub use config::{RateLimiterConfig, RateLimiterConfigBuilder};
pub use error::RateLimiterError;
pub use events::RateLimiterEvent;

use bucket::Bucket;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use toolgate_core::GatewayError;

#[cfg(feature = "metrics")]
use metrics::counter;

/// Routes admission checks through a per-tenant token bucket, creating
/// buckets lazily on first use.
#[derive(Clone)]
pub struct RateLimiterRegistry {
    config: Arc<RateLimiterConfig>,
    buckets: Arc<DashMap<String, Mutex<Bucket>>>,
}

impl RateLimiterRegistry {
    pub(crate) fn new(config: RateLimiterConfig) -> Self {
        Self {
            config: Arc::new(config),
            buckets: Arc::new(DashMap::new()),
        }
    }

    /// Checks whether `tenant` may make one more request right now.
    ///
    /// Creates the tenant's bucket, full, on first call. Concurrent checks
    /// for the same tenant are serialized by the bucket's own lock.
    pub fn check(&self, tenant: &str) -> Result<(), GatewayError> {
        let entry = self
            .buckets
            .entry(tenant.to_string())
            .or_insert_with(|| Mutex::new(Bucket::new(self.config.burst_size)));
        let mut bucket = entry.lock();

        match bucket.try_acquire(self.config.requests_per_minute, self.config.burst_size) {
            Ok(tokens_remaining) => {
                self.emit_acquired(tenant, tokens_remaining);
                Ok(())
            }
            Err(retry_after_secs) => {
                self.emit_rejected(tenant, retry_after_secs);
                Err(RateLimiterError::RateLimited { retry_after_secs }.into())
            }
        }
    }

    /// Number of tenants with a live bucket.
    pub fn tenant_count(&self) -> usize {
        self.buckets.len()
    }

    /// Drops buckets that have been idle longer than the configured
    /// retention window. Intended to be called periodically by a background
    /// worker, not on the request path.
    pub fn reclaim_idle(&self) -> usize {
        let now = Instant::now();
        let stale: Vec<String> = self
            .buckets
            .iter()
            .filter(|entry| entry.value().lock().idle_for(now) >= self.config.idle_retention)
            .map(|entry| entry.key().clone())
            .collect();

        for tenant in &stale {
            self.buckets.remove(tenant);
            self.config
                .event_listeners
                .emit(&RateLimiterEvent::BucketReclaimed {
                    tenant: tenant.clone(),
                    timestamp: now,
                });
        }

        stale.len()
    }

    fn emit_acquired(&self, tenant: &str, tokens_remaining: f64) {
        self.config
            .event_listeners
            .emit(&RateLimiterEvent::PermitAcquired {
                tenant: tenant.to_string(),
                timestamp: Instant::now(),
                tokens_remaining,
            });

        #[cfg(feature = "tracing")]
        tracing::trace!(limiter = %self.config.name, tenant, tokens_remaining, "permit acquired");

        #[cfg(feature = "metrics")]
        counter!("ratelimiter_permits_acquired_total", "tenant" => tenant.to_string())
            .increment(1);
    }

    fn emit_rejected(&self, tenant: &str, retry_after_secs: f64) {
        self.config
            .event_listeners
            .emit(&RateLimiterEvent::PermitRejected {
                tenant: tenant.to_string(),
                timestamp: Instant::now(),
                retry_after_secs,
            });

        #[cfg(feature = "tracing")]
        tracing::debug!(limiter = %self.config.name, tenant, retry_after_secs, "permit rejected");

        #[cfg(feature = "metrics")]
        counter!("ratelimiter_permits_rejected_total", "tenant" => tenant.to_string())
            .increment(1);
    }
}
