//! Permission caching and provider scope discovery.
//!
//! `GetOrganizationTools` needs to know, for each tool instance, whether the
//! caller's token is permitted to use it. [`PermissionService`] answers that
//! from a TTL cache keyed by `(provider, token_fingerprint)`, falling back to
//! [`PermissionDiscoverer`] on a miss — synchronously (blocking the caller)
//! or asynchronously (provisionally allowing while discovery runs detached),
//! per the configured [`DiscoveryMode`].
//!
//! # Example
//!
//! ```rust
//! use toolgate_permissions::PermissionConfig;
//!
//! # async fn example() {
//! let service = PermissionConfig::builder().build();
//! let resolution = service
//!     .resolve("github", "https://api.github.example", "token-value", &[])
//!     .await;
//! assert!(resolution.included || !resolution.included);
//! # }
//! ```

mod cache;
mod config;
mod discoverer;
mod error;
mod events;

pub use cache::{PermissionCache, PermissionCacheEntry};
pub use config::{DiscoveryMode, PermissionConfig, PermissionConfigBuilder};
pub use discoverer::{auth_header, Capabilities, PermissionDiscoverer};
pub use error::PermissionError;
pub use events::PermissionEvent;

use std::sync::Arc;
use std::time::Instant;
use toolgate_core::fingerprint;

#[cfg(feature = "metrics")]
use metrics::counter;

/// The outcome of resolving one caller's permission against one provider.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub included: bool,
    pub allowed_operations: Vec<String>,
}

/// Ties a [`PermissionCache`] to a [`PermissionDiscoverer`] behind one
/// configuration.
pub struct PermissionService {
    config: Arc<config::PermissionConfig>,
    cache: Arc<PermissionCache>,
    discoverer: Arc<PermissionDiscoverer>,
}

impl Clone for PermissionService {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            cache: Arc::clone(&self.cache),
            discoverer: Arc::clone(&self.discoverer),
        }
    }
}

impl PermissionService {
    pub(crate) fn new(config: config::PermissionConfig) -> Self {
        let cache = Arc::new(PermissionCache::new(config.cache_ttl));
        let discoverer = Arc::new(PermissionDiscoverer::new(config.discovery_timeout));
        Self {
            config: Arc::new(config),
            cache,
            discoverer,
        }
    }

    /// Resolves whether `token` may use `provider`, and which of
    /// `operations` (name, owning-capability) pairs it is allowed to call.
    pub async fn resolve(
        &self,
        provider: &str,
        base_url: &str,
        token: &str,
        operations: &[(String, Option<String>)],
    ) -> Resolution {
        let token_fp = fingerprint(token);

        if let Some(entry) = self.cache.get(provider, &token_fp) {
            self.emit_cache_hit(provider);
            return Resolution {
                included: entry.has_scopes(),
                allowed_operations: entry.allowed_operations,
            };
        }

        self.emit_cache_miss(provider);

        match self.config.discovery_mode {
            DiscoveryMode::Sync => self.discover_sync(provider, base_url, token, &token_fp, operations).await,
            DiscoveryMode::Async => {
                self.discover_async(provider, base_url, token, &token_fp, operations);
                Resolution {
                    included: true,
                    allowed_operations: operations.iter().map(|(name, _)| name.clone()).collect(),
                }
            }
        }
    }

    async fn discover_sync(
        &self,
        provider: &str,
        base_url: &str,
        token: &str,
        token_fp: &str,
        operations: &[(String, Option<String>)],
    ) -> Resolution {
        match self.discoverer.discover(base_url, token).await {
            Ok(capabilities) => {
                let scopes = capabilities.scopes();
                let allowed_operations =
                    self.discoverer.filter_operations(&capabilities, operations);

                self.cache.put(
                    provider,
                    token_fp,
                    allowed_operations.clone(),
                    scopes.clone(),
                );

                #[cfg(feature = "metrics")]
                counter!("permissions_discoveries_total", "provider" => provider.to_string())
                    .increment(1);

                self.config
                    .event_listeners
                    .emit(&PermissionEvent::DiscoveryCompleted {
                        provider: provider.to_string(),
                        scope_count: scopes.len(),
                        timestamp: Instant::now(),
                    });

                Resolution {
                    included: !scopes.is_empty(),
                    allowed_operations,
                }
            }
            Err(err) => {
                self.emit_discovery_failed(provider, &err.to_string());
                Resolution {
                    included: true,
                    allowed_operations: operations.iter().map(|(name, _)| name.clone()).collect(),
                }
            }
        }
    }

    /// Schedules discovery on a detached task with the configured timeout.
    /// Failures are swallowed here — the caller already got a provisional
    /// allow; this only populates the cache for the next lookup.
    fn discover_async(
        &self,
        provider: &str,
        base_url: &str,
        token: &str,
        token_fp: &str,
        operations: &[(String, Option<String>)],
    ) {
        let cache = Arc::clone(&self.cache);
        let discoverer = Arc::clone(&self.discoverer);
        let provider = provider.to_string();
        let base_url = base_url.to_string();
        let token = token.to_string();
        let token_fp = token_fp.to_string();
        let operations = operations.to_vec();
        let timeout = self.config.discovery_timeout;
        let event_listeners = self.config.event_listeners.clone();

        tokio::spawn(async move {
            let result = tokio::time::timeout(timeout, discoverer.discover(&base_url, &token)).await;
            match result {
                Ok(Ok(capabilities)) => {
                    let scopes = capabilities.scopes();
                    let allowed_operations = discoverer.filter_operations(&capabilities, &operations);
                    cache.put(&provider, &token_fp, allowed_operations, scopes);
                }
                Ok(Err(err)) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(provider, error = %err, "async permission discovery failed");
                    event_listeners.emit(&PermissionEvent::DiscoveryFailed {
                        provider,
                        reason: err.to_string(),
                        timestamp: Instant::now(),
                    });
                }
                Err(_) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(provider, "async permission discovery timed out");
                    event_listeners.emit(&PermissionEvent::DiscoveryFailed {
                        provider,
                        reason: "discovery timed out".to_string(),
                        timestamp: Instant::now(),
                    });
                }
            }
        });
    }

    fn emit_cache_hit(&self, provider: &str) {
        self.config.event_listeners.emit(&PermissionEvent::CacheHit {
            provider: provider.to_string(),
            timestamp: Instant::now(),
        });
    }

    fn emit_cache_miss(&self, provider: &str) {
        self.config.event_listeners.emit(&PermissionEvent::CacheMiss {
            provider: provider.to_string(),
            timestamp: Instant::now(),
        });
    }

    fn emit_discovery_failed(&self, provider: &str, reason: &str) {
        self.config
            .event_listeners
            .emit(&PermissionEvent::DiscoveryFailed {
                provider: provider.to_string(),
                reason: reason.to_string(),
                timestamp: Instant::now(),
            });
    }

    pub fn cache(&self) -> &PermissionCache {
        &self.cache
    }
}
