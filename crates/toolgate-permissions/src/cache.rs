//! TTL-bounded cache of discovered scopes, keyed by (provider, token).

use dashmap::DashMap;
use std::time::{Duration, Instant};
use toolgate_core::composite_fingerprint;

/// One cached discovery result.
#[derive(Debug, Clone)]
pub struct PermissionCacheEntry {
    pub allowed_operations: Vec<String>,
    pub scopes: Vec<String>,
    pub provider: String,
    pub expires_at: Instant,
}

impl PermissionCacheEntry {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    pub fn has_scopes(&self) -> bool {
        !self.scopes.is_empty()
    }
}

/// Caches permission-discovery results keyed by `(provider_name,
/// token_fingerprint)`. The token itself is never stored, only its
/// fingerprint — see [`toolgate_core::fingerprint`].
pub struct PermissionCache {
    entries: DashMap<String, PermissionCacheEntry>,
    ttl: Duration,
}

fn cache_key(provider: &str, token_fingerprint: &str) -> String {
    composite_fingerprint([provider, token_fingerprint])
}

impl PermissionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Returns a cached entry if present and not expired.
    pub fn get(&self, provider: &str, token_fingerprint: &str) -> Option<PermissionCacheEntry> {
        let key = cache_key(provider, token_fingerprint);
        let entry = self.entries.get(&key)?;
        if entry.is_expired(Instant::now()) {
            drop(entry);
            self.entries.remove(&key);
            return None;
        }
        Some(entry.clone())
    }

    /// Writes through a discovery result with this cache's configured TTL.
    pub fn put(
        &self,
        provider: &str,
        token_fingerprint: &str,
        allowed_operations: Vec<String>,
        scopes: Vec<String>,
    ) {
        let key = cache_key(provider, token_fingerprint);
        self.entries.insert(
            key,
            PermissionCacheEntry {
                allowed_operations,
                scopes,
                provider: provider.to_string(),
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
