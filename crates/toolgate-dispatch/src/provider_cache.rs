//! TTL cache from template id to its resolved provider name (spec §4.14 /
//! `ProviderCacheTTL`). Avoids a template-repository round trip on every
//! dispatch once a template's provider name has been resolved once.

use dashmap::DashMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

struct Entry {
    provider_name: String,
    resolved_at: Instant,
}

pub struct ProviderCache {
    entries: DashMap<Uuid, Entry>,
    ttl: Duration,
}

impl ProviderCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Returns the cached provider name for `template_id` if present and
    /// still within TTL, evicting it if stale.
    pub fn get(&self, template_id: Uuid) -> Option<String> {
        let entry = self.entries.get(&template_id)?;
        if entry.resolved_at.elapsed() >= self.ttl {
            drop(entry);
            self.entries.remove(&template_id);
            return None;
        }
        Some(entry.provider_name.clone())
    }

    pub fn put(&self, template_id: Uuid, provider_name: impl Into<String>) {
        self.entries.insert(
            template_id,
            Entry {
                provider_name: provider_name.into(),
                resolved_at: Instant::now(),
            },
        );
    }
}
