//! Tunables for the dispatch adapter itself. The bulkhead, circuit breaker
//! registry, coalescer, rate limiter registry, permission service, and
//! security suite are each configured and built through their own crate's
//! `*Config::builder()` and handed to [`crate::DispatchAdapter::new`]
//! already constructed — this config only covers what belongs to the
//! adapter's own orchestration.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// How long a resolved `template_id → provider_name` mapping is cached.
    pub provider_cache_ttl: Duration,
    /// When `true`, each dispatched call has an independent `chaos_probability`
    /// chance of being short-circuited to a synthetic `ProviderError` before
    /// the provider is invoked, for exercising breaker/bulkhead behavior in
    /// staging without depending on a real provider's failure modes.
    pub enable_chaos: bool,
    /// Per-call injection probability in `[0.0, 1.0]`, read only when
    /// `enable_chaos` is `true`.
    pub chaos_probability: f64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            provider_cache_ttl: Duration::from_secs(300),
            enable_chaos: false,
            chaos_probability: 0.0,
        }
    }
}

pub struct DispatchConfigBuilder {
    config: DispatchConfig,
}

impl Default for DispatchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: DispatchConfig::default(),
        }
    }

    pub fn provider_cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.provider_cache_ttl = ttl;
        self
    }

    pub fn enable_chaos(mut self, probability: f64) -> Self {
        self.config.enable_chaos = true;
        self.config.chaos_probability = probability;
        self
    }

    pub fn build(self) -> DispatchConfig {
        self.config
    }
}

impl DispatchConfig {
    pub fn builder() -> DispatchConfigBuilder {
        DispatchConfigBuilder::new()
    }
}
