//! Aggregated configuration for the gateway facade (spec §6's enumerated
//! knob list). Each field is handed to the owning crate's own
//! `*Config::builder()` when [`crate::GatewayCore::new`] wires the
//! components together; this struct only collects the values in one place
//! so an embedder has a single configuration surface.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    // Circuit breaker (toolgate-circuitbreaker)
    pub circuit_breaker_max_requests: u64,
    pub circuit_breaker_interval: Duration,
    pub circuit_breaker_timeout: Duration,
    pub circuit_breaker_ratio: f64,

    // Bulkhead (toolgate-bulkhead)
    pub max_concurrent_requests: usize,
    pub queue_size: usize,

    // Dispatch adapter (toolgate-dispatch)
    pub provider_cache_ttl: Duration,
    pub enable_chaos: bool,
    pub chaos_probability: f64,

    // Permission discovery (toolgate-permissions)
    pub enable_async_discovery: bool,
    pub permission_cache_ttl: Duration,
    pub discovery_timeout: Duration,

    // Token manager (toolgate-security)
    pub token_rotation_interval: Duration,
    pub token_ttl: Duration,
    pub max_tokens_per_user: usize,

    // Encryption (toolgate-security). The envelope itself has no on/off
    // switch — key rotation always runs — this only gates whether the
    // facade seals audit payloads before handing them to an audit sink.
    pub encryption_enabled: bool,
    pub key_rotation_interval: Duration,

    // Rate limiter (toolgate-ratelimiter)
    pub requests_per_minute: f64,
    pub burst_size: f64,
    pub rate_limit_gc_interval: Duration,

    // Audit (toolgate-security)
    pub audit_retention: usize,

    // Threat detection (toolgate-security)
    pub anomaly_threshold: f64,

    // Background maintenance cadence (token rotation sweep, key rotation,
    // threat cleanup — all three run off one tick via `run_maintenance`).
    pub maintenance_interval: Duration,

    /// Bound on how long `GatewayCore::shutdown` waits for workers to join
    /// before aborting them.
    pub shutdown_join_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            circuit_breaker_max_requests: 5,
            circuit_breaker_interval: Duration::from_secs(60),
            circuit_breaker_timeout: Duration::from_secs(30),
            circuit_breaker_ratio: 0.6,

            max_concurrent_requests: 25,
            queue_size: 0,

            provider_cache_ttl: Duration::from_secs(300),
            enable_chaos: false,
            chaos_probability: 0.0,

            enable_async_discovery: false,
            permission_cache_ttl: Duration::from_secs(300),
            discovery_timeout: Duration::from_secs(30),

            token_rotation_interval: Duration::from_secs(3600),
            token_ttl: Duration::from_secs(3600),
            max_tokens_per_user: 10,

            encryption_enabled: true,
            key_rotation_interval: Duration::from_secs(24 * 3600),

            requests_per_minute: 60.0,
            burst_size: 10.0,
            rate_limit_gc_interval: Duration::from_secs(120),

            audit_retention: 10_000,

            anomaly_threshold: 0.8,

            maintenance_interval: Duration::from_secs(300),
            shutdown_join_timeout: Duration::from_secs(10),
        }
    }
}

pub struct GatewayConfigBuilder {
    config: GatewayConfig,
}

impl Default for GatewayConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: GatewayConfig::default(),
        }
    }

    pub fn circuit_breaker_max_requests(mut self, value: u64) -> Self {
        self.config.circuit_breaker_max_requests = value;
        self
    }

    pub fn circuit_breaker_interval(mut self, value: Duration) -> Self {
        self.config.circuit_breaker_interval = value;
        self
    }

    pub fn circuit_breaker_timeout(mut self, value: Duration) -> Self {
        self.config.circuit_breaker_timeout = value;
        self
    }

    pub fn circuit_breaker_ratio(mut self, value: f64) -> Self {
        self.config.circuit_breaker_ratio = value;
        self
    }

    pub fn max_concurrent_requests(mut self, value: usize) -> Self {
        self.config.max_concurrent_requests = value;
        self
    }

    pub fn queue_size(mut self, value: usize) -> Self {
        self.config.queue_size = value;
        self
    }

    pub fn provider_cache_ttl(mut self, value: Duration) -> Self {
        self.config.provider_cache_ttl = value;
        self
    }

    pub fn enable_chaos(mut self, probability: f64) -> Self {
        self.config.enable_chaos = true;
        self.config.chaos_probability = probability;
        self
    }

    pub fn enable_async_discovery(mut self, value: bool) -> Self {
        self.config.enable_async_discovery = value;
        self
    }

    pub fn permission_cache_ttl(mut self, value: Duration) -> Self {
        self.config.permission_cache_ttl = value;
        self
    }

    pub fn discovery_timeout(mut self, value: Duration) -> Self {
        self.config.discovery_timeout = value;
        self
    }

    pub fn token_rotation_interval(mut self, value: Duration) -> Self {
        self.config.token_rotation_interval = value;
        self
    }

    pub fn token_ttl(mut self, value: Duration) -> Self {
        self.config.token_ttl = value;
        self
    }

    pub fn max_tokens_per_user(mut self, value: usize) -> Self {
        self.config.max_tokens_per_user = value;
        self
    }

    pub fn encryption_enabled(mut self, value: bool) -> Self {
        self.config.encryption_enabled = value;
        self
    }

    pub fn key_rotation_interval(mut self, value: Duration) -> Self {
        self.config.key_rotation_interval = value;
        self
    }

    pub fn requests_per_minute(mut self, value: f64) -> Self {
        self.config.requests_per_minute = value;
        self
    }

    pub fn burst_size(mut self, value: f64) -> Self {
        self.config.burst_size = value;
        self
    }

    pub fn rate_limit_gc_interval(mut self, value: Duration) -> Self {
        self.config.rate_limit_gc_interval = value;
        self
    }

    pub fn audit_retention(mut self, value: usize) -> Self {
        self.config.audit_retention = value;
        self
    }

    pub fn anomaly_threshold(mut self, value: f64) -> Self {
        self.config.anomaly_threshold = value;
        self
    }

    pub fn maintenance_interval(mut self, value: Duration) -> Self {
        self.config.maintenance_interval = value;
        self
    }

    pub fn shutdown_join_timeout(mut self, value: Duration) -> Self {
        self.config.shutdown_join_timeout = value;
        self
    }

    pub fn build(self) -> GatewayConfig {
        self.config
    }
}

impl GatewayConfig {
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::new()
    }
}
