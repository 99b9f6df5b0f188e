//! Aggregated configuration for every security component.

use crate::encryption::EncryptionConfig;
use crate::events::SecurityEvent;
use crate::threat::ThreatDetectorConfig;
use crate::token::TokenManagerConfig;
use crate::AuditLoggerConfig;
use toolgate_core::events::{EventListeners, FnListener};

/// Configuration for the whole [`crate::SecuritySuite`].
pub struct SecurityConfig {
    pub(crate) token: TokenManagerConfig,
    pub(crate) encryption: EncryptionConfig,
    pub(crate) threat: ThreatDetectorConfig,
    pub(crate) audit: AuditLoggerConfig,
    pub(crate) event_listeners: EventListeners<SecurityEvent>,
}

/// Builder for [`SecurityConfig`].
pub struct SecurityConfigBuilder {
    token: TokenManagerConfig,
    encryption: EncryptionConfig,
    threat: ThreatDetectorConfig,
    audit: AuditLoggerConfig,
    event_listeners: EventListeners<SecurityEvent>,
}

impl Default for SecurityConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SecurityConfigBuilder {
    pub fn new() -> Self {
        Self {
            token: TokenManagerConfig::default(),
            encryption: EncryptionConfig::default(),
            threat: ThreatDetectorConfig::default(),
            audit: AuditLoggerConfig::default(),
            event_listeners: EventListeners::new(),
        }
    }

    pub fn max_tokens_per_user(mut self, max: usize) -> Self {
        self.token.max_tokens_per_user = max;
        self
    }

    pub fn token_ttl(mut self, ttl: std::time::Duration) -> Self {
        self.token.token_ttl = ttl;
        self
    }

    pub fn token_rotation_interval(mut self, interval: std::time::Duration) -> Self {
        self.token.rotation_interval = interval;
        self
    }

    pub fn key_rotation_interval(mut self, interval: std::time::Duration) -> Self {
        self.encryption.key_rotation_interval = interval;
        self
    }

    pub fn max_key_history(mut self, history: usize) -> Self {
        self.encryption.max_key_history = history;
        self
    }

    pub fn threat_stale_retention(mut self, retention: std::time::Duration) -> Self {
        self.threat.stale_retention = retention;
        self
    }

    pub fn anomaly_threshold(mut self, threshold: f64) -> Self {
        self.threat.anomaly_threshold = threshold;
        self
    }

    pub fn audit_capacity(mut self, capacity: usize) -> Self {
        self.audit.capacity = capacity;
        self
    }

    /// Registers a callback invoked whenever a user is flagged or blocked
    /// by the threat detector.
    pub fn on_threat_detected<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &str, bool) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let SecurityEvent::ThreatDetected {
                user_id,
                pattern,
                blocked,
                ..
            } = event
            {
                f(user_id, pattern, *blocked);
            }
        }));
        self
    }

    pub fn build(self) -> crate::SecuritySuite {
        let config = SecurityConfig {
            token: self.token,
            encryption: self.encryption,
            threat: self.threat,
            audit: self.audit,
            event_listeners: self.event_listeners,
        };
        crate::SecuritySuite::new(config)
    }
}

impl SecurityConfig {
    pub fn builder() -> SecurityConfigBuilder {
        SecurityConfigBuilder::new()
    }
}
