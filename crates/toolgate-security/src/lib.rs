//! Identity, encryption, input validation, threat detection, and audit
//! logging for the gateway.
//!
//! Each concern lives in its own module and can be used standalone
//! ([`TokenManager`], [`EncryptionEnvelope`], [`InputValidator`],
//! [`ThreatDetector`], [`AuditLogger`]); [`SecuritySuite`] wires all five
//! together behind one configuration for the facade crate to register
//! with a background worker supervisor.
//!
//! # Example
//!
//! ```rust
//! use toolgate_security::SecurityConfig;
//!
//! # async fn example() {
//! let security = SecurityConfig::builder()
//!     .max_tokens_per_user(5)
//!     .build();
//!
//! let token = security.tokens().issue("user-1", "tenant-a", vec!["read".into()]).await;
//! assert!(security.tokens().validate(&token.opaque_value).await.is_ok());
//! # }
//! ```

mod audit;
mod config;
mod encryption;
mod error;
mod events;
mod threat;
mod token;
mod validator;

pub use audit::{AuditEvent, AuditLogger, AuditLoggerConfig, RiskLevel};
pub use config::{SecurityConfig, SecurityConfigBuilder};
pub use encryption::{EncryptionConfig, EncryptionEnvelope};
pub use error::SecurityError;
pub use events::SecurityEvent;
pub use threat::{
    Severity, ThreatAction, ThreatDetector, ThreatDetectorConfig, ThreatPattern, UserActivity,
};
pub use token::{TokenManager, TokenManagerConfig, TokenRecord};
pub use validator::{FieldRule, InputValidator};

/// The five security components, wired to a single [`SecurityConfig`] and
/// sharing one event stream.
pub struct SecuritySuite {
    tokens: TokenManager,
    encryption: EncryptionEnvelope,
    threats: ThreatDetector,
    audit: AuditLogger,
    validator: InputValidator,
}

impl SecuritySuite {
    pub(crate) fn new(config: SecurityConfig) -> Self {
        Self {
            tokens: TokenManager::with_listeners(config.token, config.event_listeners.clone()),
            encryption: EncryptionEnvelope::with_listeners(
                config.encryption,
                config.event_listeners.clone(),
            ),
            threats: ThreatDetector::with_listeners(config.threat, config.event_listeners),
            audit: AuditLogger::new(config.audit),
            validator: InputValidator::new(),
        }
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    pub fn encryption(&self) -> &EncryptionEnvelope {
        &self.encryption
    }

    pub fn threats(&self) -> &ThreatDetector {
        &self.threats
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    pub fn validator(&self) -> &InputValidator {
        &self.validator
    }

    /// Runs the token rotation sweep, encryption key rotation, and threat
    /// activity cleanup once. Intended to be called periodically from a
    /// [`toolgate_executor::WorkerSupervisor`]-managed worker.
    pub async fn run_maintenance(&self) {
        self.tokens.rotation_sweep().await;
        self.encryption.rotate_key();
        self.threats.cleanup_stale();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn suite_wires_components_end_to_end() {
        let suite = SecurityConfig::builder().build();

        let token = suite
            .tokens()
            .issue("user-1", "tenant-a", vec!["read".into()])
            .await;
        assert!(suite.tokens().validate(&token.opaque_value).await.is_ok());

        let sealed = suite.encryption().seal(b"payload").unwrap();
        assert_eq!(suite.encryption().open(&sealed).unwrap(), b"payload");

        assert!(!suite.threats().is_blocked("user-1"));

        suite.audit().record(
            "tool.executed",
            "user-1",
            "tenant-a",
            "execute",
            "tool-1",
            "success",
            toolgate_core::ValueMap::new(),
        );
        assert_eq!(suite.audit().len(), 1);

        assert!(suite.validator().validate("field", "clean value").is_ok());
    }

    #[tokio::test]
    async fn run_maintenance_does_not_panic() {
        let suite = SecurityConfig::builder().build();
        suite.run_maintenance().await;
    }
}
