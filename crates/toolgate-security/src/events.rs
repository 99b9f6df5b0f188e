//! Events emitted by the security components.

use std::time::Instant;
use toolgate_core::ResilienceEvent;

/// An observable event from token management, encryption, or threat
/// detection.
#[derive(Debug, Clone)]
pub enum SecurityEvent {
    /// A new bearer token was issued for a user.
    TokenIssued {
        user_id: String,
        timestamp: Instant,
    },
    /// An existing token was rotated out in favor of a new one.
    TokenRotated {
        user_id: String,
        timestamp: Instant,
    },
    /// The active encryption key was rotated.
    KeyRotated { timestamp: Instant },
    /// A request matched a registered threat pattern.
    ThreatDetected {
        user_id: String,
        pattern: String,
        blocked: bool,
        timestamp: Instant,
    },
}

impl ResilienceEvent for SecurityEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SecurityEvent::TokenIssued { .. } => "token_issued",
            SecurityEvent::TokenRotated { .. } => "token_rotated",
            SecurityEvent::KeyRotated { .. } => "key_rotated",
            SecurityEvent::ThreatDetected { .. } => "threat_detected",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            SecurityEvent::TokenIssued { timestamp, .. }
            | SecurityEvent::TokenRotated { timestamp, .. }
            | SecurityEvent::KeyRotated { timestamp }
            | SecurityEvent::ThreatDetected { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            SecurityEvent::TokenIssued { user_id, .. }
            | SecurityEvent::TokenRotated { user_id, .. }
            | SecurityEvent::ThreatDetected { user_id, .. } => user_id,
            SecurityEvent::KeyRotated { .. } => "encryption",
        }
    }
}
