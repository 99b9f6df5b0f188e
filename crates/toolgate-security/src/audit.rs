//! Bounded ring-buffer audit log with async per-handler dispatch.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use toolgate_core::ValueMap;

#[cfg(feature = "metrics")]
use metrics::counter;

/// Coarse risk classification attached to every recorded event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// One recorded audit event.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub user_id: String,
    pub tenant_id: String,
    pub action: String,
    pub resource: String,
    pub result: String,
    pub details: ValueMap,
    pub risk: RiskLevel,
}

/// Pure classification of an event's risk from its type and details alone.
fn classify_risk(event_type: &str, details: &ValueMap) -> RiskLevel {
    match event_type {
        "auth.failed" | "token.rotated" | "threat.blocked" => RiskLevel::High,
        "permission.denied" | "validation.failed" | "threat.flagged" => RiskLevel::Medium,
        _ => {
            if details.contains_key("injection_attempt") {
                RiskLevel::High
            } else {
                RiskLevel::Low
            }
        }
    }
}

type Handler = Arc<dyn Fn(AuditEvent) + Send + Sync>;

/// Configuration for an [`AuditLogger`].
#[derive(Clone)]
pub struct AuditLoggerConfig {
    pub capacity: usize,
}

impl Default for AuditLoggerConfig {
    fn default() -> Self {
        Self { capacity: 10_000 }
    }
}

/// Append-only ring buffer of recent [`AuditEvent`]s, with subscriber
/// dispatch run off the calling task so `record` never blocks on a handler.
pub struct AuditLogger {
    config: AuditLoggerConfig,
    ring: Mutex<VecDeque<AuditEvent>>,
    handlers: Mutex<Vec<Handler>>,
}

impl AuditLogger {
    pub fn new(config: AuditLoggerConfig) -> Self {
        Self {
            config,
            ring: Mutex::new(VecDeque::new()),
            handlers: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(AuditEvent) + Send + Sync + 'static,
    {
        self.handlers.lock().push(Arc::new(handler));
    }

    /// Appends `event` to the ring (overwriting the oldest entry once full)
    /// and dispatches to every subscriber on a detached task.
    pub fn record(
        &self,
        event_type: impl Into<String>,
        user_id: impl Into<String>,
        tenant_id: impl Into<String>,
        action: impl Into<String>,
        resource: impl Into<String>,
        result: impl Into<String>,
        details: ValueMap,
    ) {
        let event_type = event_type.into();
        let risk = classify_risk(&event_type, &details);
        let event = AuditEvent {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type,
            user_id: user_id.into(),
            tenant_id: tenant_id.into(),
            action: action.into(),
            resource: resource.into(),
            result: result.into(),
            details,
            risk,
        };

        {
            let mut ring = self.ring.lock();
            if ring.len() >= self.config.capacity {
                ring.pop_front();
            }
            ring.push_back(event.clone());
        }

        #[cfg(feature = "metrics")]
        counter!("security_audit_events_total").increment(1);

        let handlers = self.handlers.lock().clone();
        for handler in handlers {
            let event = event.clone();
            tokio::spawn(async move { handler(event) });
        }
    }

    pub fn len(&self) -> usize {
        self.ring.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the most recent `n` events, newest last.
    pub fn recent(&self, n: usize) -> Vec<AuditEvent> {
        let ring = self.ring.lock();
        ring.iter().rev().take(n).rev().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_events_in_order() {
        let logger = AuditLogger::new(AuditLoggerConfig::default());
        logger.record(
            "tool.executed",
            "user-1",
            "tenant-a",
            "execute",
            "tool-123",
            "success",
            ValueMap::new(),
        );
        logger.record(
            "tool.executed",
            "user-1",
            "tenant-a",
            "execute",
            "tool-456",
            "success",
            ValueMap::new(),
        );

        let recent = logger.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].resource, "tool-123");
        assert_eq!(recent[1].resource, "tool-456");
    }

    #[test]
    fn ring_overwrites_oldest_once_full() {
        let logger = AuditLogger::new(AuditLoggerConfig { capacity: 3 });
        for i in 0..5 {
            logger.record(
                "tool.executed",
                "user-1",
                "tenant-a",
                "execute",
                format!("tool-{i}"),
                "success",
                ValueMap::new(),
            );
        }
        assert_eq!(logger.len(), 3);
        let recent = logger.recent(3);
        assert_eq!(recent[0].resource, "tool-2");
        assert_eq!(recent[2].resource, "tool-4");
    }

    #[test]
    fn known_event_types_classify_as_expected_risk() {
        let logger = AuditLogger::new(AuditLoggerConfig::default());
        logger.record(
            "auth.failed",
            "user-1",
            "tenant-a",
            "authenticate",
            "session",
            "failure",
            ValueMap::new(),
        );
        let recent = logger.recent(1);
        assert_eq!(recent[0].risk, RiskLevel::High);
    }

    #[tokio::test]
    async fn subscribers_are_dispatched_asynchronously() {
        let logger = AuditLogger::new(AuditLoggerConfig::default());
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        logger.subscribe(move |event| {
            let _ = tx.send(event.resource.clone());
        });

        logger.record(
            "tool.executed",
            "user-1",
            "tenant-a",
            "execute",
            "tool-xyz",
            "success",
            ValueMap::new(),
        );

        let received = rx.recv().await.unwrap();
        assert_eq!(received, "tool-xyz");
    }
}
