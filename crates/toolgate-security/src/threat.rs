//! Per-user activity tracking and static threat pattern matching.

use crate::events::SecurityEvent;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use toolgate_core::events::EventListeners;

#[cfg(feature = "tracing")]
use tracing::warn;
#[cfg(feature = "metrics")]
use metrics::counter;

/// How severe a matched [`ThreatPattern`] is judged to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// What a matched [`ThreatPattern`] does to the offending user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreatAction {
    Log,
    Alert,
    Block,
}

/// Rolling activity counters for one user.
#[derive(Debug, Clone)]
pub struct UserActivity {
    pub request_count: u64,
    pub error_count: u64,
    pub unique_endpoints: HashMap<String, u64>,
    pub last_activity: Instant,
    pub suspicious_score: f64,
    pub blocked: bool,
}

impl UserActivity {
    fn new() -> Self {
        Self {
            request_count: 0,
            error_count: 0,
            unique_endpoints: HashMap::new(),
            last_activity: Instant::now(),
            suspicious_score: 0.0,
            blocked: false,
        }
    }

    /// Recomputes `suspicious_score` from the current counters. Pure
    /// function of the activity record so the `anomaly` pattern has a
    /// signal independent of whatever pattern it is itself evaluated
    /// alongside.
    fn refresh_suspicious_score(&mut self) {
        let error_rate = if self.request_count == 0 {
            0.0
        } else {
            self.error_count as f64 / self.request_count as f64
        };
        let endpoint_spread = self.unique_endpoints.len() as f64;
        self.suspicious_score = error_rate * 10.0 + endpoint_spread * 0.1;
    }
}

/// A named rule evaluated against a user's rolling [`UserActivity`].
pub struct ThreatPattern {
    pub name: &'static str,
    pub description: &'static str,
    pub severity: Severity,
    pub action: ThreatAction,
    predicate: Box<dyn Fn(&UserActivity, f64) -> bool + Send + Sync>,
}

fn default_patterns() -> Vec<ThreatPattern> {
    vec![
        ThreatPattern {
            name: "brute_force",
            description: "error count is high both in absolute terms and relative to volume",
            severity: Severity::High,
            action: ThreatAction::Block,
            predicate: Box::new(|activity, _threshold| {
                activity.error_count > 10
                    && activity.error_count as f64 / activity.request_count.max(1) as f64 > 0.8
            }),
        },
        ThreatPattern {
            name: "endpoint_scanning",
            description: "unusually broad spread of distinct endpoints touched recently",
            severity: Severity::Medium,
            action: ThreatAction::Alert,
            predicate: Box::new(|activity, _threshold| {
                activity.unique_endpoints.len() > 50
                    && activity.last_activity.elapsed() < Duration::from_secs(5 * 60)
            }),
        },
        ThreatPattern {
            name: "anomaly",
            description: "suspicious score exceeds the configured anomaly threshold",
            severity: Severity::Medium,
            action: ThreatAction::Log,
            predicate: Box::new(|activity, threshold| activity.suspicious_score > threshold),
        },
    ]
}

/// Configuration for a [`ThreatDetector`].
#[derive(Clone)]
pub struct ThreatDetectorConfig {
    pub stale_retention: Duration,
    pub anomaly_threshold: f64,
}

impl Default for ThreatDetectorConfig {
    fn default() -> Self {
        Self {
            stale_retention: Duration::from_secs(24 * 3600),
            anomaly_threshold: 5.0,
        }
    }
}

/// Evaluates every request against a fixed set of threat patterns,
/// first-match-wins, and tracks per-user rolling activity.
pub struct ThreatDetector {
    config: ThreatDetectorConfig,
    patterns: Vec<ThreatPattern>,
    activity: Mutex<HashMap<String, UserActivity>>,
    event_listeners: EventListeners<SecurityEvent>,
}

impl ThreatDetector {
    pub fn new(config: ThreatDetectorConfig) -> Self {
        Self::with_listeners(config, EventListeners::new())
    }

    pub(crate) fn with_listeners(
        config: ThreatDetectorConfig,
        event_listeners: EventListeners<SecurityEvent>,
    ) -> Self {
        Self {
            config,
            patterns: default_patterns(),
            activity: Mutex::new(HashMap::new()),
            event_listeners,
        }
    }

    /// Records one request against `user_id` and evaluates the registered
    /// patterns in order, stopping at the first match. Returns whether the
    /// user is blocked after this update.
    pub fn record_request(&self, user_id: &str, endpoint: &str, is_error: bool) -> bool {
        let mut activity_map = self.activity.lock();
        let activity = activity_map
            .entry(user_id.to_string())
            .or_insert_with(UserActivity::new);

        activity.request_count += 1;
        if is_error {
            activity.error_count += 1;
        }
        *activity.unique_endpoints.entry(endpoint.to_string()).or_insert(0) += 1;
        activity.last_activity = Instant::now();
        activity.refresh_suspicious_score();

        if activity.blocked {
            return true;
        }

        for pattern in &self.patterns {
            if (pattern.predicate)(activity, self.config.anomaly_threshold) {
                if pattern.action == ThreatAction::Block {
                    activity.blocked = true;
                }
                let blocked = activity.blocked;
                drop(activity_map);

                #[cfg(feature = "tracing")]
                warn!(user_id, pattern = pattern.name, severity = ?pattern.severity, "threat pattern matched");
                #[cfg(feature = "metrics")]
                counter!("security_threat_matches_total", "pattern" => pattern.name).increment(1);

                self.event_listeners.emit(&SecurityEvent::ThreatDetected {
                    user_id: user_id.to_string(),
                    pattern: pattern.name.to_string(),
                    blocked,
                    timestamp: Instant::now(),
                });

                return blocked;
            }
        }

        false
    }

    pub fn is_blocked(&self, user_id: &str) -> bool {
        self.activity
            .lock()
            .get(user_id)
            .map(|a| a.blocked)
            .unwrap_or(false)
    }

    pub fn snapshot(&self, user_id: &str) -> Option<UserActivity> {
        self.activity.lock().get(user_id).cloned()
    }

    /// Drops activity records that haven't been touched in `stale_retention`.
    pub fn cleanup_stale(&self) -> usize {
        let mut activity_map = self.activity.lock();
        let before = activity_map.len();
        activity_map.retain(|_, a| a.last_activity.elapsed() < self.config.stale_retention);
        before - activity_map.len()
    }
}
