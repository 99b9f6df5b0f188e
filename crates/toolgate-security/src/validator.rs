//! Request field validation: type rules, bounds, and injection detection.

use crate::error::SecurityError;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Static patterns rejected outright wherever they appear in a string
/// field, regardless of which rule validates that field.
const INJECTION_PATTERNS: &[&str] = &[
    "' or '1'='1",
    "--",
    "; drop table",
    "<script",
    "javascript:",
    "$(",
    "`",
    "../",
];

/// A single field's validation rule.
pub enum FieldRule {
    String { min_len: usize, max_len: usize },
    Uuid,
    Number { min: f64, max: f64 },
    Custom(Box<dyn Fn(&str) -> bool + Send + Sync>),
}

/// A registered set of [`FieldRule`]s plus per-field failure counters.
pub struct InputValidator {
    rules: HashMap<String, FieldRule>,
    failure_counts: Mutex<HashMap<String, u64>>,
    injection_attempts: Mutex<u64>,
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl InputValidator {
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
            failure_counts: Mutex::new(HashMap::new()),
            injection_attempts: Mutex::new(0),
        }
    }

    pub fn with_rule(mut self, field: impl Into<String>, rule: FieldRule) -> Self {
        self.rules.insert(field.into(), rule);
        self
    }

    /// Validates `value` for `field`. Checks injection substrings first,
    /// independent of whether the field has a registered rule.
    pub fn validate(&self, field: &str, value: &str) -> Result<(), SecurityError> {
        let lowered = value.to_ascii_lowercase();
        if INJECTION_PATTERNS.iter().any(|p| lowered.contains(p)) {
            *self.injection_attempts.lock() += 1;
            self.record_failure(field);
            return Err(SecurityError::InjectionAttempt {
                field: field.to_string(),
            });
        }

        let Some(rule) = self.rules.get(field) else {
            return Ok(());
        };

        let ok = match rule {
            FieldRule::String { min_len, max_len } => {
                value.len() >= *min_len && value.len() <= *max_len
            }
            FieldRule::Uuid => uuid::Uuid::parse_str(value).is_ok(),
            FieldRule::Number { min, max } => value
                .parse::<f64>()
                .map(|n| n >= *min && n <= *max)
                .unwrap_or(false),
            FieldRule::Custom(predicate) => predicate(value),
        };

        if ok {
            Ok(())
        } else {
            self.record_failure(field);
            Err(SecurityError::ValidationFailed {
                field: field.to_string(),
                reason: "value does not satisfy the registered rule".to_string(),
            })
        }
    }

    fn record_failure(&self, field: &str) {
        *self.failure_counts.lock().entry(field.to_string()).or_insert(0) += 1;
    }

    pub fn failure_count(&self, field: &str) -> u64 {
        self.failure_counts.lock().get(field).copied().unwrap_or(0)
    }

    pub fn injection_attempts(&self) -> u64 {
        *self.injection_attempts.lock()
    }
}
