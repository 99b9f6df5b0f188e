//! Opaque bearer token issuance, validation, and rotation.

use crate::error::SecurityError;
use crate::events::SecurityEvent;
use base64::Engine;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use toolgate_core::events::EventListeners;

#[cfg(feature = "metrics")]
use metrics::counter;

/// One issued token. `opaque_value` is the bearer secret; every other field
/// is metadata a caller can inspect after successful validation.
#[derive(Debug, Clone)]
pub struct TokenRecord {
    pub id: String,
    pub user_id: String,
    pub tenant_id: String,
    pub opaque_value: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_used: Option<DateTime<Utc>>,
    pub use_count: u64,
    pub scopes: Vec<String>,
    pub is_active: bool,
}

/// Configuration for a [`TokenManager`].
#[derive(Clone)]
pub struct TokenManagerConfig {
    pub max_tokens_per_user: usize,
    pub token_ttl: Duration,
    pub rotation_interval: Duration,
}

impl Default for TokenManagerConfig {
    fn default() -> Self {
        Self {
            max_tokens_per_user: 5,
            token_ttl: Duration::from_secs(3600),
            rotation_interval: Duration::from_secs(24 * 3600),
        }
    }
}

/// Issues, validates, and rotates opaque bearer tokens for every user.
pub struct TokenManager {
    config: TokenManagerConfig,
    by_user: RwLock<HashMap<String, Vec<TokenRecord>>>,
    event_listeners: EventListeners<SecurityEvent>,
}

fn generate_opaque_value() -> String {
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Constant-time byte comparison, so token lookup doesn't leak timing
/// information about how many leading bytes matched.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

impl TokenManager {
    pub fn new(config: TokenManagerConfig) -> Self {
        Self::with_listeners(config, EventListeners::new())
    }

    pub(crate) fn with_listeners(
        config: TokenManagerConfig,
        event_listeners: EventListeners<SecurityEvent>,
    ) -> Self {
        Self {
            config,
            by_user: RwLock::new(HashMap::new()),
            event_listeners,
        }
    }

    /// Issues a new token for `user_id`. If the user is already at
    /// `max_tokens_per_user`, the oldest active token is deactivated (its
    /// record is retained for auditing, not removed).
    pub async fn issue(
        &self,
        user_id: impl Into<String>,
        tenant_id: impl Into<String>,
        scopes: Vec<String>,
    ) -> TokenRecord {
        let user_id = user_id.into();
        let now = Utc::now();
        let record = TokenRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.clone(),
            tenant_id: tenant_id.into(),
            opaque_value: generate_opaque_value(),
            created_at: now,
            expires_at: now
                + chrono::Duration::from_std(self.config.token_ttl)
                    .unwrap_or_else(|_| chrono::Duration::seconds(3600)),
            last_used: None,
            use_count: 0,
            scopes,
            is_active: true,
        };

        let mut by_user = self.by_user.write().await;
        let tokens = by_user.entry(user_id).or_default();

        let active_count = tokens.iter().filter(|t| t.is_active).count();
        if active_count >= self.config.max_tokens_per_user {
            if let Some(oldest) = tokens
                .iter_mut()
                .filter(|t| t.is_active)
                .min_by_key(|t| t.created_at)
            {
                oldest.is_active = false;
            }
        }

        tokens.push(record.clone());
        drop(by_user);

        self.event_listeners.emit(&SecurityEvent::TokenIssued {
            user_id: record.user_id.clone(),
            timestamp: Instant::now(),
        });

        #[cfg(feature = "metrics")]
        counter!("security_tokens_issued_total").increment(1);

        record
    }

    /// Validates an opaque token value, updating `last_used`/`use_count` on
    /// success. Comparison is constant-time across the active set.
    pub async fn validate(&self, opaque_value: &str) -> Result<TokenRecord, SecurityError> {
        let now = Utc::now();
        let needle = opaque_value.as_bytes();
        let mut by_user = self.by_user.write().await;

        for tokens in by_user.values_mut() {
            for token in tokens.iter_mut() {
                if constant_time_eq(token.opaque_value.as_bytes(), needle) {
                    if !token.is_active {
                        return Err(SecurityError::TokenInactive);
                    }
                    if token.expires_at <= now {
                        return Err(SecurityError::TokenInactive);
                    }
                    token.last_used = Some(now);
                    token.use_count += 1;
                    return Ok(token.clone());
                }
            }
        }

        Err(SecurityError::TokenNotFound)
    }

    /// Deactivates the token named by `opaque_value` and issues a new one
    /// inheriting its user, tenant, and scopes.
    pub async fn rotate(&self, opaque_value: &str) -> Result<TokenRecord, SecurityError> {
        let (user_id, tenant_id, scopes) = {
            let mut by_user = self.by_user.write().await;
            let mut found = None;
            for tokens in by_user.values_mut() {
                for token in tokens.iter_mut() {
                    if constant_time_eq(token.opaque_value.as_bytes(), opaque_value.as_bytes()) {
                        token.is_active = false;
                        found = Some((token.user_id.clone(), token.tenant_id.clone(), token.scopes.clone()));
                        break;
                    }
                }
                if found.is_some() {
                    break;
                }
            }
            found.ok_or(SecurityError::TokenNotFound)?
        };

        self.event_listeners.emit(&SecurityEvent::TokenRotated {
            user_id: user_id.clone(),
            timestamp: Instant::now(),
        });

        #[cfg(feature = "metrics")]
        counter!("security_tokens_rotated_total").increment(1);

        Ok(self.issue(user_id, tenant_id, scopes).await)
    }

    /// Marks any active token older than `rotation_interval` as inactive,
    /// without issuing a replacement — the caller re-issues on next auth.
    pub async fn rotation_sweep(&self) -> usize {
        let now = Utc::now();
        let mut swept = 0;
        let mut by_user = self.by_user.write().await;
        for tokens in by_user.values_mut() {
            for token in tokens.iter_mut() {
                if token.is_active {
                    let age = now.signed_duration_since(token.created_at);
                    if age
                        >= chrono::Duration::from_std(self.config.rotation_interval)
                            .unwrap_or(chrono::Duration::MAX)
                    {
                        token.is_active = false;
                        swept += 1;
                    }
                }
            }
        }

        #[cfg(feature = "metrics")]
        if swept > 0 {
            counter!("security_tokens_rotation_swept_total").increment(swept as u64);
        }

        swept
    }

    /// Number of active tokens for `user_id`.
    pub async fn active_token_count(&self, user_id: &str) -> usize {
        self.by_user
            .read()
            .await
            .get(user_id)
            .map(|tokens| tokens.iter().filter(|t| t.is_active).count())
            .unwrap_or(0)
    }
}
