//! Symmetric authenticated encryption with versioned key rotation.
//!
//! Ciphertext layout: `key_version(1 byte) ‖ nonce(12 bytes) ‖ sealed_payload`.
//! Decryption looks the key version up in the rotation history, so payloads
//! sealed before a rotation remain readable until the key is evicted.

use crate::error::SecurityError;
use crate::events::SecurityEvent;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use toolgate_core::events::EventListeners;

#[cfg(feature = "metrics")]
use metrics::counter;

const NONCE_LEN: usize = 12;

struct KeyEntry {
    version: u8,
    cipher: Aes256Gcm,
}

/// Configuration for an [`EncryptionEnvelope`].
#[derive(Clone)]
pub struct EncryptionConfig {
    pub key_rotation_interval: Duration,
    /// How many retired keys stay decryptable before eviction.
    pub max_key_history: usize,
}

impl Default for EncryptionConfig {
    fn default() -> Self {
        Self {
            key_rotation_interval: Duration::from_secs(24 * 3600),
            max_key_history: 3,
        }
    }
}

/// Seals and opens payloads under a rotating AES-256-GCM key.
pub struct EncryptionEnvelope {
    config: EncryptionConfig,
    keys: RwLock<VecDeque<KeyEntry>>,
    next_version: RwLock<u8>,
    event_listeners: EventListeners<SecurityEvent>,
}

impl EncryptionEnvelope {
    pub fn new(config: EncryptionConfig) -> Self {
        Self::with_listeners(config, EventListeners::new())
    }

    pub(crate) fn with_listeners(
        config: EncryptionConfig,
        event_listeners: EventListeners<SecurityEvent>,
    ) -> Self {
        let initial = KeyEntry {
            version: 0,
            cipher: Aes256Gcm::new(&Aes256Gcm::generate_key(OsRng)),
        };
        Self {
            config,
            keys: RwLock::new(VecDeque::from([initial])),
            next_version: RwLock::new(1),
            event_listeners,
        }
    }

    /// Generates a fresh key, making it the active (most recent) one.
    /// Older keys remain decryptable until `max_key_history` is exceeded.
    pub fn rotate_key(&self) {
        let mut version = self.next_version.write();
        let entry = KeyEntry {
            version: *version,
            cipher: Aes256Gcm::new(&Aes256Gcm::generate_key(OsRng)),
        };
        *version = version.wrapping_add(1);
        drop(version);

        let mut keys = self.keys.write();
        keys.push_back(entry);
        while keys.len() > self.config.max_key_history {
            keys.pop_front();
        }
        drop(keys);

        self.event_listeners.emit(&SecurityEvent::KeyRotated {
            timestamp: Instant::now(),
        });

        #[cfg(feature = "metrics")]
        counter!("security_key_rotations_total").increment(1);
    }

    /// Seals `plaintext` under the currently active key.
    pub fn seal(&self, plaintext: &[u8]) -> Result<String, SecurityError> {
        let keys = self.keys.read();
        let active = keys.back().ok_or(SecurityError::CryptoFailure)?;

        let key_bytes: [u8; 12] = rand::random();
        let nonce = Nonce::from_slice(&key_bytes[..NONCE_LEN]);

        let ciphertext = active
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| SecurityError::CryptoFailure)?;

        let mut out = Vec::with_capacity(1 + NONCE_LEN + ciphertext.len());
        out.push(active.version);
        out.extend_from_slice(&key_bytes[..NONCE_LEN]);
        out.extend_from_slice(&ciphertext);

        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(out))
    }

    /// Opens a payload produced by [`Self::seal`], looking the key version
    /// up in the rotation history.
    pub fn open(&self, sealed: &str) -> Result<Vec<u8>, SecurityError> {
        let raw = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(sealed)
            .map_err(|_| SecurityError::CryptoFailure)?;

        if raw.len() < 1 + NONCE_LEN {
            return Err(SecurityError::CryptoFailure);
        }

        let version = raw[0];
        let nonce = Nonce::from_slice(&raw[1..1 + NONCE_LEN]);
        let ciphertext = &raw[1 + NONCE_LEN..];

        let keys = self.keys.read();
        let entry = keys
            .iter()
            .find(|k| k.version == version)
            .ok_or(SecurityError::UnknownKeyVersion { version })?;

        entry
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| SecurityError::CryptoFailure)
    }
}
