//! Single-flight request coalescing.
//!
//! Concurrent calls sharing the same key execute one underlying closure:
//! the first caller to arrive becomes the leader and runs it, every other
//! caller observes the leader's result instead of running its own. Once the
//! closure returns, the key is released; the next call for that key starts
//! a fresh execution. There is no caching beyond the in-flight window.
//!
//! # Example
//!
//! ```rust
//! use toolgate_coalesce::CoalesceConfig;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let coalescer = CoalesceConfig::builder().name("provider-calls").build::<String>();
//! let cancel = CancellationToken::new();
//!
//! let (value, shared) = coalescer
//!     .coalesce("fingerprint-abc", &cancel, || async {
//!         Ok::<_, toolgate_core::GatewayError>("provider response".to_string())
//!     })
//!     .await?;
//! # let _ = (value, shared);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod events;

pub use config::{CoalesceConfig, CoalesceConfigBuilder};
pub use error::CoalesceError;
pub use events::CoalesceEvent;

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use toolgate_core::GatewayError;

#[cfg(feature = "metrics")]
use metrics::counter;

type Shared<T> = Result<Arc<T>, Arc<GatewayError>>;

/// Deduplicates concurrent calls that share a key.
///
/// `T` is the type every closure run through this coalescer resolves to; in
/// the gateway this is the provider's operation response. Both the success
/// value and the error are shared between observers through an `Arc`, so no
/// bound beyond `Send + Sync + 'static` is required on `T`.
pub struct Coalescer<T> {
    inflight: Arc<Mutex<HashMap<String, broadcast::Sender<Shared<T>>>>>,
    config: CoalesceConfig,
}

impl<T> Clone for Coalescer<T> {
    fn clone(&self) -> Self {
        Self {
            inflight: self.inflight.clone(),
            config: self.config.clone(),
        }
    }
}

impl<T> Coalescer<T>
where
    T: Send + Sync + 'static,
{
    pub(crate) fn new(config: CoalesceConfig) -> Self {
        Self {
            inflight: Arc::new(Mutex::new(HashMap::new())),
            config,
        }
    }

    /// Number of keys currently in flight.
    pub fn in_flight_count(&self) -> usize {
        self.inflight.lock().len()
    }

    /// Runs `f` under single-flight coalescing keyed by `key`.
    ///
    /// Returns the shared value and a `shared` flag: `true` if this caller
    /// observed another caller's execution rather than running `f` itself.
    /// `cancel` only interrupts this caller's own wait; an in-flight
    /// execution keeps running to completion for any other observers.
    pub async fn coalesce<F, Fut>(
        &self,
        key: &str,
        cancel: &CancellationToken,
        f: F,
    ) -> Result<(Arc<T>, bool), CoalesceError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, GatewayError>> + Send + 'static,
    {
        let (mut rx, leader_tx) = {
            let mut map = self.inflight.lock();
            if let Some(tx) = map.get(key) {
                (tx.subscribe(), None)
            } else {
                let (tx, rx) = broadcast::channel(1);
                map.insert(key.to_string(), tx.clone());
                (rx, Some(tx))
            }
        };

        let is_leader = leader_tx.is_some();

        if let Some(tx) = leader_tx {
            self.emit_leading(key);
            let inflight = self.inflight.clone();
            let key_owned = key.to_string();
            let config = self.config.clone();
            tokio::spawn(async move {
                let outcome: Shared<T> = match f().await {
                    Ok(value) => Ok(Arc::new(value)),
                    Err(err) => Err(Arc::new(err)),
                };
                inflight.lock().remove(&key_owned);
                let observers = tx.receiver_count().saturating_sub(1) as u32;
                let _ = tx.send(outcome);

                config.event_listeners.emit(&CoalesceEvent::Finished {
                    key: key_owned,
                    timestamp: std::time::Instant::now(),
                    observers,
                });
            });
        } else {
            self.emit_coalesced(key);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CoalesceError::Cancelled),
            received = rx.recv() => match received {
                Ok(Ok(value)) => Ok((value, !is_leader)),
                Ok(Err(err)) => Err(CoalesceError::Failed(err)),
                Err(_) => Err(CoalesceError::LeaderLost),
            },
        }
    }

    fn emit_leading(&self, key: &str) {
        self.config.event_listeners.emit(&CoalesceEvent::Leading {
            key: key.to_string(),
            timestamp: std::time::Instant::now(),
        });

        #[cfg(feature = "tracing")]
        tracing::debug!(coalescer = %self.config.name, key, "leading coalesced call");

        #[cfg(feature = "metrics")]
        counter!("coalesce_leading_total", "name" => self.config.name.clone()).increment(1);
    }

    fn emit_coalesced(&self, key: &str) {
        self.config
            .event_listeners
            .emit(&CoalesceEvent::Coalesced {
                key: key.to_string(),
                timestamp: std::time::Instant::now(),
            });

        #[cfg(feature = "tracing")]
        tracing::debug!(coalescer = %self.config.name, key, "joined in-flight call");

        #[cfg(feature = "metrics")]
        counter!("coalesce_coalesced_total", "name" => self.config.name.clone()).increment(1);
    }
}
