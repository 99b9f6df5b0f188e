//! Per-provider circuit breaker registry.
//!
//! A [`CircuitBreakerRegistry`] lazily creates one [`circuit::Circuit`] per
//! provider name and routes calls through it. Each provider's breaker trips
//! independently: a failing provider cannot take down calls to a healthy one.
//!
//! ## States
//! - **Closed**: requests pass through and feed the rolling failure window.
//! - **Open**: requests are rejected immediately with
//!   [`CircuitBreakerError::Open`], without ever reaching the closure.
//! - **Half-Open**: a bounded number of probe calls are allowed through to
//!   test recovery.
//!
//! ## Example
//!
//! ```rust
//! use toolgate_circuitbreaker::CircuitBreakerConfig;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = CircuitBreakerConfig::builder()
//!     .max_requests(5)
//!     .failure_ratio(0.6)
//!     .timeout(Duration::from_secs(30))
//!     .build();
//!
//! let result = registry.execute("billing-provider", || async {
//!     Ok::<_, std::io::Error>("ok")
//! }).await?;
//! # let _ = result;
//! # Ok(())
//! # }
//! ```

pub mod circuit;
pub mod config;
pub mod error;
pub mod events;

pub use circuit::{CircuitState, ProviderHealth};
pub use config::{CircuitBreakerConfig, CircuitBreakerConfigBuilder};
pub use error::CircuitBreakerError;
pub use events::CircuitBreakerEvent;

use circuit::Circuit;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use toolgate_core::GatewayError;

/// Routes calls through a per-provider circuit breaker, creating breakers
/// lazily on first use.
///
/// All providers in a registry share the same trip thresholds (from the
/// [`CircuitBreakerConfig`] the registry was built with); each still trips
/// and recovers independently because state is tracked per provider name.
#[derive(Clone)]
pub struct CircuitBreakerRegistry {
    config: Arc<CircuitBreakerConfig>,
    circuits: Arc<DashMap<String, Mutex<Circuit>>>,
}

impl CircuitBreakerRegistry {
    pub(crate) fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config: Arc::new(config),
            circuits: Arc::new(DashMap::new()),
        }
    }

    /// Runs `f` through the named provider's breaker.
    ///
    /// If the breaker is open, returns `GatewayError::CircuitOpen` without
    /// ever calling `f`. Otherwise `f` runs and its `Ok`/`Err` outcome is fed
    /// back into the breaker; a failing `f` has its own error propagated
    /// unchanged to the caller.
    pub async fn execute<F, Fut, T>(&self, provider: &str, f: F) -> Result<T, GatewayError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        let permitted = {
            let entry = self
                .circuits
                .entry(provider.to_string())
                .or_insert_with(|| Mutex::new(Circuit::new(provider.to_string())));
            entry.lock().try_acquire(&self.config)
        };

        if !permitted {
            return Err(CircuitBreakerError::Open {
                provider: provider.to_string(),
            }
            .into());
        }

        let outcome = f().await;

        let entry = self
            .circuits
            .entry(provider.to_string())
            .or_insert_with(|| Mutex::new(Circuit::new(provider.to_string())));
        let mut circuit = entry.lock();
        match &outcome {
            Ok(_) => circuit.record_success(&self.config),
            Err(_) => circuit.record_failure(&self.config),
        }
        drop(circuit);

        outcome
    }

    /// Current state of the named provider's breaker, or `Closed` if the
    /// provider has never been seen.
    pub fn state(&self, provider: &str) -> CircuitState {
        self.circuits
            .get(provider)
            .map(|c| c.lock().state())
            .unwrap_or(CircuitState::Closed)
    }

    /// Snapshot of every provider's health record, keyed by provider name.
    pub fn health_status(&self) -> HashMap<String, ProviderHealth> {
        self.circuits
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().lock().health()))
            .collect()
    }

    /// Name this registry was configured with.
    pub fn name(&self) -> &str {
        &self.config.name
    }
}
