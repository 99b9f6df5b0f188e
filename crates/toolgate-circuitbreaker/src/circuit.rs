//! Per-provider circuit breaker state machine.
//!
//! One [`Circuit`] tracks one provider's health. `Closed` accumulates
//! request/failure counts over a rolling `interval`; once `max_requests`
//! samples have accrued and the failure ratio meets `failure_ratio`, the
//! circuit trips to `Open`. After `timeout`, the next call is let through as
//! a half-open probe; `max_requests` consecutive successes close the circuit
//! again, and any failure during probing reopens it.

use crate::config::CircuitBreakerConfig;
use crate::events::CircuitBreakerEvent;
use std::time::Instant;

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

/// The three states a provider's breaker can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    fn label(self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

/// Lifetime counters exposed through `GetHealthStatus`, distinct from the
/// rolling window used internally to decide trips.
#[derive(Debug, Clone, Copy)]
pub struct ProviderHealth {
    pub state: CircuitState,
    pub total_requests: u64,
    pub total_failures: u64,
    pub consecutive_failures: u64,
    pub last_checked: Instant,
}

pub(crate) struct Circuit {
    provider: String,
    state: CircuitState,
    last_transition: Instant,
    window_started_at: Instant,
    window_requests: u64,
    window_failures: u64,
    half_open_attempts: u64,
    half_open_successes: u64,
    total_requests: u64,
    total_failures: u64,
    consecutive_failures: u64,
    last_checked: Instant,
}

impl Circuit {
    pub(crate) fn new(provider: String) -> Self {
        let now = Instant::now();
        Self {
            provider,
            state: CircuitState::Closed,
            last_transition: now,
            window_started_at: now,
            window_requests: 0,
            window_failures: 0,
            half_open_attempts: 0,
            half_open_successes: 0,
            total_requests: 0,
            total_failures: 0,
            consecutive_failures: 0,
            last_checked: now,
        }
    }

    pub(crate) fn state(&self) -> CircuitState {
        self.state
    }

    pub(crate) fn health(&self) -> ProviderHealth {
        ProviderHealth {
            state: self.state,
            total_requests: self.total_requests,
            total_failures: self.total_failures,
            consecutive_failures: self.consecutive_failures,
            last_checked: self.last_checked,
        }
    }

    /// Decides whether a call may proceed, transitioning `Open -> HalfOpen`
    /// when the cooldown has elapsed.
    pub(crate) fn try_acquire(&mut self, config: &CircuitBreakerConfig) -> bool {
        match self.state {
            CircuitState::Closed => {
                self.emit_permitted(config);
                true
            }
            CircuitState::Open => {
                if self.last_transition.elapsed() >= config.timeout {
                    self.transition_to(CircuitState::HalfOpen, config);
                    self.emit_permitted(config);
                    true
                } else {
                    self.emit_rejected(config);
                    false
                }
            }
            CircuitState::HalfOpen => {
                if self.half_open_attempts < config.max_requests {
                    self.half_open_attempts += 1;
                    self.emit_permitted(config);
                    true
                } else {
                    self.emit_rejected(config);
                    false
                }
            }
        }
    }

    pub(crate) fn record_success(&mut self, config: &CircuitBreakerConfig) {
        self.last_checked = Instant::now();
        self.total_requests += 1;
        self.consecutive_failures = 0;

        self.emit(config, CircuitBreakerEvent::SuccessRecorded {
            pattern_name: self.provider.clone(),
            timestamp: Instant::now(),
            state: self.state,
        });

        match self.state {
            CircuitState::HalfOpen => {
                self.half_open_successes += 1;
                if self.half_open_successes >= config.max_requests {
                    self.transition_to(CircuitState::Closed, config);
                }
            }
            CircuitState::Closed => {
                self.roll_window_if_expired(config);
                self.window_requests += 1;
                self.evaluate_window(config);
            }
            CircuitState::Open => {}
        }
    }

    pub(crate) fn record_failure(&mut self, config: &CircuitBreakerConfig) {
        self.last_checked = Instant::now();
        self.total_requests += 1;
        self.total_failures += 1;
        self.consecutive_failures += 1;

        self.emit(config, CircuitBreakerEvent::FailureRecorded {
            pattern_name: self.provider.clone(),
            timestamp: Instant::now(),
            state: self.state,
        });

        match self.state {
            CircuitState::HalfOpen => {
                self.transition_to(CircuitState::Open, config);
            }
            CircuitState::Closed => {
                self.roll_window_if_expired(config);
                self.window_requests += 1;
                self.window_failures += 1;
                self.evaluate_window(config);
            }
            CircuitState::Open => {}
        }
    }

    fn roll_window_if_expired(&mut self, config: &CircuitBreakerConfig) {
        if self.window_started_at.elapsed() >= config.interval {
            self.window_started_at = Instant::now();
            self.window_requests = 0;
            self.window_failures = 0;
        }
    }

    fn evaluate_window(&mut self, config: &CircuitBreakerConfig) {
        if self.window_requests < config.max_requests {
            return;
        }
        let ratio = self.window_failures as f64 / self.window_requests as f64;
        if ratio >= config.failure_ratio {
            self.transition_to(CircuitState::Open, config);
        }
    }

    fn transition_to(&mut self, state: CircuitState, config: &CircuitBreakerConfig) {
        if self.state == state {
            return;
        }
        let from_state = self.state;

        self.emit(config, CircuitBreakerEvent::StateTransition {
            pattern_name: self.provider.clone(),
            timestamp: Instant::now(),
            from_state,
            to_state: state,
        });

        #[cfg(feature = "tracing")]
        tracing::info!(
            provider = %self.provider,
            from = from_state.label(),
            to = state.label(),
            "circuit breaker state transition"
        );

        #[cfg(feature = "metrics")]
        {
            counter!(
                "circuitbreaker_transitions_total",
                "provider" => self.provider.clone(),
                "from" => from_state.label(),
                "to" => state.label()
            )
            .increment(1);
            gauge!("circuitbreaker_state", "provider" => self.provider.clone())
                .set(match state {
                    CircuitState::Closed => 0.0,
                    CircuitState::HalfOpen => 1.0,
                    CircuitState::Open => 2.0,
                });
        }

        self.state = state;
        self.last_transition = Instant::now();
        self.window_started_at = self.last_transition;
        self.window_requests = 0;
        self.window_failures = 0;
        self.half_open_attempts = 0;
        self.half_open_successes = 0;
    }

    fn emit(&self, config: &CircuitBreakerConfig, event: CircuitBreakerEvent) {
        config.event_listeners.emit(&event);
    }

    fn emit_permitted(&self, config: &CircuitBreakerConfig) {
        self.emit(config, CircuitBreakerEvent::CallPermitted {
            pattern_name: self.provider.clone(),
            timestamp: Instant::now(),
            state: self.state,
        });

        #[cfg(feature = "metrics")]
        counter!("circuitbreaker_calls_permitted_total", "provider" => self.provider.clone())
            .increment(1);
    }

    fn emit_rejected(&self, config: &CircuitBreakerConfig) {
        self.emit(config, CircuitBreakerEvent::CallRejected {
            pattern_name: self.provider.clone(),
            timestamp: Instant::now(),
        });

        #[cfg(feature = "metrics")]
        counter!("circuitbreaker_calls_rejected_total", "provider" => self.provider.clone())
            .increment(1);
    }
}
