//! Bounded-concurrency, bounded-queue admission gate.
//!
//! A bulkhead bounds how many calls may run at once (`max_concurrent`) and,
//! once that bound is reached, how many more callers may wait for a slot
//! (`queue_capacity`) before being rejected outright. Waiters are admitted in
//! FIFO order as running calls release their slot.
//!
//! # Example
//!
//! ```rust
//! use toolgate_bulkhead::BulkheadConfig;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() {
//! let bulkhead = BulkheadConfig::builder()
//!     .max_concurrent(10)
//!     .queue_capacity(5)
//!     .name("github-provider")
//!     .build();
//!
//! let cancel = CancellationToken::new();
//! let permit = bulkhead.acquire(&cancel).await.unwrap();
//! // ... do work holding `permit` ...
//! drop(permit);
//! # }
//! ```

pub mod config;
pub mod error;
pub mod events;

pub use config::{BulkheadConfig, BulkheadConfigBuilder};
pub use error::{BulkheadError, Result};
pub use events::BulkheadEvent;

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

/// A point-in-time snapshot of bulkhead occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkheadStats {
    pub active: usize,
    pub queued: usize,
    pub max_concurrent: usize,
    pub queue_capacity: usize,
    pub closed: bool,
}

enum WaiterOutcome {
    Admitted,
    Closed,
}

struct Waiter {
    id: u64,
    notify: oneshot::Sender<WaiterOutcome>,
}

struct State {
    active: usize,
    waiters: VecDeque<Waiter>,
    closed: bool,
}

struct Inner {
    max_concurrent: usize,
    queue_capacity: usize,
    config: BulkheadConfig,
    state: Mutex<State>,
}

static NEXT_WAITER_ID: AtomicU64 = AtomicU64::new(1);

/// A bounded-concurrency, bounded-queue admission gate.
#[derive(Clone)]
pub struct Bulkhead {
    inner: Arc<Inner>,
}

impl Bulkhead {
    pub(crate) fn new(config: BulkheadConfig) -> Self {
        let inner = Inner {
            max_concurrent: config.max_concurrent,
            queue_capacity: config.queue_capacity,
            state: Mutex::new(State {
                active: 0,
                waiters: VecDeque::new(),
                closed: false,
            }),
            config,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Acquires a slot, waiting on the queue if the active set is full and
    /// the queue has room. Fails immediately with
    /// [`BulkheadError::QueueFull`] if both are saturated, with
    /// [`BulkheadError::Closed`] if [`Bulkhead::close`] has run, and with
    /// [`BulkheadError::Cancelled`] if `cancel` fires while queued.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<BulkheadPermit> {
        let wait_rx = {
            let mut state = self.inner.state.lock();

            if state.closed {
                return Err(BulkheadError::Closed);
            }

            if state.active < self.inner.max_concurrent {
                state.active += 1;
                let active = state.active;
                drop(state);
                self.emit_permitted(active);
                return Ok(BulkheadPermit {
                    inner: Arc::clone(&self.inner),
                    started_at: Instant::now(),
                });
            }

            if state.waiters.len() >= self.inner.queue_capacity {
                drop(state);
                self.emit_rejected();
                return Err(BulkheadError::QueueFull {
                    max_concurrent: self.inner.max_concurrent,
                    queue_capacity: self.inner.queue_capacity,
                });
            }

            let (tx, rx) = oneshot::channel();
            let id = NEXT_WAITER_ID.fetch_add(1, Ordering::Relaxed);
            state.waiters.push_back(Waiter { id, notify: tx });
            let queued = state.waiters.len();
            drop(state);
            self.emit_queued(queued);
            (id, rx)
        };

        let (waiter_id, rx) = wait_rx;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let mut state = self.inner.state.lock();
                let before = state.waiters.len();
                state.waiters.retain(|w| w.id != waiter_id);
                let removed = state.waiters.len() != before;
                drop(state);

                if removed {
                    self.emit_cancelled();
                    return Err(BulkheadError::Cancelled);
                }
                // Already popped by a concurrent release; the waiter was
                // admitted or closed in the race window — consume that
                // outcome instead of reporting cancellation.
                match rx.await {
                    Ok(WaiterOutcome::Admitted) => {
                        let active = {
                            let state = self.inner.state.lock();
                            state.active
                        };
                        self.emit_permitted(active);
                        Ok(BulkheadPermit {
                            inner: Arc::clone(&self.inner),
                            started_at: Instant::now(),
                        })
                    }
                    Ok(WaiterOutcome::Closed) | Err(_) => Err(BulkheadError::Closed),
                }
            }
            outcome = rx => {
                match outcome {
                    Ok(WaiterOutcome::Admitted) => {
                        let active = {
                            let state = self.inner.state.lock();
                            state.active
                        };
                        self.emit_permitted(active);
                        Ok(BulkheadPermit {
                            inner: Arc::clone(&self.inner),
                            started_at: Instant::now(),
                        })
                    }
                    Ok(WaiterOutcome::Closed) | Err(_) => Err(BulkheadError::Closed),
                }
            }
        }
    }

    /// Returns a snapshot of current occupancy.
    pub fn stats(&self) -> BulkheadStats {
        let state = self.inner.state.lock();
        BulkheadStats {
            active: state.active,
            queued: state.waiters.len(),
            max_concurrent: self.inner.max_concurrent,
            queue_capacity: self.inner.queue_capacity,
            closed: state.closed,
        }
    }

    /// Closes the bulkhead: rejects all new `acquire` calls and wakes every
    /// queued waiter with [`BulkheadError::Closed`].
    pub fn close(&self) {
        let mut state = self.inner.state.lock();
        state.closed = true;
        for waiter in state.waiters.drain(..) {
            let _ = waiter.notify.send(WaiterOutcome::Closed);
        }
    }

    fn emit_permitted(&self, active: usize) {
        let event = BulkheadEvent::CallPermitted {
            pattern_name: self.inner.config.name.clone(),
            timestamp: Instant::now(),
            active,
        };
        self.inner.config.event_listeners.emit(&event);

        #[cfg(feature = "metrics")]
        {
            counter!("bulkhead_calls_permitted_total", "bulkhead" => self.inner.config.name.clone())
                .increment(1);
            gauge!("bulkhead_active_calls", "bulkhead" => self.inner.config.name.clone())
                .set(active as f64);
        }
    }

    fn emit_queued(&self, queued: usize) {
        let event = BulkheadEvent::CallQueued {
            pattern_name: self.inner.config.name.clone(),
            timestamp: Instant::now(),
            queued,
        };
        self.inner.config.event_listeners.emit(&event);

        #[cfg(feature = "metrics")]
        gauge!("bulkhead_queued_calls", "bulkhead" => self.inner.config.name.clone())
            .set(queued as f64);
    }

    fn emit_rejected(&self) {
        let event = BulkheadEvent::CallRejected {
            pattern_name: self.inner.config.name.clone(),
            timestamp: Instant::now(),
            max_concurrent: self.inner.max_concurrent,
        };
        self.inner.config.event_listeners.emit(&event);

        #[cfg(feature = "metrics")]
        counter!("bulkhead_calls_rejected_total", "bulkhead" => self.inner.config.name.clone())
            .increment(1);
    }

    fn emit_cancelled(&self) {
        let event = BulkheadEvent::CallCancelled {
            pattern_name: self.inner.config.name.clone(),
            timestamp: Instant::now(),
        };
        self.inner.config.event_listeners.emit(&event);

        #[cfg(feature = "metrics")]
        counter!("bulkhead_calls_cancelled_total", "bulkhead" => self.inner.config.name.clone())
            .increment(1);
    }
}

/// Holds one bulkhead slot; releases it (and admits the next FIFO waiter, if
/// any) on drop.
pub struct BulkheadPermit {
    inner: Arc<Inner>,
    started_at: Instant,
}

impl Drop for BulkheadPermit {
    fn drop(&mut self) {
        let duration = self.started_at.elapsed();
        let mut state = self.inner.state.lock();

        if let Some(waiter) = state.waiters.pop_front() {
            // Hand the slot directly to the next waiter; `active` is unchanged.
            let _ = waiter.notify.send(WaiterOutcome::Admitted);
        } else {
            state.active = state.active.saturating_sub(1);
        }
        let name = self.inner.config.name.clone();
        drop(state);

        let event = BulkheadEvent::CallFinished {
            pattern_name: name.clone(),
            timestamp: Instant::now(),
            duration,
        };
        self.inner.config.event_listeners.emit(&event);

        #[cfg(feature = "metrics")]
        counter!("bulkhead_calls_finished_total", "bulkhead" => name).increment(1);
    }
}
