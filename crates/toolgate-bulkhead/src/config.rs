//! Configuration for the bulkhead pattern.

use crate::events::BulkheadEvent;
use toolgate_core::events::{EventListeners, FnListener};

/// Configuration for one bulkhead instance.
#[derive(Clone)]
pub struct BulkheadConfig {
    /// Maximum number of calls allowed to run concurrently.
    pub(crate) max_concurrent: usize,
    /// Maximum number of callers allowed to wait once `max_concurrent` is reached.
    pub(crate) queue_capacity: usize,
    /// Name of this bulkhead instance, used in events, metrics, and logs.
    pub(crate) name: String,
    /// Event listeners.
    pub(crate) event_listeners: EventListeners<BulkheadEvent>,
}

impl BulkheadConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> BulkheadConfigBuilder {
        BulkheadConfigBuilder::new()
    }
}

/// Builder for [`BulkheadConfig`].
pub struct BulkheadConfigBuilder {
    max_concurrent: usize,
    queue_capacity: usize,
    name: String,
    event_listeners: EventListeners<BulkheadEvent>,
}

impl BulkheadConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            max_concurrent: 25,
            queue_capacity: 0,
            name: "bulkhead".to_string(),
            event_listeners: EventListeners::new(),
        }
    }

    /// Sets the maximum number of calls that may run concurrently.
    ///
    /// Default: 25
    pub fn max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max;
        self
    }

    /// Sets the maximum number of callers that may wait once capacity is
    /// reached. Callers beyond this bound are rejected immediately with
    /// [`crate::BulkheadError::QueueFull`].
    ///
    /// Default: 0 (no queueing — reject as soon as `max_concurrent` is reached)
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Sets the name of this bulkhead instance.
    ///
    /// Default: "bulkhead"
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked when a call acquires a slot and begins
    /// running.
    pub fn on_call_permitted<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let BulkheadEvent::CallPermitted { active, .. } = event {
                f(*active);
            }
        }));
        self
    }

    /// Registers a callback invoked when a call is rejected because both the
    /// active set and the queue are full.
    pub fn on_call_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let BulkheadEvent::CallRejected {
                max_concurrent, ..
            } = event
            {
                f(*max_concurrent);
            }
        }));
        self
    }

    /// Registers a callback invoked when a permitted call releases its slot.
    pub fn on_call_finished<F>(mut self, f: F) -> Self
    where
        F: Fn(std::time::Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let BulkheadEvent::CallFinished { duration, .. } = event {
                f(*duration);
            }
        }));
        self
    }

    /// Builds a [`crate::Bulkhead`] from this configuration.
    pub fn build(self) -> crate::Bulkhead {
        let config = BulkheadConfig {
            max_concurrent: self.max_concurrent,
            queue_capacity: self.queue_capacity,
            name: self.name,
            event_listeners: self.event_listeners,
        };
        crate::Bulkhead::new(config)
    }
}

impl Default for BulkheadConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
