//! Configuration for a [`crate::Coalescer`].

use crate::events::CoalesceEvent;
use toolgate_core::events::{EventListeners, FnListener};

/// Configuration shared by every key a [`crate::Coalescer`] tracks.
#[derive(Clone)]
pub struct CoalesceConfig {
    /// Name used in events, metrics, and logs.
    pub(crate) name: String,
    pub(crate) event_listeners: EventListeners<CoalesceEvent>,
}

impl CoalesceConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> CoalesceConfigBuilder {
        CoalesceConfigBuilder::new()
    }
}

/// Builder for [`CoalesceConfig`].
pub struct CoalesceConfigBuilder {
    name: String,
    event_listeners: EventListeners<CoalesceEvent>,
}

impl CoalesceConfigBuilder {
    pub fn new() -> Self {
        Self {
            name: "coalescer".to_string(),
            event_listeners: EventListeners::new(),
        }
    }

    /// Default: "coalescer"
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked whenever a caller joins an in-flight
    /// call as an observer rather than the leader.
    pub fn on_coalesced<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CoalesceEvent::Coalesced { key, .. } = event {
                f(key);
            }
        }));
        self
    }

    /// Builds a [`crate::Coalescer<T>`] from this configuration.
    pub fn build<T>(self) -> crate::Coalescer<T> {
        let config = CoalesceConfig {
            name: self.name,
            event_listeners: self.event_listeners,
        };
        crate::Coalescer::new(config)
    }
}

impl Default for CoalesceConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
