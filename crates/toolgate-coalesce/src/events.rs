//! Events emitted by a [`crate::Coalescer`].

use std::time::Instant;
use toolgate_core::ResilienceEvent;

/// An observable event from a coalescer.
#[derive(Debug, Clone)]
pub enum CoalesceEvent {
    /// A call became the leader for a key with no in-flight execution.
    Leading {
        key: String,
        timestamp: Instant,
    },
    /// A call joined an already in-flight execution as an observer.
    Coalesced {
        key: String,
        timestamp: Instant,
    },
    /// The leader's closure finished and the key was released.
    Finished {
        key: String,
        timestamp: Instant,
        observers: u32,
    },
}

impl ResilienceEvent for CoalesceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CoalesceEvent::Leading { .. } => "leading",
            CoalesceEvent::Coalesced { .. } => "coalesced",
            CoalesceEvent::Finished { .. } => "finished",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            CoalesceEvent::Leading { timestamp, .. }
            | CoalesceEvent::Coalesced { timestamp, .. }
            | CoalesceEvent::Finished { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            CoalesceEvent::Leading { key, .. }
            | CoalesceEvent::Coalesced { key, .. }
            | CoalesceEvent::Finished { key, .. } => key,
        }
    }
}
