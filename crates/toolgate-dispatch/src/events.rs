//! Events emitted by the dispatch adapter, distinct from the lower-level
//! events each wrapped component (bulkhead, breaker, coalescer, ...)
//! already emits on its own stream.

use std::time::Instant;
use toolgate_core::ResilienceEvent;

#[derive(Debug, Clone)]
pub enum DispatchEvent {
    /// One `ExecuteOperation` call finished, successfully or not.
    OperationCompleted {
        provider: String,
        operation: String,
        outcome: &'static str,
        coalesced: bool,
        duration: std::time::Duration,
        timestamp: Instant,
    },
    /// The provider handle cache resolved (or re-resolved) a template's
    /// provider name.
    ProviderResolved {
        provider: String,
        cached: bool,
        timestamp: Instant,
    },
}

impl ResilienceEvent for DispatchEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DispatchEvent::OperationCompleted { .. } => "operation_completed",
            DispatchEvent::ProviderResolved { .. } => "provider_resolved",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            DispatchEvent::OperationCompleted { timestamp, .. }
            | DispatchEvent::ProviderResolved { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            DispatchEvent::OperationCompleted { provider, .. }
            | DispatchEvent::ProviderResolved { provider, .. } => provider,
        }
    }
}
