//! Events emitted by the bulkhead as calls are permitted, queued, rejected,
//! or finish.

use std::time::{Duration, Instant};
use toolgate_core::ResilienceEvent;

/// An observable event from a bulkhead instance.
#[derive(Debug, Clone)]
pub enum BulkheadEvent {
    /// A call acquired a slot and is running.
    CallPermitted {
        pattern_name: String,
        timestamp: Instant,
        active: usize,
    },
    /// A call was placed on the wait queue.
    CallQueued {
        pattern_name: String,
        timestamp: Instant,
        queued: usize,
    },
    /// A call was rejected because the queue was also full.
    CallRejected {
        pattern_name: String,
        timestamp: Instant,
        max_concurrent: usize,
    },
    /// A queued call's cancellation fired before it was admitted.
    CallCancelled {
        pattern_name: String,
        timestamp: Instant,
    },
    /// A permitted call finished and released its slot.
    CallFinished {
        pattern_name: String,
        timestamp: Instant,
        duration: Duration,
    },
}

impl ResilienceEvent for BulkheadEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BulkheadEvent::CallPermitted { .. } => "call_permitted",
            BulkheadEvent::CallQueued { .. } => "call_queued",
            BulkheadEvent::CallRejected { .. } => "call_rejected",
            BulkheadEvent::CallCancelled { .. } => "call_cancelled",
            BulkheadEvent::CallFinished { .. } => "call_finished",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            BulkheadEvent::CallPermitted { timestamp, .. }
            | BulkheadEvent::CallQueued { timestamp, .. }
            | BulkheadEvent::CallRejected { timestamp, .. }
            | BulkheadEvent::CallCancelled { timestamp, .. }
            | BulkheadEvent::CallFinished { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            BulkheadEvent::CallPermitted { pattern_name, .. }
            | BulkheadEvent::CallQueued { pattern_name, .. }
            | BulkheadEvent::CallRejected { pattern_name, .. }
            | BulkheadEvent::CallCancelled { pattern_name, .. }
            | BulkheadEvent::CallFinished { pattern_name, .. } => pattern_name,
        }
    }
}
