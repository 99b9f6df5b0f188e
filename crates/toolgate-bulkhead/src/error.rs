//! Error types for the bulkhead pattern.

/// Errors that can occur when acquiring a bulkhead slot.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BulkheadError {
    /// Both the active set and the wait queue are at capacity.
    #[error("bulkhead queue full: {queue_capacity} queued, max concurrent {max_concurrent}")]
    QueueFull {
        /// Configured maximum concurrent calls.
        max_concurrent: usize,
        /// Configured maximum queue depth.
        queue_capacity: usize,
    },
    /// The caller's cancellation token fired while the request was queued.
    #[error("acquire cancelled while queued")]
    Cancelled,
    /// The bulkhead has been closed and rejects all new acquisitions.
    #[error("bulkhead is closed")]
    Closed,
}

/// Result type for bulkhead operations.
pub type Result<T> = std::result::Result<T, BulkheadError>;

impl From<BulkheadError> for toolgate_core::GatewayError {
    fn from(err: BulkheadError) -> Self {
        match err {
            BulkheadError::QueueFull {
                max_concurrent,
                queue_capacity,
            } => {
                let _ = (max_concurrent, queue_capacity);
                toolgate_core::GatewayError::Overloaded
            }
            BulkheadError::Cancelled => toolgate_core::GatewayError::Timeout,
            BulkheadError::Closed => toolgate_core::GatewayError::Overloaded,
        }
    }
}
