//! Error types for the function queue.

use thiserror::Error;

/// Errors surfaced to callers awaiting an enqueued callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Every handle to the queue was dropped before it executed, so the
    /// callback never ran.
    #[error("{namespace} - Queued function was dropped before the queue executed")]
    Dropped {
        /// Namespace of the queue that owned the callback.
        namespace: String,
    },
}
