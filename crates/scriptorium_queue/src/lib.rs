//! Deferred function queue for Scriptorium (Layer 1).
//!
//! A function queue batches callbacks and runs them exactly once, in enqueue
//! order, when the queue is executed. Anything enqueued after the flush has
//! started runs immediately instead of being buffered.
//!
//! # Core Concepts
//!
//! - [`QueueCore`] - Generic queue state, parameterised by the handle passed
//!   to callbacks
//! - [`Queueable`] - Capability trait implemented by queue-owning handles
//! - [`FunctionQueue`] - Standalone queue handle
//!
//! # Example
//!
//! ```
//! use scriptorium_queue::{FunctionQueue, Queueable};
//!
//! # tokio_test::block_on(async {
//! let queue = FunctionQueue::new();
//! let greeting = queue.enqueue_async(|_| async { "ready" });
//!
//! queue.execute().await;
//! assert_eq!(greeting.await, Ok("ready"));
//!
//! // Already executed: runs straight away.
//! assert_eq!(queue.enqueue(|_| 42).await, Ok(42));
//! # });
//! ```

mod error;
mod queue;

pub use error::QueueError;
pub use queue::{DEFAULT_NAMESPACE, FunctionQueue, QueueCore, QueuePhase, Queueable};
