//! Deferred function queue.
//!
//! [`QueueCore`] buffers callbacks until [`QueueCore::execute`] flushes them
//! once, in enqueue order. After the flush has started, callbacks bypass the
//! buffer and run inside the `enqueue` call itself.
//!
//! The core is generic over the handle type passed to callbacks, so composed
//! resources (such as a script) can hand their own handle to queued work.
//! [`FunctionQueue`] is the standalone handle whose callbacks receive the
//! queue itself.

use core::fmt;
use core::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{self, BoxFuture};
use parking_lot::Mutex;
use scriptorium_hooks::{HooksAPI, LifecycleEvent};

use crate::error::QueueError;

/// Namespace used in queue diagnostics unless overridden.
pub const DEFAULT_NAMESPACE: &str = "FunctionQueue";

type Entry<T> = Box<dyn FnOnce(T) -> BoxFuture<'static, ()> + Send>;

/// Flush state of a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueuePhase {
    /// Callbacks are buffered.
    Pending,
    /// A flush is running. New callbacks run immediately.
    Flushing,
    /// The flush finished. New callbacks run immediately.
    Executed,
}

struct QueueState<T> {
    phase: QueuePhase,
    entries: Vec<Entry<T>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// QueueCore
// ─────────────────────────────────────────────────────────────────────────────

/// Shared state of a deferred function queue.
///
/// `T` is the handle every callback receives.
pub struct QueueCore<T> {
    state: Mutex<QueueState<T>>,
    hooks: Arc<HooksAPI>,
    namespace: String,
}

impl<T> QueueCore<T>
where
    T: Clone + Send + 'static,
{
    /// Creates an empty, pending queue reporting to `hooks`.
    #[must_use]
    pub fn new(hooks: Arc<HooksAPI>, namespace: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(QueueState {
                phase: QueuePhase::Pending,
                entries: Vec::new(),
            }),
            hooks,
            namespace: namespace.into(),
        }
    }

    /// Returns the current flush state.
    #[must_use]
    pub fn phase(&self) -> QueuePhase {
        self.state.lock().phase
    }

    /// Returns `true` once a flush has completed.
    #[must_use]
    pub fn is_executed(&self) -> bool {
        self.phase() == QueuePhase::Executed
    }

    /// Number of callbacks waiting for the flush.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Returns `true` when no callback is waiting for the flush.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The hooks registry that receives [`LifecycleEvent::Executed`].
    #[must_use]
    pub fn hooks(&self) -> &Arc<HooksAPI> {
        &self.hooks
    }

    /// Namespace used in diagnostics.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Enqueues a synchronous callback.
    ///
    /// `target` is only used when the callback runs immediately; buffered
    /// callbacks receive the target given to [`execute`](Self::execute).
    pub fn enqueue<R, F>(&self, target: T, f: F) -> BoxFuture<'static, Result<R, QueueError>>
    where
        F: FnOnce(T) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.enqueue_async(target, move |target| future::ready(f(target)))
    }

    /// Enqueues a callback returning a future.
    ///
    /// The decision between buffering and running immediately is taken here,
    /// synchronously, so a callback can never be both buffered and run. A
    /// callback that runs immediately is invoked before this returns, whether
    /// or not the returned future is awaited.
    pub fn enqueue_async<R, F, Fut>(
        &self,
        target: T,
        f: F,
    ) -> BoxFuture<'static, Result<R, QueueError>>
    where
        F: FnOnce(T) -> Fut + Send + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Send + 'static,
    {
        let mut state = self.state.lock();
        if state.phase != QueuePhase::Pending {
            drop(state);
            return run_now(f(target));
        }

        let (tx, rx) = oneshot::channel();
        state.entries.push(Box::new(move |target: T| -> BoxFuture<'static, ()> {
            Box::pin(async move {
                // The caller may have dropped its future; the callback still runs.
                let _ = tx.send(f(target).await);
            })
        }));
        drop(state);

        let namespace = self.namespace.clone();
        Box::pin(async move { rx.await.map_err(|_| QueueError::Dropped { namespace }) })
    }

    /// Flushes the queue once and returns how many callbacks ran.
    ///
    /// The pending list is taken in one step when the flush starts. Callbacks
    /// enqueued while it runs are not appended; they run immediately. Calling
    /// this while a flush is running, or after one finished, is a no-op.
    pub async fn execute(&self, target: T) -> usize {
        let entries = {
            let mut state = self.state.lock();
            if state.phase != QueuePhase::Pending {
                return 0;
            }
            state.phase = QueuePhase::Flushing;
            core::mem::take(&mut state.entries)
        };

        let callbacks = entries.len();
        tracing::debug!(namespace = %self.namespace, callbacks, "flushing function queue");

        for entry in entries {
            entry(target.clone()).await;
        }

        self.state.lock().phase = QueuePhase::Executed;
        self.hooks.emit(&LifecycleEvent::Executed { callbacks });
        callbacks
    }
}

/// Drives an immediate callback as far as it goes without suspending.
///
/// Synchronous callbacks finish here, so dropping the returned future cannot
/// skip them. Work that does suspend continues when the future is polled.
fn run_now<R, Fut>(work: Fut) -> BoxFuture<'static, Result<R, QueueError>>
where
    Fut: Future<Output = R> + Send + 'static,
    R: Send + 'static,
{
    let mut work = work.boxed();
    match (&mut work).now_or_never() {
        Some(result) => Box::pin(future::ready(Ok(result))),
        None => Box::pin(async move { Ok(work.await) }),
    }
}

impl<T> fmt::Debug for QueueCore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("QueueCore")
            .field("namespace", &self.namespace)
            .field("phase", &state.phase)
            .field("pending", &state.entries.len())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Queueable
// ─────────────────────────────────────────────────────────────────────────────

/// Capability of batching callbacks until a one-time flush.
///
/// Callbacks receive a clone of the implementing handle.
pub trait Queueable: Clone + Send + Sync + 'static {
    /// Returns `true` once the queue has been flushed.
    fn is_executed(&self) -> bool;

    /// Queues a synchronous callback. The returned future resolves with its
    /// result once it has run.
    fn enqueue<R, F>(&self, f: F) -> BoxFuture<'static, Result<R, QueueError>>
    where
        F: FnOnce(Self) -> R + Send + 'static,
        R: Send + 'static;

    /// Queues a callback returning a future.
    fn enqueue_async<R, F, Fut>(&self, f: F) -> BoxFuture<'static, Result<R, QueueError>>
    where
        F: FnOnce(Self) -> Fut + Send + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Send + 'static;

    /// Runs every queued callback in order, once. Resolves with the handle.
    fn execute(&self) -> BoxFuture<'static, Self>;
}

// ─────────────────────────────────────────────────────────────────────────────
// FunctionQueue
// ─────────────────────────────────────────────────────────────────────────────

/// Standalone function queue handle.
///
/// Cloning the handle shares the same queue.
///
/// # Example
///
/// ```
/// use scriptorium_queue::{FunctionQueue, Queueable};
///
/// # tokio_test::block_on(async {
/// let queue = FunctionQueue::new();
/// let first = queue.enqueue(|_| 1);
/// let second = queue.enqueue(|_| 2);
///
/// queue.execute().await;
///
/// assert_eq!(first.await, Ok(1));
/// assert_eq!(second.await, Ok(2));
/// assert!(queue.is_executed());
/// # });
/// ```
#[derive(Clone)]
pub struct FunctionQueue {
    core: Arc<QueueCore<FunctionQueue>>,
}

impl FunctionQueue {
    /// Creates a queue with its own hooks registry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_hooks(Arc::new(HooksAPI::new()))
    }

    /// Creates a queue reporting to a shared hooks registry.
    #[must_use]
    pub fn with_hooks(hooks: Arc<HooksAPI>) -> Self {
        Self {
            core: Arc::new(QueueCore::new(hooks, DEFAULT_NAMESPACE)),
        }
    }

    /// The queue's hooks registry, for registering `OnExecuted` observers.
    #[must_use]
    pub fn hooks(&self) -> &HooksAPI {
        self.core.hooks()
    }

    /// Returns the current flush state.
    #[must_use]
    pub fn phase(&self) -> QueuePhase {
        self.core.phase()
    }

    /// Number of callbacks waiting for the flush.
    #[must_use]
    pub fn len(&self) -> usize {
        self.core.len()
    }

    /// Returns `true` when no callback is waiting for the flush.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.core.is_empty()
    }

    /// Returns `true` if both handles point at the same queue.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }
}

impl Default for FunctionQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FunctionQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FunctionQueue").field(&self.core).finish()
    }
}

impl Queueable for FunctionQueue {
    fn is_executed(&self) -> bool {
        self.core.is_executed()
    }

    fn enqueue<R, F>(&self, f: F) -> BoxFuture<'static, Result<R, QueueError>>
    where
        F: FnOnce(Self) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.core.enqueue(self.clone(), f)
    }

    fn enqueue_async<R, F, Fut>(&self, f: F) -> BoxFuture<'static, Result<R, QueueError>>
    where
        F: FnOnce(Self) -> Fut + Send + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Send + 'static,
    {
        self.core.enqueue_async(self.clone(), f)
    }

    fn execute(&self) -> BoxFuture<'static, Self> {
        let this = self.clone();
        Box::pin(async move {
            this.core.execute(this.clone()).await;
            this
        })
    }
}
