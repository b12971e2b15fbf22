//! Script: a basic script composed with a one-time initialization queue.
//!
//! Work enqueued on a [`Script`] waits until the script is initialized. A
//! successful load initializes automatically before the load future
//! resolves; [`Initializable::initialize`] can also be called on its own for
//! scripts used purely to batch callbacks.
//!
//! Nobody sees the script ready before its queue has flushed: `load()` and
//! `initialize()` wait for a running initialization. The one exception is the
//! handle given to queued callbacks, which would otherwise wait on itself.

use core::fmt;
use core::future::Future;
use std::sync::{Arc, Weak};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared, WeakShared};
use parking_lot::Mutex;
use scriptorium_hooks::{HooksAPI, LifecycleEvent};
use scriptorium_queue::{QueueCore, QueueError, QueuePhase, Queueable};

use crate::basic::{AfterLoad, BasicScript};
use crate::error::{DependencyError, LoadError};
use crate::fetch::{ScriptElement, ScriptFetcher};
use crate::loadable::{Dependency, DependencyKind, LoadPhase, Loadable};
use crate::validate::is_valid_src;

/// Namespace used in script diagnostics unless overridden.
pub const DEFAULT_NAMESPACE: &str = "Script";

/// Initialization state of a [`Script`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitPhase {
    /// Queue not yet flushed.
    #[default]
    Pending,
    /// The queue is flushing.
    Initializing,
    /// Initialization finished.
    Initialized,
}

/// Capability of running deferred work once, on initialization.
pub trait Initializable: Send + Sync + 'static {
    /// Whether initialization has finished.
    fn is_initialized(&self) -> bool;

    /// Flushes the queue and marks the resource initialized.
    ///
    /// Fires `OnInitialized` the first time only. Calls made while
    /// initialization is running wait for it to finish, except from the
    /// handle passed to queued callbacks.
    fn initialize(&self) -> BoxFuture<'static, ()>;
}

type FlushFuture = BoxFuture<'static, ()>;

struct InitState {
    phase: InitPhase,
    /// The running flush, kept alive only by the futures awaiting it.
    flush: Option<WeakShared<FlushFuture>>,
}

struct ScriptInner {
    script: BasicScript,
    queue: QueueCore<Script>,
    init: Mutex<InitState>,
}

/// A loadable script with a deferred function queue.
///
/// Cloning shares the same script. Enqueued callbacks receive a clone of the
/// script once it is initialized.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use scriptorium_script::{FetchError, Initializable, Loadable, Script, ScriptFetcher};
/// use scriptorium_queue::Queueable;
///
/// struct AlwaysOk;
///
/// #[async_trait]
/// impl ScriptFetcher for AlwaysOk {
///     async fn fetch(&self, _src: &str) -> Result<(), FetchError> {
///         Ok(())
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let script = Script::new(Arc::new(AlwaysOk));
/// script.set_src("//cdn.example/widget.js");
///
/// let ready = script.enqueue(|script: Script| script.src());
/// script.load().await.unwrap();
///
/// assert!(script.is_initialized());
/// assert_eq!(ready.await.unwrap(), "//cdn.example/widget.js");
/// # });
/// ```
#[derive(Clone)]
pub struct Script {
    inner: Arc<ScriptInner>,
    /// Set on handles given to queued callbacks.
    in_flush: bool,
}

impl Script {
    /// Creates an idle, enabled, uninitialized script with its own hooks
    /// registry.
    #[must_use]
    pub fn new(fetcher: Arc<dyn ScriptFetcher>) -> Self {
        Self::build(fetcher, Arc::new(HooksAPI::new()), DEFAULT_NAMESPACE.to_string())
    }

    /// Creates a script from a bare string, keeping it only if it is a valid
    /// source.
    #[must_use]
    pub fn from_src(fetcher: Arc<dyn ScriptFetcher>, candidate: &str) -> Self {
        let script = Self::new(fetcher);
        if is_valid_src(candidate) {
            script.set_src(candidate);
        }
        script
    }

    pub(crate) fn build(fetcher: Arc<dyn ScriptFetcher>, hooks: Arc<HooksAPI>, namespace: String) -> Self {
        let inner = Arc::new_cyclic(|weak: &Weak<ScriptInner>| {
            let weak = weak.clone();
            let after_load: AfterLoad = Arc::new(move || -> BoxFuture<'static, ()> {
                let weak = weak.clone();
                Box::pin(async move {
                    if let Some(inner) = weak.upgrade() {
                        Script {
                            inner,
                            in_flush: false,
                        }
                        .initialize()
                        .await;
                    }
                })
            });

            ScriptInner {
                script: BasicScript::build(fetcher, Arc::clone(&hooks), namespace.clone(), Some(after_load)),
                queue: QueueCore::new(hooks, namespace),
                init: Mutex::new(InitState {
                    phase: InitPhase::Pending,
                    flush: None,
                }),
            }
        });
        Self {
            inner,
            in_flush: false,
        }
    }

    fn flush_handle(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            in_flush: true,
        }
    }

    async fn flush(self) {
        let callbacks = self.inner.queue.execute(self.flush_handle()).await;
        {
            let mut init = self.inner.init.lock();
            init.phase = InitPhase::Initialized;
            init.flush = None;
        }

        let src = self.src();
        tracing::debug!(namespace = %self.namespace(), %src, callbacks, "script initialized");
        self.hooks().emit(&LifecycleEvent::Initialized { src });
    }

    /// The underlying basic script.
    #[must_use]
    pub fn basic(&self) -> &BasicScript {
        &self.inner.script
    }

    /// The hooks registry shared by the load and queue lifecycles.
    #[must_use]
    pub fn hooks(&self) -> &HooksAPI {
        self.inner.script.hooks()
    }

    /// Namespace used in diagnostics.
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.inner.script.namespace()
    }

    /// Element descriptor for the current source.
    #[must_use]
    pub fn element(&self) -> ScriptElement {
        self.inner.script.element()
    }

    /// The current initialization state.
    #[must_use]
    pub fn init_phase(&self) -> InitPhase {
        self.inner.init.lock().phase
    }

    /// The queue's flush state.
    #[must_use]
    pub fn queue_phase(&self) -> QueuePhase {
        self.inner.queue.phase()
    }

    /// Number of callbacks waiting for initialization.
    #[must_use]
    pub fn pending_callbacks(&self) -> usize {
        self.inner.queue.len()
    }

    /// Returns `true` if both handles point at the same script.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Initializable for Script {
    fn is_initialized(&self) -> bool {
        self.init_phase() == InitPhase::Initialized
    }

    fn initialize(&self) -> BoxFuture<'static, ()> {
        let this = self.clone();
        Box::pin(async move {
            let flush: Shared<FlushFuture> = {
                let mut init = this.inner.init.lock();
                match init.phase {
                    InitPhase::Initialized => return,
                    InitPhase::Initializing if this.in_flush => return,
                    InitPhase::Initializing => {
                        match init.flush.as_ref().and_then(WeakShared::upgrade) {
                            Some(flush) => flush,
                            // Abandoned mid-flush; the taken callbacks are gone.
                            None => return,
                        }
                    }
                    InitPhase::Pending => {
                        let flush = this.clone().flush().boxed().shared();
                        init.phase = InitPhase::Initializing;
                        init.flush = flush.downgrade();
                        flush
                    }
                }
            };
            flush.await;
        })
    }
}

impl Loadable for Script {
    fn src(&self) -> String {
        self.inner.script.src()
    }

    fn set_src(&self, src: impl Into<String>) -> &Self {
        self.inner.script.set_src(src);
        self
    }

    fn phase(&self) -> LoadPhase {
        self.inner.script.phase()
    }

    fn is_enabled(&self) -> bool {
        self.inner.script.is_enabled()
    }

    fn has_dependencies(&self) -> bool {
        self.inner.script.has_dependencies()
    }

    fn enable(&self) -> &Self {
        self.inner.script.enable();
        self
    }

    fn disable(&self) -> &Self {
        self.inner.script.disable();
        self
    }

    fn add_dependency<D>(&self, dependency: D, kind: DependencyKind) -> Result<&Self, DependencyError>
    where
        D: Dependency + 'static,
    {
        self.inner.script.add_dependency(dependency, kind)?;
        Ok(self)
    }

    /// Loads the script, resolving once it is initialized.
    fn load(&self) -> BoxFuture<'static, Result<Self, LoadError>> {
        let load = self.inner.script.load();
        let this = self.clone();
        Box::pin(async move {
            load.await?;
            this.initialize().await;
            Ok(this)
        })
    }
}

impl Queueable for Script {
    fn is_executed(&self) -> bool {
        self.inner.queue.is_executed()
    }

    fn enqueue<R, F>(&self, f: F) -> BoxFuture<'static, Result<R, QueueError>>
    where
        F: FnOnce(Self) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.inner.queue.enqueue(self.clone(), f)
    }

    fn enqueue_async<R, F, Fut>(&self, f: F) -> BoxFuture<'static, Result<R, QueueError>>
    where
        F: FnOnce(Self) -> Fut + Send + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Send + 'static,
    {
        self.inner.queue.enqueue_async(self.clone(), f)
    }

    /// Same as [`Initializable::initialize`], resolving with the script.
    fn execute(&self) -> BoxFuture<'static, Self> {
        let this = self.clone();
        Box::pin(async move {
            this.initialize().await;
            this
        })
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Script")
            .field("script", &self.inner.script)
            .field("queue", &self.inner.queue)
            .field("init", &self.init_phase())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use scriptorium_hooks::schedule::OnInitialized;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NoopFetcher;

    #[async_trait]
    impl ScriptFetcher for NoopFetcher {
        async fn fetch(&self, _src: &str) -> Result<(), FetchError> {
            Ok(())
        }
    }

    fn script() -> Script {
        Script::new(Arc::new(NoopFetcher))
    }

    #[test]
    fn starts_uninitialized() {
        let script = script();
        assert!(!script.is_initialized());
        assert_eq!(script.init_phase(), InitPhase::Pending);
        assert!(!script.is_executed());
        assert_eq!(script.namespace(), DEFAULT_NAMESPACE);
    }

    #[tokio::test]
    async fn initialize_marks_initialized() {
        let script = script();
        script.initialize().await;
        assert!(script.is_initialized());
        assert!(script.is_executed());
    }

    #[tokio::test]
    async fn initialize_flushes_queue_once() {
        let script = script();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let _queued = script.enqueue(move |_| counter.fetch_add(1, Ordering::SeqCst));

        script.initialize().await;
        script.initialize().await;

        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn on_initialized_fires_once() {
        let script = script();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        script
            .hooks()
            .register_observer::<OnInitialized, _>("count", move |_: &LifecycleEvent| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        script.initialize().await;
        script.initialize().await;

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn load_initializes_before_resolving() {
        let script = script();
        script.set_src("//cdn.example/a.js");
        let queued = script.enqueue(|script: Script| script.is_loaded());

        let loaded = script.load().await.unwrap();

        assert!(loaded.ptr_eq(&script));
        assert!(script.is_initialized());
        assert_eq!(queued.await, Ok(true));
    }

    #[tokio::test]
    async fn failed_load_does_not_initialize() {
        struct Failing;

        #[async_trait]
        impl ScriptFetcher for Failing {
            async fn fetch(&self, _src: &str) -> Result<(), FetchError> {
                Err(FetchError::new("Failed loading"))
            }
        }

        let script = Script::new(Arc::new(Failing));
        script.set_src("//cdn.example/a.js");
        let _queued = script.enqueue(|_| ());

        assert!(script.load().await.is_err());
        assert!(script.is_errored());
        assert!(!script.is_initialized());
        assert_eq!(script.pending_callbacks(), 1);
    }
}
