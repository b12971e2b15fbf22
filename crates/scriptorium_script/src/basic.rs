//! Basic script: a loadable resource without an initialization queue.

use core::fmt;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture, Shared, WeakShared};
use parking_lot::Mutex;
use scriptorium_hooks::{HooksAPI, LifecycleEvent};

use crate::context::contextual_warning;
use crate::error::{DependencyError, LoadError};
use crate::fetch::{ScriptElement, ScriptFetcher};
use crate::loadable::{Dependency, DependencyKind, LoadPhase, Loadable};
use crate::validate::is_valid_src;

/// Namespace used in basic script diagnostics unless overridden.
pub const DEFAULT_NAMESPACE: &str = "BasicScript";

type LoadFuture = BoxFuture<'static, Result<(), LoadError>>;
type SharedLoad = Shared<LoadFuture>;

/// Step awaited after a successful load, before the shared load future
/// resolves.
pub(crate) type AfterLoad = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

struct LoadState {
    enabled: bool,
    phase: LoadPhase,
    src: String,
    soft: Vec<Arc<dyn Dependency>>,
    hard: Vec<Arc<dyn Dependency>>,
    /// The running load, kept alive only by the futures awaiting it.
    in_flight: Option<WeakShared<LoadFuture>>,
    /// Bumped by every load cycle.
    cycle: u64,
}

struct ScriptCore {
    state: Mutex<LoadState>,
    fetcher: Arc<dyn ScriptFetcher>,
    hooks: Arc<HooksAPI>,
    namespace: String,
    after_load: Option<AfterLoad>,
}

/// Outcome of the synchronous part of `load()`.
enum Start {
    Loaded,
    Wait(SharedLoad),
}

/// A script that loads once, with soft and hard dependencies.
///
/// Cloning shares the same script.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use scriptorium_script::{BasicScript, FetchError, Loadable, ScriptFetcher};
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
/// let script = BasicScript::new(Arc::new(AlwaysOk));
/// script.set_src("https://good.example/a.js");
///
/// let loaded = script.load().await.unwrap();
/// assert!(loaded.ptr_eq(&script));
/// assert!(script.is_loaded());
/// # });
/// ```
#[derive(Clone)]
pub struct BasicScript {
    core: Arc<ScriptCore>,
}

impl BasicScript {
    /// Creates an idle, enabled script with an empty source and its own hooks
    /// registry.
    #[must_use]
    pub fn new(fetcher: Arc<dyn ScriptFetcher>) -> Self {
        Self::build(fetcher, Arc::new(HooksAPI::new()), DEFAULT_NAMESPACE.to_string(), None)
    }

    /// Creates a script from a bare string.
    ///
    /// The candidate becomes the source only if
    /// [`is_valid_src`](crate::is_valid_src) accepts it; otherwise the source
    /// stays empty.
    #[must_use]
    pub fn from_src(fetcher: Arc<dyn ScriptFetcher>, candidate: &str) -> Self {
        let script = Self::new(fetcher);
        if is_valid_src(candidate) {
            script.set_src(candidate);
        }
        script
    }

    pub(crate) fn build(
        fetcher: Arc<dyn ScriptFetcher>,
        hooks: Arc<HooksAPI>,
        namespace: String,
        after_load: Option<AfterLoad>,
    ) -> Self {
        Self {
            core: Arc::new(ScriptCore {
                state: Mutex::new(LoadState {
                    enabled: true,
                    phase: LoadPhase::Idle,
                    src: String::new(),
                    soft: Vec::new(),
                    hard: Vec::new(),
                    in_flight: None,
                    cycle: 0,
                }),
                fetcher,
                hooks,
                namespace,
                after_load,
            }),
        }
    }

    /// The hooks registry lifecycle events are delivered to.
    #[must_use]
    pub fn hooks(&self) -> &HooksAPI {
        &self.core.hooks
    }

    /// Namespace used in diagnostics.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.core.namespace
    }

    /// Element descriptor for the current source.
    #[must_use]
    pub fn element(&self) -> ScriptElement {
        ScriptElement::new(self.src())
    }

    /// Returns `true` if both handles point at the same script.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }

    fn set_enabled(&self, enabled: bool) {
        let src = {
            let mut state = self.core.state.lock();
            state.enabled = enabled;
            state.src.clone()
        };
        let event = if enabled {
            LifecycleEvent::Enabled { src }
        } else {
            LifecycleEvent::Disabled { src }
        };
        self.core.hooks.emit(&event);
    }

    /// Applies the entry checks of `load()` and, when a new load is needed,
    /// moves to `Loading` and creates the shared driver.
    fn start(&self) -> Result<Start, LoadError> {
        let mut state = self.core.state.lock();
        if !state.enabled {
            return Err(LoadError::Disabled {
                namespace: self.core.namespace.clone(),
                src: state.src.clone(),
            });
        }
        if state.phase == LoadPhase::Loaded {
            return Ok(Start::Loaded);
        }
        if state.src.is_empty() {
            return Err(LoadError::EmptySource {
                namespace: self.core.namespace.clone(),
            });
        }
        if state.phase == LoadPhase::Loading
            && let Some(in_flight) = state.in_flight.as_ref().and_then(WeakShared::upgrade)
        {
            return Ok(Start::Wait(in_flight));
        }

        state.cycle += 1;
        let guard = CycleGuard {
            core: Arc::clone(&self.core),
            cycle: state.cycle,
            resume: match state.phase {
                LoadPhase::Loading => LoadPhase::Idle,
                phase => phase,
            },
            armed: true,
        };
        let src = state.src.clone();
        let driver = drive(
            Arc::clone(&self.core),
            src.clone(),
            state.hard.clone(),
            state.soft.clone(),
            guard,
        )
        .boxed()
        .shared();
        state.phase = LoadPhase::Loading;
        state.in_flight = driver.downgrade();
        drop(state);

        tracing::debug!(namespace = %self.core.namespace, %src, "loading script");
        self.core.hooks.emit(&LifecycleEvent::Loading { src });
        Ok(Start::Wait(driver))
    }
}

/// Rolls an abandoned load cycle back.
///
/// Owned by the load driver. If every future awaiting the load is dropped
/// before it settles, the driver is dropped with it and the resource leaves
/// `Loading` for the phase it had before.
struct CycleGuard {
    core: Arc<ScriptCore>,
    cycle: u64,
    resume: LoadPhase,
    armed: bool,
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.core.state.lock();
        if state.cycle == self.cycle && state.phase == LoadPhase::Loading {
            state.phase = self.resume;
            state.in_flight = None;
            drop(state);
            tracing::debug!(namespace = %self.core.namespace, "load abandoned before settling");
        }
    }
}

/// Runs one load cycle: hard dependencies, then the fetch, alongside the soft
/// dependencies. Every dependency started here is driven to settlement.
async fn drive(
    core: Arc<ScriptCore>,
    src: String,
    hard: Vec<Arc<dyn Dependency>>,
    soft: Vec<Arc<dyn Dependency>>,
    mut guard: CycleGuard,
) -> Result<(), LoadError> {
    let wrap = |source: LoadError| LoadError::Dependency {
        namespace: core.namespace.clone(),
        src: src.clone(),
        source: Box::new(source),
    };

    let hard_loads = future::join_all(hard.iter().map(|dependency| dependency.load_dependency()));
    let soft_loads = future::join_all(soft.iter().map(|dependency| dependency.load_dependency()));

    let own = async {
        hard_loads
            .await
            .into_iter()
            .collect::<Result<Vec<()>, _>>()
            .map_err(wrap)?;
        core.fetcher
            .fetch_element(&ScriptElement::new(src.clone()))
            .await
            .map_err(|source| LoadError::Fetch {
                namespace: core.namespace.clone(),
                src: src.clone(),
                source,
            })
    };

    let (own, soft) = future::join(own, soft_loads).await;
    guard.armed = false;
    let outcome = own.and_then(|()| {
        soft.into_iter()
            .collect::<Result<Vec<()>, _>>()
            .map(drop)
            .map_err(wrap)
    });

    match outcome {
        Ok(()) => {
            {
                let mut state = core.state.lock();
                state.phase = LoadPhase::Loaded;
                state.in_flight = None;
            }
            tracing::debug!(namespace = %core.namespace, %src, "script loaded");
            core.hooks.emit(&LifecycleEvent::Loaded { src });
            if let Some(after_load) = &core.after_load {
                after_load().await;
            }
            Ok(())
        }
        Err(error) => {
            {
                let mut state = core.state.lock();
                state.phase = LoadPhase::Errored;
                state.in_flight = None;
            }
            tracing::warn!(namespace = %core.namespace, %src, %error, "script failed to load");
            core.hooks.emit(&LifecycleEvent::Errored {
                src,
                error: error.to_string(),
            });
            Err(error)
        }
    }
}

impl Loadable for BasicScript {
    fn src(&self) -> String {
        self.core.state.lock().src.clone()
    }

    fn set_src(&self, src: impl Into<String>) -> &Self {
        let mut state = self.core.state.lock();
        if state.phase == LoadPhase::Loaded {
            drop(state);
            contextual_warning(
                "Cannot change the source of a script that has already loaded",
                Some(&self.core.namespace),
            );
            return self;
        }
        state.src = src.into();
        self
    }

    fn phase(&self) -> LoadPhase {
        self.core.state.lock().phase
    }

    fn is_enabled(&self) -> bool {
        self.core.state.lock().enabled
    }

    fn has_dependencies(&self) -> bool {
        let state = self.core.state.lock();
        !state.soft.is_empty() || !state.hard.is_empty()
    }

    fn enable(&self) -> &Self {
        self.set_enabled(true);
        self
    }

    fn disable(&self) -> &Self {
        self.set_enabled(false);
        self
    }

    fn add_dependency<D>(&self, dependency: D, kind: DependencyKind) -> Result<&Self, DependencyError>
    where
        D: Dependency + 'static,
    {
        let mut state = self.core.state.lock();
        if matches!(state.phase, LoadPhase::Loading | LoadPhase::Loaded) {
            return Err(DependencyError::AlreadyStarted {
                namespace: self.core.namespace.clone(),
                src: state.src.clone(),
            });
        }

        let dependency: Arc<dyn Dependency> = Arc::new(dependency);
        match kind {
            DependencyKind::Soft => state.soft.push(dependency),
            DependencyKind::Hard => state.hard.push(dependency),
        }
        Ok(self)
    }

    fn load(&self) -> BoxFuture<'static, Result<Self, LoadError>> {
        let this = self.clone();
        match self.start() {
            Ok(Start::Loaded) => Box::pin(future::ready(Ok(this))),
            Ok(Start::Wait(in_flight)) => Box::pin(async move { in_flight.await.map(|()| this) }),
            Err(error) => Box::pin(future::ready(Err(error))),
        }
    }
}

impl fmt::Debug for BasicScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.core.state.lock();
        f.debug_struct("BasicScript")
            .field("namespace", &self.core.namespace)
            .field("src", &state.src)
            .field("enabled", &state.enabled)
            .field("phase", &state.phase)
            .field("soft_dependencies", &state.soft.len())
            .field("hard_dependencies", &state.hard.len())
            .finish()
    }
}
