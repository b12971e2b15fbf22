//! Example script graph loaded with Scriptorium.
//!
//! Builds a small page worth of scripts on top of a simulated fetcher:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  app.js (Script)                             │
//! │                                              │
//! │    hard ──▶ framework.js ── hard ──▶ polyfills.js
//! │    soft ──▶ analytics.js                     │
//! │                                              │
//! │  queue: callbacks run after app.js loads     │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Lifecycle events from every script go to one shared hooks registry and
//! are logged through `tracing`.

mod fetcher;
mod logging;

pub use fetcher::SimulatedFetcher;
pub use logging::{TracingConfig, TracingFormat, UnknownFormat};

use std::sync::Arc;

use scriptorium_hooks::HooksAPI;
use scriptorium_hooks::schedule::{
    OnDisabled, OnEnabled, OnErrored, OnExecuted, OnInitialized, OnLoaded, OnLoading,
};
use scriptorium_hooks::{HookRegistrationError, LifecycleEvent};
use scriptorium_queue::{QueueError, Queueable};
use scriptorium_script::{
    BasicScript, DependencyError, DependencyKind, LoadError, Loadable, Script, ScriptLoader,
};

/// Polyfills every other script relies on.
pub const POLYFILLS_SRC: &str = "https://cdn.example/polyfills.js";
/// UI framework, needs the polyfills in place.
pub const FRAMEWORK_SRC: &str = "https://cdn.example/framework.js";
/// Analytics, independent of load order.
pub const ANALYTICS_SRC: &str = "https://cdn.example/analytics.js";
/// The application entry point.
pub const APP_SRC: &str = "https://cdn.example/app.js";

/// Scripts making up the demo page.
#[derive(Debug, Clone)]
pub struct DemoPage {
    /// Entry point with an initialization queue.
    pub app: Script,
    /// Hard dependency of `app`.
    pub framework: BasicScript,
    /// Hard dependency of `framework`.
    pub polyfills: BasicScript,
    /// Soft dependency of `app`.
    pub analytics: BasicScript,
}

impl DemoPage {
    /// Builds the page from `loader` and wires its dependencies.
    ///
    /// # Errors
    ///
    /// Only if a script already started loading, which cannot happen for
    /// freshly built scripts.
    pub fn build(loader: &ScriptLoader) -> Result<Self, DependencyError> {
        let polyfills = loader.basic_script(POLYFILLS_SRC);
        let framework = loader.basic_script(FRAMEWORK_SRC);
        let analytics = loader.basic_script(ANALYTICS_SRC);
        let app = loader.script(APP_SRC);

        framework.add_dependency(polyfills.clone(), DependencyKind::Hard)?;
        app.add_dependency(framework.clone(), DependencyKind::Hard)?
            .add_dependency(analytics.clone(), DependencyKind::Soft)?;

        Ok(Self {
            app,
            framework,
            polyfills,
            analytics,
        })
    }

    /// Queues the work the app runs once it is ready.
    ///
    /// Resolves with the number of callbacks that ran.
    pub fn queue_startup(&self) -> impl Future<Output = Result<usize, QueueError>> + use<> {
        let mount = self.app.enqueue(|app: Script| {
            tracing::info!(src = %app.src(), "mounting application");
        });
        let analytics = self.analytics.clone();
        let report = self.app.enqueue_async(move |_| async move {
            tracing::info!(analytics_loaded = analytics.is_loaded(), "reporting page view");
        });

        async move {
            mount.await?;
            report.await?;
            Ok(2)
        }
    }

    /// Loads the whole page through the app script.
    ///
    /// # Errors
    ///
    /// Whatever [`Loadable::load`] reports for the app.
    pub async fn load(&self) -> Result<(), LoadError> {
        self.app.load().await.map(drop)
    }
}

/// Logs every lifecycle event delivered to `hooks`.
///
/// # Errors
///
/// If an observer named `"demo-logger"` is already registered.
pub fn log_lifecycle(hooks: &HooksAPI) -> Result<(), HookRegistrationError> {
    hooks.register_observer::<
        (OnEnabled, OnDisabled, OnLoading, OnLoaded, OnErrored, OnExecuted, OnInitialized),
        _,
    >("demo-logger", |event: &LifecycleEvent| match event {
        LifecycleEvent::Errored { src, error } => {
            tracing::warn!(%src, %error, "lifecycle: {}", event.schedule_name());
        }
        _ => tracing::info!(src = event.src().unwrap_or("-"), "lifecycle: {}", event.schedule_name()),
    })?;
    Ok(())
}

/// Creates a loader whose scripts all share `hooks`.
#[must_use]
pub fn demo_loader(fetcher: Arc<SimulatedFetcher>, hooks: Arc<HooksAPI>) -> ScriptLoader {
    ScriptLoader::new(fetcher).with_hooks(hooks)
}
