//! # Scriptorium Internal Library
//!
//! Re-exports the core Scriptorium crates for convenience.

/// Layer 1: Lifecycle hook registry.
pub use scriptorium_hooks;

/// Layer 1: Deferred function queue.
pub use scriptorium_queue;

/// Layer 2: Script loading with soft and hard dependencies.
pub use scriptorium_script;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use scriptorium_hooks::schedule::{
        OnDisabled, OnEnabled, OnErrored, OnExecuted, OnInitialized, OnLoaded, OnLoading,
    };
    pub use scriptorium_hooks::{HooksAPI, LifecycleEvent};
    pub use scriptorium_queue::{FunctionQueue, QueueError, Queueable};
    pub use scriptorium_script::{
        BasicScript, DependencyError, DependencyKind, FetchError, Initializable, LoadError,
        LoadPhase, Loadable, Script, ScriptElement, ScriptFetcher, ScriptLoader,
    };
}
