//! Loadable resources and their dependency edges.
//!
//! [`Loadable`] is the capability shared by [`BasicScript`](crate::BasicScript)
//! and [`Script`](crate::Script). [`Dependency`] is its object-safe slice,
//! used to store dependency edges of any loadable type behind one pointer.

use futures::future::BoxFuture;

use crate::error::{DependencyError, LoadError};

/// Load phase of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    /// Never loaded.
    #[default]
    Idle,
    /// A fetch is outstanding and a shared load future exists.
    Loading,
    /// Loaded. Further loads resolve immediately.
    Loaded,
    /// The last load failed. A fresh `load()` retries.
    Errored,
}

/// How a dependency relates to its owner's own fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DependencyKind {
    /// Started alongside the owner's fetch. The owner is not loaded until it
    /// finishes.
    #[default]
    Soft,
    /// Fully loaded before the owner's fetch starts. Use for dependencies with
    /// side effects the owner relies on.
    Hard,
}

impl DependencyKind {
    /// `Hard` when the dependency has side effects, `Soft` otherwise.
    #[must_use]
    pub fn from_side_effects(has_side_effects: bool) -> Self {
        if has_side_effects {
            Self::Hard
        } else {
            Self::Soft
        }
    }
}

/// A resource that can be loaded as someone else's dependency.
///
/// Implemented for every [`Loadable`]. Object safe, so owners keep their
/// edges as `Arc<dyn Dependency>` regardless of the concrete type.
pub trait Dependency: Send + Sync {
    /// The dependency's current source, for diagnostics.
    fn dependency_src(&self) -> String;

    /// Starts (or joins) the dependency's load.
    fn load_dependency(&self) -> BoxFuture<'static, Result<(), LoadError>>;
}

impl<T: Loadable> Dependency for T {
    fn dependency_src(&self) -> String {
        self.src()
    }

    fn load_dependency(&self) -> BoxFuture<'static, Result<(), LoadError>> {
        let load = self.load();
        Box::pin(async move { load.await.map(drop) })
    }
}

/// Capability of loading an external script exactly once.
///
/// Handles are cheap clones sharing one state. Every call that changes state
/// does so synchronously, before the first suspension point of any future it
/// returns.
pub trait Loadable: Clone + Send + Sync + 'static {
    /// The current source URL.
    fn src(&self) -> String;

    /// Sets the source URL.
    ///
    /// Ignored with a warning once the resource is loaded.
    fn set_src(&self, src: impl Into<String>) -> &Self;

    /// The current load phase.
    fn phase(&self) -> LoadPhase;

    /// Whether `load()` is allowed.
    fn is_enabled(&self) -> bool;

    /// Whether a load is in flight.
    fn is_loading(&self) -> bool {
        self.phase() == LoadPhase::Loading
    }

    /// Whether the resource has loaded.
    fn is_loaded(&self) -> bool {
        self.phase() == LoadPhase::Loaded
    }

    /// Whether the last load failed.
    fn is_errored(&self) -> bool {
        self.phase() == LoadPhase::Errored
    }

    /// Whether any dependency was added.
    fn has_dependencies(&self) -> bool;

    /// Allows loading. Fires `OnEnabled` on every call.
    fn enable(&self) -> &Self;

    /// Refuses future loads. Fires `OnDisabled` on every call.
    ///
    /// Has no effect on a load already in flight.
    fn disable(&self) -> &Self;

    /// Declares a dependency.
    ///
    /// # Errors
    ///
    /// [`DependencyError::AlreadyStarted`] if the resource is loading or
    /// loaded.
    fn add_dependency<D>(&self, dependency: D, kind: DependencyKind) -> Result<&Self, DependencyError>
    where
        D: Dependency + 'static;

    /// Loads the resource and its dependencies.
    ///
    /// Concurrent calls share one in-flight load. Once loaded, resolves
    /// immediately with the same handle.
    ///
    /// The load stays in flight while any returned future is alive. If all of
    /// them are dropped before it settles, the resource goes back to the phase
    /// it had before the call and the next `load()` starts over.
    ///
    /// # Errors
    ///
    /// - [`LoadError::Disabled`] when disabled
    /// - [`LoadError::EmptySource`] when the source is empty
    /// - [`LoadError::Fetch`] when the fetcher fails
    /// - [`LoadError::Dependency`] when a dependency fails
    fn load(&self) -> BoxFuture<'static, Result<Self, LoadError>>;
}
