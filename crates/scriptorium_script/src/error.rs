//! Error types for script loading.
//!
//! Display strings follow the contextual format produced by
//! [`contextual_message`](crate::contextual_message):
//! `"<namespace> - <message>:\n<cause>"`.

use thiserror::Error;

/// Failure reported by a [`ScriptFetcher`](crate::ScriptFetcher).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FetchError {
    message: String,
}

impl FetchError {
    /// Creates a fetch error with a human-readable message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The human-readable failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors from [`Loadable::load`](crate::Loadable::load).
///
/// `Clone` because every waiter on a single-flight load receives the same
/// outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// `load()` was called while the script was disabled.
    #[error("{namespace} - Could not load disabled script:\n{src}")]
    Disabled {
        /// Namespace of the script.
        namespace: String,
        /// Source of the script at the time of the call.
        src: String,
    },

    /// `load()` was called with an empty source.
    #[error("{namespace} - Could not load script with source of ''")]
    EmptySource {
        /// Namespace of the script.
        namespace: String,
    },

    /// The fetcher failed for the script's own source.
    #[error("{namespace} - Error loading {src}:\n{source}")]
    Fetch {
        /// Namespace of the script.
        namespace: String,
        /// Source that failed.
        src: String,
        /// Failure reported by the fetcher.
        source: FetchError,
    },

    /// A hard or soft dependency failed to load.
    #[error("{namespace} - Error loading {src}:\n{source}")]
    Dependency {
        /// Namespace of the owning script.
        namespace: String,
        /// Source of the owning script.
        src: String,
        /// The dependency's own load error.
        source: Box<LoadError>,
    },
}

impl LoadError {
    /// Namespace of the script that produced the error.
    #[must_use]
    pub fn namespace(&self) -> &str {
        match self {
            Self::Disabled { namespace, .. }
            | Self::EmptySource { namespace }
            | Self::Fetch { namespace, .. }
            | Self::Dependency { namespace, .. } => namespace,
        }
    }

    /// Source of the script that produced the error, if it had one.
    #[must_use]
    pub fn src(&self) -> Option<&str> {
        match self {
            Self::Disabled { src, .. } | Self::Fetch { src, .. } | Self::Dependency { src, .. } => {
                Some(src)
            }
            Self::EmptySource { .. } => None,
        }
    }

    /// Follows dependency errors down to the error that started the chain.
    #[must_use]
    pub fn root_cause(&self) -> &LoadError {
        let mut current = self;
        while let Self::Dependency { source, .. } = current {
            current = &**source;
        }
        current
    }
}

/// Errors from [`Loadable::add_dependency`](crate::Loadable::add_dependency).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyError {
    /// The owner is loading or loaded, so its dependency lists are frozen.
    #[error("{namespace} - Error adding dependency. Script has already started loading")]
    AlreadyStarted {
        /// Namespace of the owning script.
        namespace: String,
        /// Source of the owning script.
        src: String,
    },
}
