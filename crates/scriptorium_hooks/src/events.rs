//! Unified event enum for lifecycle hooks.
//!
//! All hooks receive `&LifecycleEvent` and can match on variants for typed
//! access.

use core::fmt;

use crate::schedule::{
    OnDisabled, OnEnabled, OnErrored, OnExecuted, OnInitialized, OnLoaded, OnLoading, ScheduleId,
};

/// Event delivered to hooks at each lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    // ─────────────────────────────────────────────────────────────────────────
    // Resource Events
    // ─────────────────────────────────────────────────────────────────────────
    /// The resource was enabled.
    Enabled {
        /// Source URL at the time of the call.
        src: String,
    },

    /// The resource was disabled.
    Disabled {
        /// Source URL at the time of the call.
        src: String,
    },

    /// The resource entered the loading phase.
    Loading {
        /// Source URL being loaded.
        src: String,
    },

    /// The resource finished loading.
    Loaded {
        /// Source URL that loaded.
        src: String,
    },

    /// The resource failed to load.
    Errored {
        /// Source URL that failed.
        src: String,
        /// Rendered error message.
        error: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Queue Events
    // ─────────────────────────────────────────────────────────────────────────
    /// A function queue flushed.
    Executed {
        /// Number of callbacks run by the flush.
        callbacks: usize,
    },

    /// A script ran its initialization queue.
    Initialized {
        /// Source URL of the script.
        src: String,
    },
}

impl LifecycleEvent {
    /// Returns the schedule this event is delivered on.
    #[must_use]
    pub fn schedule(&self) -> ScheduleId {
        match self {
            LifecycleEvent::Enabled { .. } => ScheduleId::of::<OnEnabled>(),
            LifecycleEvent::Disabled { .. } => ScheduleId::of::<OnDisabled>(),
            LifecycleEvent::Loading { .. } => ScheduleId::of::<OnLoading>(),
            LifecycleEvent::Loaded { .. } => ScheduleId::of::<OnLoaded>(),
            LifecycleEvent::Errored { .. } => ScheduleId::of::<OnErrored>(),
            LifecycleEvent::Executed { .. } => ScheduleId::of::<OnExecuted>(),
            LifecycleEvent::Initialized { .. } => ScheduleId::of::<OnInitialized>(),
        }
    }

    /// Returns the schedule name for this event variant.
    ///
    /// This corresponds to the schedule marker type name (e.g., `OnLoaded`).
    #[must_use]
    pub fn schedule_name(&self) -> &'static str {
        match self {
            LifecycleEvent::Enabled { .. } => "OnEnabled",
            LifecycleEvent::Disabled { .. } => "OnDisabled",
            LifecycleEvent::Loading { .. } => "OnLoading",
            LifecycleEvent::Loaded { .. } => "OnLoaded",
            LifecycleEvent::Errored { .. } => "OnErrored",
            LifecycleEvent::Executed { .. } => "OnExecuted",
            LifecycleEvent::Initialized { .. } => "OnInitialized",
        }
    }

    /// Returns the source URL if this is a resource-level event.
    #[must_use]
    pub fn src(&self) -> Option<&str> {
        match self {
            LifecycleEvent::Enabled { src }
            | LifecycleEvent::Disabled { src }
            | LifecycleEvent::Loading { src }
            | LifecycleEvent::Loaded { src }
            | LifecycleEvent::Errored { src, .. }
            | LifecycleEvent::Initialized { src } => Some(src),
            LifecycleEvent::Executed { .. } => None,
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleEvent::Enabled { src } => write!(f, "Enabled({src})"),
            LifecycleEvent::Disabled { src } => write!(f, "Disabled({src})"),
            LifecycleEvent::Loading { src } => write!(f, "Loading({src})"),
            LifecycleEvent::Loaded { src } => write!(f, "Loaded({src})"),
            LifecycleEvent::Errored { src, error } => write!(f, "Errored({src}: {error})"),
            LifecycleEvent::Executed { callbacks } => {
                write!(f, "Executed(callbacks: {callbacks})")
            }
            LifecycleEvent::Initialized { src } => write!(f, "Initialized({src})"),
        }
    }
}
