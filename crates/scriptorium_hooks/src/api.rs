//! Hook registration API for resource lifecycles.
//!
//! The [`HooksAPI`] is a registry of named observers keyed by schedule. An
//! empty registry is the default, so every lifecycle point is a no-op until
//! something registers on it.
//!
//! # Multi-Schedule Registration
//!
//! ```
//! use scriptorium_hooks::{HooksAPI, LifecycleEvent};
//! use scriptorium_hooks::schedule::{OnErrored, OnLoaded, OnLoading};
//!
//! let hooks = HooksAPI::new();
//! hooks
//!     .register_observer::<(OnLoading, OnLoaded, OnErrored), _>(
//!         "tracker",
//!         |event: &LifecycleEvent| match event {
//!             LifecycleEvent::Loading { src } => println!("loading {src}"),
//!             LifecycleEvent::Errored { error, .. } => println!("failed: {error}"),
//!             _ => {}
//!         },
//!     )
//!     .unwrap();
//! ```

use core::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::events::LifecycleEvent;
use crate::schedule::{IntoScheduleIds, ScheduleId};

/// Shared, type-erased observer.
pub type Observer = Arc<dyn Fn(&LifecycleEvent) + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// HookRegistrationError
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during hook registration.
#[derive(Debug, Clone)]
pub enum HookRegistrationError {
    /// A hook with this name already exists on the schedule.
    DuplicateName {
        /// The schedule where the duplicate was found.
        schedule: ScheduleId,
        /// The duplicate hook name.
        name: String,
    },
}

impl fmt::Display for HookRegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookRegistrationError::DuplicateName { schedule, name } => {
                write!(
                    f,
                    "hook '{}' already registered for schedule '{}'",
                    name,
                    schedule.type_name()
                )
            }
        }
    }
}

impl core::error::Error for HookRegistrationError {}

/// Entry in the hook registry.
struct HookEntry {
    /// Human-readable name, unique per schedule.
    name: String,
    observer: Observer,
}

// ─────────────────────────────────────────────────────────────────────────────
// HooksAPI
// ─────────────────────────────────────────────────────────────────────────────

/// Registry of lifecycle observers.
///
/// Each resource holds an `Arc<HooksAPI>`; a loader may hand the same registry
/// to every resource it creates so that one observer sees them all.
///
/// # Thread Safety
///
/// Registration and invocation go through a [`RwLock`]. Observers are cloned
/// out of the lock before they run, so an observer may itself register or
/// remove hooks, or call back into the resource that fired it.
#[derive(Default)]
pub struct HooksAPI {
    hooks: RwLock<HashMap<ScheduleId, Vec<HookEntry>>>,
}

impl HooksAPI {
    /// Creates a new empty hooks registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            hooks: RwLock::new(HashMap::new()),
        }
    }

    /// Registers an observer for one or more schedules.
    ///
    /// When registered on several schedules the stored name is suffixed with
    /// `@<schedule type name>`.
    pub fn register_observer<S, F>(
        &self,
        name: impl Into<String>,
        hook: F,
    ) -> Result<&Self, HookRegistrationError>
    where
        S: IntoScheduleIds,
        F: Fn(&LifecycleEvent) + Send + Sync + 'static,
    {
        let schedules = S::schedule_ids();
        let name = name.into();
        let hook: Observer = Arc::new(hook);

        for schedule in &schedules {
            let hook_name = if schedules.len() > 1 {
                format!("{}@{}", name, schedule.type_name())
            } else {
                name.clone()
            };
            self.register_boxed(*schedule, hook_name, Arc::clone(&hook))?;
        }
        Ok(self)
    }

    /// Registers a pre-built observer for the given schedule.
    pub fn register_boxed(
        &self,
        schedule: ScheduleId,
        name: impl Into<String>,
        observer: Observer,
    ) -> Result<(), HookRegistrationError> {
        let name = name.into();

        let mut hooks = self.hooks.write();
        let entries = hooks.entry(schedule).or_default();

        if entries.iter().any(|entry| entry.name == name) {
            return Err(HookRegistrationError::DuplicateName { schedule, name });
        }

        entries.push(HookEntry { name, observer });
        Ok(())
    }

    /// Removes the named hook from a schedule. Returns whether it existed.
    pub fn remove_hook(&self, schedule: ScheduleId, name: &str) -> bool {
        let mut hooks = self.hooks.write();
        let Some(entries) = hooks.get_mut(&schedule) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|entry| entry.name != name);
        before != entries.len()
    }

    /// Invokes all hooks registered for the given schedule, in registration order.
    pub fn invoke(&self, schedule: ScheduleId, event: &LifecycleEvent) {
        let observers: Vec<Observer> = {
            let hooks = self.hooks.read();
            match hooks.get(&schedule) {
                Some(entries) => entries
                    .iter()
                    .map(|entry| Arc::clone(&entry.observer))
                    .collect(),
                None => return,
            }
        };

        for observer in observers {
            observer(event);
        }
    }

    /// Invokes the hooks of the event's own schedule.
    pub fn emit(&self, event: &LifecycleEvent) {
        self.invoke(event.schedule(), event);
    }

    /// Returns the number of hooks registered for the given schedule.
    #[must_use]
    pub fn hook_count(&self, schedule: ScheduleId) -> usize {
        let hooks = self.hooks.read();
        hooks.get(&schedule).map_or(0, Vec::len)
    }

    /// Checks if a hook with the given name exists on the schedule.
    #[must_use]
    pub fn contains_hook(&self, schedule: ScheduleId, name: &str) -> bool {
        let hooks = self.hooks.read();
        hooks
            .get(&schedule)
            .is_some_and(|entries| entries.iter().any(|entry| entry.name == name))
    }
}

impl fmt::Debug for HooksAPI {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hooks = self.hooks.read();
        let mut map = f.debug_map();
        for (schedule, entries) in hooks.iter() {
            let names: Vec<&str> = entries.iter().map(|entry| entry.name.as_str()).collect();
            map.entry(&schedule.type_name(), &names);
        }
        map.finish()
    }
}
