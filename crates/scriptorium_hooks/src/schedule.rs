//! Schedule identifiers and lifecycle schedule markers.
//!
//! A schedule is identified by a marker type (any `'static` type) wrapped in a
//! [`ScheduleId`]. Hooks are registered against schedules and invoked whenever
//! a resource reaches the matching point of its lifecycle.

use core::any::TypeId;
use variadics_please::all_tuples;

/// Identifier for a lifecycle schedule, derived from a marker type.
///
/// # Example
///
/// ```
/// # use scriptorium_hooks::schedule::{OnLoaded, ScheduleId};
/// let schedule = ScheduleId::of::<OnLoaded>();
/// assert!(schedule.type_name().ends_with("OnLoaded"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduleId {
    type_id: TypeId,
    type_name: &'static str,
}

impl ScheduleId {
    /// Creates a `ScheduleId` for the given schedule marker type.
    #[must_use]
    pub fn of<S: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<S>(),
            type_name: core::any::type_name::<S>(),
        }
    }

    /// Returns the underlying `TypeId`.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the type name for debugging.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Schedule Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Marker trait for schedule types.
///
/// The trait carries no methods; it exists so that [`IntoScheduleIds`] can
/// accept schedule types by trait bound.
pub trait Schedule: 'static {}

/// Trait for types that can be converted into a list of schedule IDs.
///
/// Implemented for single schedules and tuples of schedules, so one observer
/// can be registered on several lifecycle points at once.
pub trait IntoScheduleIds {
    /// Returns the schedule IDs for this type.
    fn schedule_ids() -> Vec<ScheduleId>;
}

impl<S: Schedule> IntoScheduleIds for S {
    fn schedule_ids() -> Vec<ScheduleId> {
        vec![ScheduleId::of::<S>()]
    }
}

macro_rules! impl_into_schedule_ids_for_tuple {
    ($($S:ident),*) => {
        impl<$($S: Schedule),*> IntoScheduleIds for ($($S,)*) {
            fn schedule_ids() -> Vec<ScheduleId> {
                vec![$(ScheduleId::of::<$S>()),*]
            }
        }
    };
}

all_tuples!(impl_into_schedule_ids_for_tuple, 2, 8, S);

// ─────────────────────────────────────────────────────────────────────────────
// Resource Schedules
// ─────────────────────────────────────────────────────────────────────────────

/// Fired every time a resource is enabled, including redundant calls.
///
/// Event data: [`LifecycleEvent::Enabled`](crate::LifecycleEvent::Enabled)
pub struct OnEnabled;
impl Schedule for OnEnabled {}

/// Fired every time a resource is disabled, including redundant calls.
///
/// Event data: [`LifecycleEvent::Disabled`](crate::LifecycleEvent::Disabled)
pub struct OnDisabled;
impl Schedule for OnDisabled {}

/// Fired once per load cycle when a resource enters the loading phase.
///
/// Event data: [`LifecycleEvent::Loading`](crate::LifecycleEvent::Loading)
pub struct OnLoading;
impl Schedule for OnLoading {}

/// Fired once per load cycle when a resource has loaded, after its soft
/// dependencies have settled.
///
/// Event data: [`LifecycleEvent::Loaded`](crate::LifecycleEvent::Loaded)
pub struct OnLoaded;
impl Schedule for OnLoaded {}

/// Fired once per load cycle when the fetch or a dependency failed.
///
/// Event data: [`LifecycleEvent::Errored`](crate::LifecycleEvent::Errored)
pub struct OnErrored;
impl Schedule for OnErrored {}

// ─────────────────────────────────────────────────────────────────────────────
// Queue Schedules
// ─────────────────────────────────────────────────────────────────────────────

/// Fired exactly once, after a function queue has flushed.
///
/// Event data: [`LifecycleEvent::Executed`](crate::LifecycleEvent::Executed)
pub struct OnExecuted;
impl Schedule for OnExecuted {}

/// Fired exactly once, after a script has run its initialization queue.
///
/// Event data: [`LifecycleEvent::Initialized`](crate::LifecycleEvent::Initialized)
pub struct OnInitialized;
impl Schedule for OnInitialized {}
