//! Lifecycle hooks for Scriptorium resources.
//!
//! Every loadable resource and function queue owns a [`HooksAPI`]. Instead of
//! overriding methods, integrators register named observers on the lifecycle
//! points they care about. With nothing registered, every lifecycle point is a
//! no-op.
//!
//! # Architecture
//!
//! - **Schedule markers** ([`schedule`]): Empty types that identify hook points
//! - **Events** ([`events`]): `LifecycleEvent` enum carrying context to hooks
//! - **API** ([`api`]): Registration and invocation mechanism
//!
//! # Example
//!
//! ```
//! use scriptorium_hooks::{HooksAPI, LifecycleEvent};
//! use scriptorium_hooks::schedule::OnLoaded;
//!
//! let hooks = HooksAPI::new();
//! hooks
//!     .register_observer::<OnLoaded, _>("logger", |event: &LifecycleEvent| {
//!         if let LifecycleEvent::Loaded { src } = event {
//!             println!("{src} is ready");
//!         }
//!     })
//!     .unwrap();
//!
//! hooks.emit(&LifecycleEvent::Loaded { src: "//cdn.example/a.js".into() });
//! ```

pub mod api;
pub mod events;
pub mod schedule;

pub use api::{HookRegistrationError, HooksAPI, Observer};
pub use events::LifecycleEvent;
pub use schedule::ScheduleId;
