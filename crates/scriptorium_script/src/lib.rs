//! Script loading for Scriptorium (Layer 2).
//!
//! Loads external scripts through a pluggable [`ScriptFetcher`], with
//! single-flight loading, enable/disable gating and two kinds of
//! dependencies.
//!
//! # Core Concepts
//!
//! - [`Loadable`] - Capability of loading once; [`Dependency`] is its
//!   object-safe slice used for dependency edges
//! - [`BasicScript`] - A loadable script
//! - [`Script`] - A loadable script with a deferred function queue that runs
//!   on initialization
//! - [`ScriptLoader`] - Shared configuration (fetcher, hooks, namespace)
//!
//! # Dependencies
//!
//! | Kind | Started | Must finish before |
//! |------|---------|--------------------|
//! | [`DependencyKind::Hard`] | When the owner starts loading | The owner's own fetch |
//! | [`DependencyKind::Soft`] | When the owner starts loading | The owner becomes loaded |
//!
//! No cycle detection or deduplication is performed. A dependency shared by
//! two owners is still loaded once, because its own load is single-flight.

mod basic;
mod context;
mod error;
mod fetch;
mod loadable;
mod loader;
mod script;
mod validate;

pub use basic::{BasicScript, DEFAULT_NAMESPACE as BASIC_SCRIPT_NAMESPACE};
pub use context::{contextual_message, contextual_warning};
pub use error::{DependencyError, FetchError, LoadError};
pub use fetch::{SCRIPT_TYPE, ScriptElement, ScriptFetcher};
pub use loadable::{Dependency, DependencyKind, LoadPhase, Loadable};
pub use loader::ScriptLoader;
pub use script::{DEFAULT_NAMESPACE as SCRIPT_NAMESPACE, InitPhase, Initializable, Script};
pub use validate::is_valid_src;
