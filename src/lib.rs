//! Dynamic script loading with ordering guarantees.
//!
//! Scripts load once no matter how many callers ask, may declare hard
//! dependencies (loaded before their own fetch) and soft dependencies
//! (loaded alongside), and can defer work until they are initialized.
//!

pub use scriptorium_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use scriptorium_internal::prelude::*;
}
