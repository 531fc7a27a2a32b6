//! Guarded execution with inheritable before/after hooks and declarative
//! fault rescue.
//!

pub use rescue_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use rescue_internal::prelude::*;
}
