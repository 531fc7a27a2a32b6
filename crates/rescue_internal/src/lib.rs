//! # Rescue Internal Library
//!
//! Re-exports the core Rescue crates for convenience.

/// Layer 1: faults, method tables and handler matching.
pub use rescue_system;

/// Layer 2: hook registry and guarded execution.
pub use rescue_hooks;

/// Subscriber setup for binaries.
#[cfg(feature = "tracing-subscriber")]
pub use rescue_tracing;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use rescue_hooks::prelude::*;
}
