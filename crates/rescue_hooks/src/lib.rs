//! Guarded execution with inheritable lifecycle hooks (Layer 2).
//!
//! `rescue_hooks` runs a unit of work between ordered before and after hooks
//! and lets declared fault types be intercepted by rescue handlers instead of
//! propagating.
//!
//! # Core Concepts
//!
//! - [`Definition`] - A category of guarded work: hooks, methods, handlers
//! - [`Hook`] - A named method or inline block run around the work
//! - [`Activation`] - One guarded call
//! - [`Executor`] - Instances that carry their own definition
//!
//! # Example
//!
//! ```
//! use rescue_hooks::prelude::*;
//!
//! #[derive(Default)]
//! struct Mirror { log: Vec<&'static str> }
//!
//! let mut base = Definition::<Mirror>::new("Mirror");
//! base.define_method("connect", |s: &mut Mirror| { s.log.push("connect"); Ok(()) })
//!     .define_method("disconnect", |s: &mut Mirror| { s.log.push("disconnect"); Ok(()) })
//!     .add_before_hook("connect")?
//!     .add_after_hook("disconnect")?;
//!
//! let mut mirror = Mirror::default();
//! base.execute_with_rescue(&mut mirror, |s| { s.log.push("pull"); Ok(()) })?;
//!
//! assert_eq!(mirror.log, vec!["connect", "pull", "disconnect"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Architecture
//!
//! This crate is Layer 2 of the Rescue architecture:
//!
//! - **Layer 1** (`rescue_system`): faults, method tables, handler matching
//! - **Layer 2** (`rescue_hooks`): hook registry and guarded execution (this crate)

/// Executor definitions and hook registration.
pub mod definition;

/// Guarded execution engine.
pub mod executor;

/// Before and after hooks.
pub mod hooks;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::definition::Definition;
    pub use crate::executor::{Activation, ExecutionError, Executor, Outcome};
    pub use crate::hooks::{Hook, HookList, HookName, HookRegistrationError, HookSpec};
    pub use rescue_system::prelude::*;
}

// Re-export key types at crate root for convenience
pub use definition::Definition;
pub use executor::{Activation, ExecutionError, Executor, Outcome};
pub use hooks::{Hook, HookList, HookName, HookRegistrationError, HookSpec};
