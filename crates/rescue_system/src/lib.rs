//! Foundational fault primitives for Rescue (Layer 1).
//!
//! `rescue_system` provides the pieces that guarded execution is built on:
//!
//! - [`fault`] - Type-erased application faults
//! - [`error`] - The error type of a guarded call
//! - [`method`] - Named zero-argument instance methods
//! - [`rescuable`] - Fault-handler matching (`rescue_from`)
//!
//! # Architecture
//!
//! This crate is Layer 1 of the Rescue architecture:
//!
//! - **Layer 1** (`rescue_system`): faults, method tables, handler matching (this crate)
//! - **Layer 2** (`rescue_hooks`): hook registry and guarded execution engine
//!
//! # Example
//!
//! ```
//! use rescue_system::prelude::*;
//!
//! #[derive(Default)]
//! struct Report { retried: bool }
//!
//! let mut methods = MethodTable::<Report>::new();
//! methods.define("mark_retried", |report: &mut Report| {
//!     report.retried = true;
//!     Ok(())
//! });
//!
//! let mut handlers = RescueHandlers::<Report>::new();
//! handlers.rescue_from_with::<MessageFault>("mark_retried");
//!
//! let mut report = Report::default();
//! handlers.rescue_with_handler(&mut report, Fault::msg("flaky"), &methods);
//! assert!(report.retried);
//! ```

/// Guarded-call errors.
pub mod error;

/// Type-erased application faults.
pub mod fault;

/// Named instance methods.
pub mod method;

/// Fault-handler matching.
pub mod rescuable;

pub use error::ExecutionError;
pub use fault::{Fault, MessageFault};
pub use method::{Method, MethodTable};
pub use rescuable::{Handler, HandlerError, Matcher, Rescue, RescueHandlers};

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::error::*;
    pub use crate::fault::*;
    pub use crate::method::*;
    pub use crate::rescuable::*;
}
