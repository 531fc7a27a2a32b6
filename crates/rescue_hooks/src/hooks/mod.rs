//! Before and after hooks for guarded execution.
//!
//! # Design Principles
//!
//! - Before hooks execute in registration order, after hooks in reverse
//! - Hooks are named methods or inline blocks; duplicates run every time
//! - Lists are immutable once built; registering produces an extended copy
//!
//! # Architecture
//!
//! - **Hooks** ([`hook`]): `Hook`, `HookName`, inline closures
//! - **API** ([`api`]): `HookSpec`, `HookList`, registration errors
//!
//! Hooks are registered through [`Definition`](crate::definition::Definition)
//! and run by the [`executor`](crate::executor).
//!
//! # Example
//!
//! ```
//! use rescue_hooks::definition::Definition;
//! use rescue_hooks::hooks::HookSpec;
//!
//! #[derive(Default)]
//! struct Job { opened: usize }
//!
//! let mut definition = Definition::<Job>::new("Job");
//! definition
//!     .define_method("open", |job: &mut Job| {
//!         job.opened += 1;
//!         Ok(())
//!     })
//!     .add_before_hooks(HookSpec::names(["open"]))?
//!     .add_after_block(|job: &mut Job| {
//!         job.opened -= 1;
//!         Ok(())
//!     });
//!
//! assert_eq!(definition.before_hooks().labels(), vec!["open"]);
//! # Ok::<(), rescue_hooks::hooks::HookRegistrationError>(())
//! ```

pub mod api;
pub mod hook;

pub use api::{HookList, HookRegistrationError, HookSpec};
pub use hook::{Hook, HookName, InlineHook};
