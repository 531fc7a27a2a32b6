//! Fault-handler matching.
//!
//! [`RescueHandlers`] is an ordered set of `(matcher, handler)` pairs. Given a
//! [`Fault`], [`find_handler`](RescueHandlers::find_handler) returns the
//! handler that should deal with it and [`Handler::run`] invokes it.
//!
//! # Matching Policy
//!
//! Handlers are consulted in **reverse declaration order**: the most recently
//! declared matching handler wins. A subtype that copies its parent's handlers
//! and then declares its own therefore overrides the inherited ones.
//!
//! # Example
//!
//! ```
//! use rescue_system::fault::{Fault, MessageFault};
//! use rescue_system::method::MethodTable;
//! use rescue_system::rescuable::{Rescue, RescueHandlers};
//!
//! #[derive(Default)]
//! struct Job { failures: usize }
//!
//! let mut handlers = RescueHandlers::<Job>::new();
//! handlers.rescue_from::<MessageFault, _>(|job: &mut Job, _fault| {
//!     job.failures += 1;
//!     Ok(())
//! });
//!
//! let mut job = Job::default();
//! let rescue = handlers.rescue_with_handler(&mut job, Fault::msg("boom"), &MethodTable::new());
//! assert!(matches!(rescue, Rescue::Handled { .. }));
//! assert_eq!(job.failures, 1);
//! ```

use core::any::{TypeId, type_name};
use core::error::Error;
use core::fmt;
use std::sync::Arc;

use crate::fault::Fault;
use crate::method::MethodTable;

/// Closure form of a rescue handler.
pub type HandlerFn<T> = Arc<dyn Fn(&mut T, Fault) -> Result<(), Fault> + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// Matcher
// ─────────────────────────────────────────────────────────────────────────────

/// Decides whether a handler applies to a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// Matches faults whose concrete error type is exactly this type.
    Type {
        /// Type id of the matched error type.
        id: TypeId,
        /// Type name, for diagnostics.
        name: &'static str,
    },
    /// Matches every fault.
    Any,
}

impl Matcher {
    /// Matcher for the concrete error type `E`.
    #[must_use]
    pub fn of<E>() -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::Type {
            id: TypeId::of::<E>(),
            name: type_name::<E>(),
        }
    }

    /// Returns `true` if this matcher accepts the fault.
    #[must_use]
    pub fn matches(&self, fault: &Fault) -> bool {
        match self {
            Matcher::Type { id, .. } => *id == fault.type_id(),
            Matcher::Any => true,
        }
    }

    /// Human-readable description of the matcher.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Matcher::Type { name, .. } => *name,
            Matcher::Any => "*",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handler
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised while running a rescue handler.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The handler ran and raised a fault of its own.
    #[error("rescue handler raised: {0}")]
    Raised(Fault),

    /// The handler names a method that does not exist on the instance.
    #[error("rescue handler method `{0}` does not exist")]
    NoHandlerMethod(String),
}

/// A rescue handler.
pub enum Handler<T> {
    /// A closure receiving the instance and the fault.
    Block(HandlerFn<T>),
    /// The name of a method resolved on the instance.
    ///
    /// Methods take only the instance, so a named handler never sees the
    /// fault. Use [`Handler::Block`] when the handler needs it.
    Method(String),
}

impl<T> Handler<T> {
    /// Runs the handler for `fault`.
    ///
    /// Named handlers are resolved against `methods` at call time and do not
    /// receive the fault.
    pub fn run(
        &self,
        instance: &mut T,
        fault: Fault,
        methods: &MethodTable<T>,
    ) -> Result<(), HandlerError> {
        match self {
            Handler::Block(handler) => handler(instance, fault).map_err(HandlerError::Raised),
            Handler::Method(name) => {
                let method = methods
                    .get(name)
                    .ok_or_else(|| HandlerError::NoHandlerMethod(name.clone()))?;
                method(instance).map_err(HandlerError::Raised)
            }
        }
    }
}

impl<T> Clone for Handler<T> {
    fn clone(&self) -> Self {
        match self {
            Handler::Block(handler) => Handler::Block(Arc::clone(handler)),
            Handler::Method(name) => Handler::Method(name.clone()),
        }
    }
}

impl<T> fmt::Debug for Handler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Block(_) => f.write_str("Handler::Block(..)"),
            Handler::Method(name) => f.debug_tuple("Handler::Method").field(name).finish(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// RescueHandlers
// ─────────────────────────────────────────────────────────────────────────────

/// Result of offering a fault to the handler set.
#[derive(Debug)]
pub enum Rescue {
    /// A handler matched and completed.
    Handled {
        /// Type name of the rescued fault.
        fault_type: &'static str,
    },
    /// No handler matched; the original fault is returned untouched.
    Unhandled(Fault),
    /// A handler matched but failed.
    Failed(HandlerError),
}

struct HandlerEntry<T> {
    matcher: Matcher,
    handler: Handler<T>,
}

impl<T> Clone for HandlerEntry<T> {
    fn clone(&self) -> Self {
        Self {
            matcher: self.matcher,
            handler: self.handler.clone(),
        }
    }
}

/// Ordered set of rescue handlers for instances of `T`.
pub struct RescueHandlers<T> {
    entries: Vec<HandlerEntry<T>>,
}

impl<T> RescueHandlers<T> {
    /// Creates an empty handler set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Declares a closure handler for faults of type `E`.
    pub fn rescue_from<E, F>(&mut self, handler: F) -> &mut Self
    where
        E: Error + Send + Sync + 'static,
        F: Fn(&mut T, Fault) -> Result<(), Fault> + Send + Sync + 'static,
    {
        self.register(Matcher::of::<E>(), Handler::Block(Arc::new(handler)))
    }

    /// Declares a named-method handler for faults of type `E`.
    ///
    /// The method is called with the instance only; the fault is dropped.
    pub fn rescue_from_with<E>(&mut self, method: impl Into<String>) -> &mut Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.register(Matcher::of::<E>(), Handler::Method(method.into()))
    }

    /// Declares a closure handler for every fault.
    pub fn rescue_from_any<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut T, Fault) -> Result<(), Fault> + Send + Sync + 'static,
    {
        self.register(Matcher::Any, Handler::Block(Arc::new(handler)))
    }

    /// Declares a handler with an explicit matcher.
    pub fn register(&mut self, matcher: Matcher, handler: Handler<T>) -> &mut Self {
        tracing::debug!(matcher = matcher.describe(), ?handler, "rescue handler declared");
        self.entries.push(HandlerEntry { matcher, handler });
        self
    }

    /// Finds the handler for `fault`, most recently declared first.
    #[must_use]
    pub fn find_handler(&self, fault: &Fault) -> Option<&Handler<T>> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.matcher.matches(fault))
            .map(|entry| &entry.handler)
    }

    /// Looks up a handler for `fault` once and runs it if found.
    pub fn rescue_with_handler(
        &self,
        instance: &mut T,
        fault: Fault,
        methods: &MethodTable<T>,
    ) -> Rescue {
        let Some(handler) = self.find_handler(&fault) else {
            return Rescue::Unhandled(fault);
        };

        let fault_type = fault.type_name();
        match handler.run(instance, fault, methods) {
            Ok(()) => Rescue::Handled { fault_type },
            Err(error) => Rescue::Failed(error),
        }
    }

    /// Returns the number of declared handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no handlers are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the declared matchers in declaration order.
    #[must_use]
    pub fn matchers(&self) -> Vec<Matcher> {
        self.entries.iter().map(|entry| entry.matcher).collect()
    }
}

impl<T> Default for RescueHandlers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for RescueHandlers<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<T> fmt::Debug for RescueHandlers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let matchers: Vec<&str> = self
            .entries
            .iter()
            .map(|entry| entry.matcher.describe())
            .collect();
        f.debug_struct("RescueHandlers")
            .field("matchers", &matchers)
            .finish()
    }
}
