//! Errors returned by a guarded call.

use core::error::Error;

use crate::fault::Fault;

/// Errors that can occur during guarded execution.
///
/// Converting an `ExecutionError::Fault` back into a [`Fault`] (as `?` does
/// inside the work of an enclosing guarded call) yields the carried fault
/// itself, so the enclosing definition's handlers match on its original type.
/// The other variants are usage errors; converted into a fault they keep
/// their identity and the enclosing call returns them unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// The activation was executed without a work closure.
    #[error("guarded execution of '{definition}' requires a work block")]
    MissingWorkBlock {
        /// Name of the definition.
        definition: String,
    },

    /// A named hook does not resolve to a method on the definition.
    #[error("hook method `{name}` does not exist on '{definition}'")]
    NoHookMethod {
        /// Name of the definition.
        definition: String,
        /// The method name that failed to resolve.
        name: String,
    },

    /// A named rescue handler does not resolve to a method on the definition.
    #[error("rescue handler method `{name}` does not exist on '{definition}'")]
    NoHandlerMethod {
        /// Name of the definition.
        definition: String,
        /// The method name that failed to resolve.
        name: String,
    },

    /// An application fault that no handler consumed, or that a handler raised.
    #[error("{0}")]
    Fault(Fault),
}

impl ExecutionError {
    /// Returns the application fault, if this is one.
    #[must_use]
    pub fn fault(&self) -> Option<&Fault> {
        match self {
            ExecutionError::Fault(fault) => Some(fault),
            _ => None,
        }
    }

    /// Consumes the error and returns the application fault, if this is one.
    #[must_use]
    pub fn into_fault(self) -> Option<Fault> {
        match self {
            ExecutionError::Fault(fault) => Some(fault),
            _ => None,
        }
    }

    /// Returns `true` if this is an application fault of type `E`.
    #[must_use]
    pub fn is_fault<E>(&self) -> bool
    where
        E: Error + Send + Sync + 'static,
    {
        self.fault().is_some_and(Fault::is::<E>)
    }

    /// Returns `true` for the usage-error variants.
    #[must_use]
    pub fn is_usage_error(&self) -> bool {
        !matches!(self, ExecutionError::Fault(_))
    }
}

/// A fault carrying a usage error from a nested call becomes that usage error
/// again; any other fault becomes [`ExecutionError::Fault`].
impl From<Fault> for ExecutionError {
    fn from(fault: Fault) -> Self {
        fault.downcast::<ExecutionError>().unwrap_or_else(ExecutionError::Fault)
    }
}
