//! Type-erased application faults.
//!
//! A [`Fault`] is what work closures, hooks and rescue handlers return when
//! they fail. It wraps any `Error + Send + Sync + 'static` value and remembers
//! the concrete type so handlers can be matched against it later.
//!
//! Any error type converts into a `Fault` through `From`, so the `?` operator
//! works inside work closures:
//!
//! ```
//! use rescue_system::fault::Fault;
//!
//! fn parse(input: &str) -> Result<u32, Fault> {
//!     let value: u32 = input.parse()?;
//!     Ok(value)
//! }
//!
//! let fault = parse("nope").unwrap_err();
//! assert!(fault.is::<core::num::ParseIntError>());
//! ```

use core::any::{TypeId, type_name};
use core::error::Error;
use core::fmt;

use crate::error::ExecutionError;

/// Boxed error stored inside a [`Fault`].
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// An application fault raised by work, a hook, or a rescue handler.
///
/// `Fault` does not implement [`Error`]: the blanket `From<E: Error>`
/// conversion would overlap with `From<Fault> for Fault`.
pub struct Fault {
    inner: BoxError,
    type_id: TypeId,
    type_name: &'static str,
}

impl Fault {
    /// Wraps a concrete error value.
    ///
    /// An [`ExecutionError::Fault`] is unwrapped rather than wrapped: the
    /// result is the fault it carries, with its original type.
    pub fn new<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        let inner: BoxError = Box::new(error);
        match inner.downcast::<ExecutionError>() {
            Ok(nested) => match *nested {
                ExecutionError::Fault(fault) => fault,
                usage => Self::wrap(Box::new(usage)),
            },
            Err(inner) => Self {
                inner,
                type_id: TypeId::of::<E>(),
                type_name: type_name::<E>(),
            },
        }
    }

    fn wrap<E>(inner: Box<E>) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            inner,
            type_id: TypeId::of::<E>(),
            type_name: type_name::<E>(),
        }
    }

    /// Creates an ad-hoc fault carrying only a message.
    ///
    /// The resulting fault has concrete type [`MessageFault`].
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(MessageFault(message.into()))
    }

    /// Returns the [`TypeId`] of the wrapped error.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the type name of the wrapped error.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the wrapped error is exactly of type `E`.
    #[must_use]
    pub fn is<E>(&self) -> bool
    where
        E: Error + Send + Sync + 'static,
    {
        self.type_id == TypeId::of::<E>()
    }

    /// Returns a reference to the wrapped error if it is of type `E`.
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: Error + Send + Sync + 'static,
    {
        self.inner.downcast_ref::<E>()
    }

    /// Takes the wrapped error out if it is of type `E`, or returns the fault
    /// unchanged.
    pub fn downcast<E>(self) -> Result<E, Self>
    where
        E: Error + Send + Sync + 'static,
    {
        let Self {
            inner,
            type_id,
            type_name,
        } = self;
        match inner.downcast::<E>() {
            Ok(error) => Ok(*error),
            Err(inner) => Err(Self {
                inner,
                type_id,
                type_name,
            }),
        }
    }
}

impl<E> From<E> for Fault
where
    E: Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fault")
            .field("type", &self.type_name)
            .field("error", &self.inner)
            .finish()
    }
}

/// Concrete type behind [`Fault::msg`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct MessageFault(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("disk on fire")]
    struct DiskError;

    #[derive(Debug, thiserror::Error)]
    #[error("network down")]
    struct NetworkError;

    #[test]
    fn fault_remembers_concrete_type() {
        let fault = Fault::new(DiskError);

        assert!(fault.is::<DiskError>());
        assert!(!fault.is::<NetworkError>());
        assert_eq!(fault.type_id(), TypeId::of::<DiskError>());
        assert!(fault.type_name().ends_with("DiskError"));
    }

    #[test]
    fn fault_display_delegates_to_inner_error() {
        let fault = Fault::from(DiskError);
        assert_eq!(fault.to_string(), "disk on fire");
    }

    #[test]
    fn downcast_returns_fault_on_mismatch() {
        let fault = Fault::new(DiskError);

        let fault = fault
            .downcast::<NetworkError>()
            .expect_err("wrong type should not downcast");
        assert!(fault.is::<DiskError>(), "type info survives failed downcast");

        let error = fault.downcast::<DiskError>().expect("right type downcasts");
        assert_eq!(error.to_string(), "disk on fire");
    }

    #[test]
    fn msg_creates_message_fault() {
        let fault = Fault::msg("boom");

        assert!(fault.is::<MessageFault>());
        assert_eq!(
            fault.downcast_ref::<MessageFault>(),
            Some(&MessageFault("boom".to_string()))
        );
    }

    #[test]
    fn question_mark_converts_errors() {
        fn parse(input: &str) -> Result<i32, Fault> {
            Ok(input.parse::<i32>()?)
        }

        assert_eq!(parse("42").unwrap(), 42);
        assert!(parse("x").unwrap_err().is::<core::num::ParseIntError>());
    }
}
