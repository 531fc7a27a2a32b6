//! Guarded execution engine.
//!
//! One guarded call runs this sequence:
//!
//! 1. Before hooks, in registration order (oldest ancestor first).
//! 2. The work closure.
//! 3. If a before hook or the work returned a [`Fault`], the definition's
//!    rescue handlers are consulted once. A matching handler that completes
//!    turns the call into [`Outcome::Rescued`]; a handler that raises makes
//!    its fault the result. Without a match the original fault is returned.
//! 4. After hooks, in reverse registration order, on every exit path.
//!
//! Step 4 is guaranteed by a drop guard (`AfterHookGuard`) that owns the
//! instance borrow for the whole call. On normal return the guard is released
//! explicitly and an after-hook error replaces the result in flight. While a panic
//! unwinds, the guard runs the after hooks from `Drop` and logs their
//! failures; the panic itself is never treated as a fault.
//!
//! Unresolved hook methods ([`ExecutionError::NoHookMethod`]) and unresolved
//! handler methods ([`ExecutionError::NoHandlerMethod`]) are usage errors and
//! are never offered to rescue handlers. That holds across nesting: when the
//! work of one guarded call propagates another call's error with `?`, a
//! usage error comes back out unchanged and a fault is offered to the outer
//! handlers with its original type.
//!
//! # Example
//!
//! ```
//! use rescue_hooks::prelude::*;
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("quota exceeded")]
//! struct QuotaExceeded;
//!
//! #[derive(Default)]
//! struct Upload { log: Vec<&'static str> }
//!
//! let mut definition = Definition::<Upload>::new("Upload");
//! definition
//!     .add_after_block(|u: &mut Upload| { u.log.push("cleanup"); Ok(()) })
//!     .rescue_from::<QuotaExceeded, _>(|u: &mut Upload, _| { u.log.push("rescued"); Ok(()) });
//!
//! let mut upload = Upload::default();
//! let outcome = Activation::new(&definition, &mut upload)
//!     .work(|_| -> Result<(), Fault> { Err(QuotaExceeded.into()) })
//!     .execute()?;
//!
//! assert!(outcome.is_rescued());
//! assert_eq!(upload.log, vec!["rescued", "cleanup"]);
//! # Ok::<(), ExecutionError>(())
//! ```

use std::sync::Arc;

use rescue_system::fault::Fault;
use rescue_system::rescuable::{HandlerError, Rescue};

use crate::definition::Definition;
use crate::hooks::Hook;

pub use rescue_system::error::ExecutionError;

// ─────────────────────────────────────────────────────────────────────────────
// Outcome
// ─────────────────────────────────────────────────────────────────────────────

/// Successful result of a guarded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<R> {
    /// The work completed and returned a value.
    Completed(R),
    /// The work (or a before hook) failed and a rescue handler consumed the fault.
    Rescued {
        /// Type name of the rescued fault.
        fault_type: &'static str,
    },
}

impl<R> Outcome<R> {
    /// Returns `true` if a handler rescued the call.
    #[must_use]
    pub fn is_rescued(&self) -> bool {
        matches!(self, Outcome::Rescued { .. })
    }

    /// Returns the work's value, or `None` if the call was rescued.
    #[must_use]
    pub fn completed(self) -> Option<R> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::Rescued { .. } => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Activation
// ─────────────────────────────────────────────────────────────────────────────

/// Boxed work closure held by an [`Activation`].
pub type Work<'a, T, R> = Box<dyn FnOnce(&mut T) -> Result<R, Fault> + 'a>;

/// One guarded call, built up and then consumed by [`execute`](Self::execute).
pub struct Activation<'a, T, R> {
    definition: &'a Definition<T>,
    instance: &'a mut T,
    work: Option<Work<'a, T, R>>,
}

impl<'a, T, R> Activation<'a, T, R> {
    /// Creates an activation without work.
    #[must_use]
    pub fn new(definition: &'a Definition<T>, instance: &'a mut T) -> Self {
        Self {
            definition,
            instance,
            work: None,
        }
    }

    /// Sets the work closure.
    #[must_use]
    pub fn work<W>(mut self, work: W) -> Self
    where
        W: FnOnce(&mut T) -> Result<R, Fault> + 'a,
    {
        self.work = Some(Box::new(work));
        self
    }

    /// Runs the guarded call.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::MissingWorkBlock`] without running any hook
    /// if no work was set; otherwise see [`execute_guarded`].
    pub fn execute(self) -> Result<Outcome<R>, ExecutionError> {
        let Self {
            definition,
            instance,
            work,
        } = self;

        let Some(work) = work else {
            return Err(ExecutionError::MissingWorkBlock {
                definition: definition.name().to_owned(),
            });
        };

        execute_guarded(definition, instance, work)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Executor
// ─────────────────────────────────────────────────────────────────────────────

/// An instance that knows its own [`Definition`].
///
/// ```
/// use std::sync::{Arc, LazyLock};
/// use rescue_hooks::prelude::*;
///
/// static IMPORT: LazyLock<Arc<Definition<Import>>> = LazyLock::new(|| {
///     let mut definition = Definition::new("Import");
///     definition.add_before_block(|import: &mut Import| {
///         import.started = true;
///         Ok(())
///     });
///     Arc::new(definition)
/// });
///
/// #[derive(Default)]
/// struct Import { started: bool }
///
/// impl Executor for Import {
///     fn definition(&self) -> Arc<Definition<Self>> {
///         Arc::clone(&IMPORT)
///     }
/// }
///
/// let mut import = Import::default();
/// let rows = import.execute_with_rescue(|_| Ok(3))?.completed();
/// assert_eq!(rows, Some(3));
/// assert!(import.started);
/// # Ok::<(), ExecutionError>(())
/// ```
pub trait Executor: Sized {
    /// Returns the definition this instance executes under.
    fn definition(&self) -> Arc<Definition<Self>>;

    /// Runs `work` guarded by the instance's definition.
    ///
    /// # Errors
    ///
    /// See [`execute_guarded`].
    fn execute_with_rescue<R, W>(&mut self, work: W) -> Result<Outcome<R>, ExecutionError>
    where
        W: FnOnce(&mut Self) -> Result<R, Fault>,
    {
        let definition = self.definition();
        execute_guarded(&definition, self, work)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Engine
// ─────────────────────────────────────────────────────────────────────────────

/// Runs `work` on `instance` with the hooks and handlers of `definition`.
///
/// # Errors
///
/// - [`ExecutionError::NoHookMethod`] if a named hook does not resolve.
/// - [`ExecutionError::NoHandlerMethod`] if a named handler does not resolve.
/// - [`ExecutionError::Fault`] for an unhandled fault, a fault raised by a
///   handler, or a fault raised by an after hook.
pub fn execute_guarded<T, R, W>(
    definition: &Definition<T>,
    instance: &mut T,
    work: W,
) -> Result<Outcome<R>, ExecutionError>
where
    W: FnOnce(&mut T) -> Result<R, Fault>,
{
    let span = tracing::debug_span!(
        "execute_with_rescue",
        definition = definition.name(),
        before_hooks = definition.before_hooks().len(),
        after_hooks = definition.after_hooks().len(),
    );
    let _entered = span.enter();

    let mut guard = AfterHookGuard::new(definition, instance);
    let result = run_protected(definition, guard.instance(), work);
    let released = guard.release();

    match released {
        Ok(()) => result,
        Err(error) => {
            if let Err(superseded) = &result {
                tracing::debug!(%superseded, %error, "after hook error supersedes in-flight error");
            }
            Err(error)
        }
    }
}

/// Runs one hook against `instance`.
///
/// # Errors
///
/// Returns [`ExecutionError::NoHookMethod`] if a named hook does not resolve,
/// or [`ExecutionError::Fault`] if the hook itself failed.
pub fn run_hook<T>(
    hook: &Hook<T>,
    definition: &Definition<T>,
    instance: &mut T,
) -> Result<(), ExecutionError> {
    tracing::trace!(hook = hook.label(), "running hook");
    match hook {
        Hook::Named(name) => {
            let method = definition.methods().get(name.as_str()).ok_or_else(|| {
                ExecutionError::NoHookMethod {
                    definition: definition.name().to_owned(),
                    name: name.to_string(),
                }
            })?;
            method(instance).map_err(ExecutionError::from)
        }
        Hook::Inline(block) => block(instance).map_err(ExecutionError::from),
    }
}

/// Before hooks and work, with fault interception.
fn run_protected<T, R, W>(
    definition: &Definition<T>,
    instance: &mut T,
    work: W,
) -> Result<Outcome<R>, ExecutionError>
where
    W: FnOnce(&mut T) -> Result<R, Fault>,
{
    let attempt = run_before_hooks(definition, instance)
        .and_then(|()| work(instance).map_err(ExecutionError::from));

    let fault = match attempt {
        Ok(value) => return Ok(Outcome::Completed(value)),
        Err(ExecutionError::Fault(fault)) => fault,
        Err(error) => return Err(error),
    };

    rescue(definition, instance, fault)
}

fn rescue<T, R>(
    definition: &Definition<T>,
    instance: &mut T,
    fault: Fault,
) -> Result<Outcome<R>, ExecutionError> {
    match definition
        .handlers()
        .rescue_with_handler(instance, fault, definition.methods())
    {
        Rescue::Handled { fault_type } => {
            tracing::debug!(fault_type, "fault rescued");
            Ok(Outcome::Rescued { fault_type })
        }
        Rescue::Unhandled(fault) => {
            tracing::warn!(fault_type = fault.type_name(), error = %fault, "fault not rescued");
            Err(ExecutionError::Fault(fault))
        }
        Rescue::Failed(HandlerError::Raised(fault)) => {
            tracing::debug!(
                fault_type = fault.type_name(),
                error = %fault,
                "rescue handler raised"
            );
            Err(ExecutionError::from(fault))
        }
        Rescue::Failed(HandlerError::NoHandlerMethod(name)) => {
            Err(ExecutionError::NoHandlerMethod {
                definition: definition.name().to_owned(),
                name,
            })
        }
    }
}

fn run_before_hooks<T>(definition: &Definition<T>, instance: &mut T) -> Result<(), ExecutionError> {
    for hook in definition.before_hooks() {
        run_hook(hook, definition, instance)?;
    }
    Ok(())
}

fn run_after_hooks<T>(definition: &Definition<T>, instance: &mut T) -> Result<(), ExecutionError> {
    for hook in definition.after_hooks().iter().rev() {
        run_hook(hook, definition, instance)?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// AfterHookGuard
// ─────────────────────────────────────────────────────────────────────────────

/// Holds the instance for the duration of a guarded call and runs the after
/// hooks when released or dropped.
///
/// An after hook that panics while another panic is unwinding aborts the
/// process, as with any panicking destructor.
struct AfterHookGuard<'a, T> {
    definition: &'a Definition<T>,
    instance: &'a mut T,
    armed: bool,
}

impl<'a, T> AfterHookGuard<'a, T> {
    fn new(definition: &'a Definition<T>, instance: &'a mut T) -> Self {
        Self {
            definition,
            instance,
            armed: true,
        }
    }

    fn instance(&mut self) -> &mut T {
        &mut *self.instance
    }

    fn release(mut self) -> Result<(), ExecutionError> {
        self.armed = false;
        run_after_hooks(self.definition, &mut *self.instance)
    }
}

impl<T> Drop for AfterHookGuard<'_, T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        tracing::debug!(
            definition = self.definition.name(),
            "running after hooks during unwind"
        );
        if let Err(error) = run_after_hooks(self.definition, &mut *self.instance) {
            tracing::error!(
                definition = self.definition.name(),
                %error,
                "after hook failed during unwind"
            );
        }
    }
}
