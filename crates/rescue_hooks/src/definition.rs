//! Executor definitions.
//!
//! A [`Definition`] describes a category of guarded work for instances of
//! `T`: its before and after hooks, the named methods hooks resolve against,
//! and the rescue handlers consulted when work fails.
//!
//! Definitions form a hierarchy through [`Definition::extend`]. A subtype
//! starts from a copy of its parent's hook lists, methods and handlers and
//! then declares its own. Because hook lists are immutable and replaced on
//! every registration, nothing a subtype declares is ever visible to its
//! parent or siblings, and a parent that keeps registering after being
//! extended does not retroactively change the subtype.
//!
//! Registration takes `&mut self`, execution takes `&self`: build a
//! definition once (typically in a `LazyLock` or at startup), then share it
//! behind an [`Arc`](std::sync::Arc).
//!
//! # Example
//!
//! ```
//! use rescue_hooks::prelude::*;
//!
//! #[derive(Default)]
//! struct Service { calls: Vec<&'static str> }
//!
//! let mut base = Definition::<Service>::new("Service");
//! base.add_before_block(|s: &mut Service| { s.calls.push("base"); Ok(()) });
//!
//! let mut child = base.extend("AuditedService");
//! child.add_before_block(|s: &mut Service| { s.calls.push("audit"); Ok(()) });
//!
//! let mut service = Service::default();
//! child.execute_with_rescue(&mut service, |s| { s.calls.push("work"); Ok(()) })?;
//! assert_eq!(service.calls, vec!["base", "audit", "work"]);
//! assert_eq!(base.before_hooks().len(), 1);
//! # Ok::<(), ExecutionError>(())
//! ```

use core::error::Error;
use core::fmt;
use std::sync::Arc;

use rescue_system::fault::Fault;
use rescue_system::method::MethodTable;
use rescue_system::rescuable::RescueHandlers;

use crate::executor::{self, Activation, ExecutionError, Outcome};
use crate::hooks::{Hook, HookList, HookRegistrationError, HookSpec};

/// A reusable category of guarded work for instances of `T`.
pub struct Definition<T> {
    name: String,
    ancestors: Vec<String>,
    before_hooks: HookList<T>,
    after_hooks: HookList<T>,
    methods: MethodTable<T>,
    handlers: RescueHandlers<T>,
}

impl<T> Definition<T> {
    /// Creates a root definition with no hooks, methods or handlers.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ancestors: Vec::new(),
            before_hooks: HookList::new(),
            after_hooks: HookList::new(),
            methods: MethodTable::new(),
            handlers: RescueHandlers::new(),
        }
    }

    /// Creates a subtype that inherits everything declared on `self` so far.
    #[must_use]
    pub fn extend(&self, name: impl Into<String>) -> Self {
        let mut ancestors = Vec::with_capacity(self.ancestors.len() + 1);
        ancestors.push(self.name.clone());
        ancestors.extend(self.ancestors.iter().cloned());

        Self {
            name: name.into(),
            ancestors,
            before_hooks: self.before_hooks.clone(),
            after_hooks: self.after_hooks.clone(),
            methods: self.methods.clone(),
            handlers: self.handlers.clone(),
        }
    }

    /// Returns the definition's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the names of the definitions this one extends, nearest first.
    #[must_use]
    pub fn ancestors(&self) -> &[String] {
        &self.ancestors
    }

    /// Returns the resolved before hooks (inherited followed by own).
    #[must_use]
    pub fn before_hooks(&self) -> &HookList<T> {
        &self.before_hooks
    }

    /// Returns the resolved after hooks in registration order.
    ///
    /// They run in the reverse of this order.
    #[must_use]
    pub fn after_hooks(&self) -> &HookList<T> {
        &self.after_hooks
    }

    /// Returns the method table named hooks and handlers resolve against.
    #[must_use]
    pub fn methods(&self) -> &MethodTable<T> {
        &self.methods
    }

    /// Returns the rescue handlers.
    #[must_use]
    pub fn handlers(&self) -> &RescueHandlers<T> {
        &self.handlers
    }

    // ─────────────────────────────────────────────────────────────────────
    // Hook registration
    // ─────────────────────────────────────────────────────────────────────

    /// Registers before hooks: the hook spec's names in order, then its block.
    ///
    /// # Errors
    ///
    /// - [`HookRegistrationError::InvalidRegistration`] if the hook spec is empty.
    /// - [`HookRegistrationError::UnsupportedHookValue`] if a name is not a
    ///   symbolic identifier.
    ///
    /// The definition is unchanged when an error is returned.
    pub fn add_before_hooks(
        &mut self,
        spec: HookSpec<T>,
    ) -> Result<&mut Self, HookRegistrationError> {
        let hooks = spec.into_hooks()?;
        Ok(self.extend_before(hooks))
    }

    /// Registers a single named before hook.
    ///
    /// # Errors
    ///
    /// See [`add_before_hooks`](Self::add_before_hooks).
    pub fn add_before_hook(
        &mut self,
        name: impl Into<String>,
    ) -> Result<&mut Self, HookRegistrationError> {
        self.add_before_hooks(HookSpec::names([name]))
    }

    /// Registers an inline before hook.
    pub fn add_before_block<F>(&mut self, block: F) -> &mut Self
    where
        F: Fn(&mut T) -> Result<(), Fault> + Send + Sync + 'static,
    {
        self.extend_before([Hook::Inline(Arc::new(block))])
    }

    /// Registers after hooks: the hook spec's names in order, then its block.
    ///
    /// # Errors
    ///
    /// See [`add_before_hooks`](Self::add_before_hooks).
    pub fn add_after_hooks(
        &mut self,
        spec: HookSpec<T>,
    ) -> Result<&mut Self, HookRegistrationError> {
        let hooks = spec.into_hooks()?;
        Ok(self.extend_after(hooks))
    }

    /// Registers a single named after hook.
    ///
    /// # Errors
    ///
    /// See [`add_before_hooks`](Self::add_before_hooks).
    pub fn add_after_hook(
        &mut self,
        name: impl Into<String>,
    ) -> Result<&mut Self, HookRegistrationError> {
        self.add_after_hooks(HookSpec::names([name]))
    }

    /// Registers an inline after hook.
    pub fn add_after_block<F>(&mut self, block: F) -> &mut Self
    where
        F: Fn(&mut T) -> Result<(), Fault> + Send + Sync + 'static,
    {
        self.extend_after([Hook::Inline(Arc::new(block))])
    }

    fn extend_before(&mut self, hooks: impl IntoIterator<Item = Hook<T>>) -> &mut Self {
        self.before_hooks = self.before_hooks.extended(hooks);
        tracing::debug!(
            definition = %self.name,
            hooks = ?self.before_hooks.labels(),
            "before hooks registered"
        );
        self
    }

    fn extend_after(&mut self, hooks: impl IntoIterator<Item = Hook<T>>) -> &mut Self {
        self.after_hooks = self.after_hooks.extended(hooks);
        tracing::debug!(
            definition = %self.name,
            hooks = ?self.after_hooks.labels(),
            "after hooks registered"
        );
        self
    }

    // ─────────────────────────────────────────────────────────────────────
    // Methods and handlers
    // ─────────────────────────────────────────────────────────────────────

    /// Defines (or overrides) a named method.
    pub fn define_method<F>(&mut self, name: impl Into<String>, method: F) -> &mut Self
    where
        F: Fn(&mut T) -> Result<(), Fault> + Send + Sync + 'static,
    {
        self.methods.define(name, method);
        self
    }

    /// Declares a closure handler for faults of type `E`.
    pub fn rescue_from<E, F>(&mut self, handler: F) -> &mut Self
    where
        E: Error + Send + Sync + 'static,
        F: Fn(&mut T, Fault) -> Result<(), Fault> + Send + Sync + 'static,
    {
        self.handlers.rescue_from::<E, F>(handler);
        self
    }

    /// Declares a handler for faults of type `E` that calls the named method.
    ///
    /// Named methods take only the instance and do not receive the fault;
    /// use [`rescue_from`](Self::rescue_from) to inspect it.
    pub fn rescue_from_with<E>(&mut self, method: impl Into<String>) -> &mut Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.handlers.rescue_from_with::<E>(method);
        self
    }

    /// Declares a closure handler for every fault.
    pub fn rescue_from_any<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut T, Fault) -> Result<(), Fault> + Send + Sync + 'static,
    {
        self.handlers.rescue_from_any(handler);
        self
    }

    // ─────────────────────────────────────────────────────────────────────
    // Execution
    // ─────────────────────────────────────────────────────────────────────

    /// Runs `work` on `instance` guarded by this definition's hooks and
    /// rescue handlers.
    ///
    /// See [`executor`](crate::executor) for the exact sequence.
    ///
    /// # Errors
    ///
    /// Returns an [`ExecutionError`] for unresolved hook or handler methods
    /// and for faults no handler consumed.
    pub fn execute_with_rescue<R, W>(
        &self,
        instance: &mut T,
        work: W,
    ) -> Result<Outcome<R>, ExecutionError>
    where
        W: FnOnce(&mut T) -> Result<R, Fault>,
    {
        executor::execute_guarded(self, instance, work)
    }

    /// Starts building an activation for `instance`.
    #[must_use]
    pub fn activation<'a, R>(&'a self, instance: &'a mut T) -> Activation<'a, T, R> {
        Activation::new(self, instance)
    }
}

impl<T> fmt::Debug for Definition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("name", &self.name)
            .field("ancestors", &self.ancestors)
            .field("before_hooks", &self.before_hooks)
            .field("after_hooks", &self.after_hooks)
            .field("methods", &self.methods)
            .field("handlers", &self.handlers)
            .finish()
    }
}
