//! Hook registration API.
//!
//! [`HookSpec`] collects what a single registration call declares (method
//! names first, then at most one inline block). [`HookList`] is the immutable,
//! shared sequence a definition stores; registering never mutates a list in
//! place, it builds an extended copy.
//!
//! # Example
//!
//! ```
//! use rescue_hooks::hooks::{HookList, HookSpec};
//!
//! struct Job { log: Vec<&'static str> }
//!
//! let inherited = HookList::<Job>::new();
//! let spec = HookSpec::names(["open_connection", "log_start"])
//!     .with_block(|job: &mut Job| {
//!         job.log.push("block");
//!         Ok(())
//!     });
//!
//! let own = inherited.extended(spec.into_hooks()?);
//! assert_eq!(own.labels(), vec!["open_connection", "log_start", "<block>"]);
//! assert!(inherited.is_empty());
//! # Ok::<(), rescue_hooks::hooks::HookRegistrationError>(())
//! ```

use core::fmt;
use std::sync::Arc;

use rescue_system::fault::Fault;

use super::hook::{Hook, HookName, InlineHook};

// ─────────────────────────────────────────────────────────────────────────────
// HookRegistrationError
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during hook registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HookRegistrationError {
    /// Neither a method name nor a block was given.
    #[error("hook registration requires at least one method name or a block")]
    InvalidRegistration,

    /// A supplied value is not a bare symbolic method name.
    #[error("unsupported hook value '{value}': expected a method name")]
    UnsupportedHookValue {
        /// The rejected value.
        value: String,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// HookSpec
// ─────────────────────────────────────────────────────────────────────────────

/// The content of one registration call.
pub struct HookSpec<T> {
    names: Vec<String>,
    block: Option<InlineHook<T>>,
}

impl<T> HookSpec<T> {
    /// Creates an empty spec. Registering it fails with
    /// [`HookRegistrationError::InvalidRegistration`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            block: None,
        }
    }

    /// Creates a spec from a sequence of method names.
    #[must_use]
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            block: None,
        }
    }

    /// Creates a spec holding only an inline block.
    #[must_use]
    pub fn block<F>(block: F) -> Self
    where
        F: Fn(&mut T) -> Result<(), Fault> + Send + Sync + 'static,
    {
        Self::new().with_block(block)
    }

    /// Appends a method name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// Sets the inline block, which runs after all named hooks of this spec.
    ///
    /// A spec carries at most one block; setting it again replaces it.
    #[must_use]
    pub fn with_block<F>(mut self, block: F) -> Self
    where
        F: Fn(&mut T) -> Result<(), Fault> + Send + Sync + 'static,
    {
        self.block = Some(Arc::new(block));
        self
    }

    /// Returns `true` if the hook spec declares nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.block.is_none()
    }

    /// Validates the hook spec and converts it into hooks: names first, block last.
    ///
    /// # Errors
    ///
    /// - [`HookRegistrationError::InvalidRegistration`] if the hook spec is empty.
    /// - [`HookRegistrationError::UnsupportedHookValue`] if any name is not a
    ///   symbolic identifier.
    pub fn into_hooks(self) -> Result<Vec<Hook<T>>, HookRegistrationError> {
        if self.is_empty() {
            return Err(HookRegistrationError::InvalidRegistration);
        }

        let mut hooks = self
            .names
            .into_iter()
            .map(|name| HookName::parse(name).map(Hook::Named))
            .collect::<Result<Vec<_>, _>>()?;
        hooks.extend(self.block.map(Hook::Inline));
        Ok(hooks)
    }
}

impl<T> Default for HookSpec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for HookSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookSpec")
            .field("names", &self.names)
            .field("block", &self.block.is_some())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HookList
// ─────────────────────────────────────────────────────────────────────────────

/// An immutable, shared sequence of hooks in registration order.
///
/// There is no way to mutate a list in place; the only way to add hooks is
/// [`extended`](Self::extended), which allocates a new list:
///
/// ```compile_fail
/// use rescue_hooks::hooks::{Hook, HookList};
///
/// let list = HookList::<()>::new();
/// list.push(Hook::Inline(std::sync::Arc::new(|_: &mut ()| Ok(()))));
/// ```
pub struct HookList<T> {
    hooks: Arc<[Hook<T>]>,
}

impl<T> HookList<T> {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            hooks: Arc::from(Vec::new()),
        }
    }

    /// Returns a new list holding `self` followed by `additions`.
    ///
    /// `self` is left untouched, so holders of the old list never observe
    /// the additions.
    #[must_use]
    pub fn extended(&self, additions: impl IntoIterator<Item = Hook<T>>) -> Self {
        let hooks: Vec<Hook<T>> = self.hooks.iter().cloned().chain(additions).collect();
        Self {
            hooks: Arc::from(hooks),
        }
    }

    /// Iterates hooks in registration order.
    pub fn iter(&self) -> core::slice::Iter<'_, Hook<T>> {
        self.hooks.iter()
    }

    /// Returns the number of hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns `true` if the list holds no hooks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Returns the log label of every hook, in order.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.hooks.iter().map(Hook::label).collect()
    }

    /// Returns `true` if both lists share the same allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.hooks, &other.hooks)
    }
}

impl<T> Clone for HookList<T> {
    fn clone(&self) -> Self {
        Self {
            hooks: Arc::clone(&self.hooks),
        }
    }
}

impl<T> Default for HookList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for HookList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.hooks.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a HookList<T> {
    type Item = &'a Hook<T>;
    type IntoIter = core::slice::Iter<'a, Hook<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.hooks.iter()
    }
}
