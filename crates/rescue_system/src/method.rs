//! Named instance methods.
//!
//! A [`MethodTable`] maps symbolic names to zero-argument callables on an
//! instance type `T`. Named hooks and named rescue handlers are resolved
//! against it when they run, so a missing name surfaces as an explicit error
//! instead of a generic dispatch failure.

use core::fmt;
use std::sync::Arc;

use hashbrown::HashMap;

use crate::fault::Fault;

/// A named zero-argument method on `T`.
pub type Method<T> = Arc<dyn Fn(&mut T) -> Result<(), Fault> + Send + Sync>;

/// Lookup table from method name to [`Method`].
///
/// Cloning is cheap: entries are reference counted, so a subtype can copy its
/// parent's table and then override entries without touching the parent.
pub struct MethodTable<T> {
    methods: HashMap<String, Method<T>>,
}

impl<T> MethodTable<T> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            methods: HashMap::new(),
        }
    }

    /// Defines (or overrides) a method, returning the previous definition.
    pub fn define<F>(&mut self, name: impl Into<String>, method: F) -> Option<Method<T>>
    where
        F: Fn(&mut T) -> Result<(), Fault> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(method))
    }

    /// Returns the method registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Method<T>> {
        self.methods.get(name)
    }

    /// Returns whether a method with the given name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Invokes the method `name` on `instance`.
    ///
    /// Returns `None` if no such method is defined.
    pub fn call(&self, name: &str, instance: &mut T) -> Option<Result<(), Fault>> {
        self.methods.get(name).map(|method| method(instance))
    }

    /// Returns the defined method names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of defined methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Returns `true` if no methods are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl<T> Default for MethodTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for MethodTable<T> {
    fn clone(&self) -> Self {
        Self {
            methods: self.methods.clone(),
        }
    }
}

impl<T> fmt::Debug for MethodTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodTable")
            .field("methods", &self.names())
            .finish()
    }
}
