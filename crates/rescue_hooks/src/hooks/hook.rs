//! Hook values.
//!
//! A [`Hook`] is either a [`HookName`] resolved against the definition's
//! method table when it runs, or an inline closure that receives the
//! instance directly.

use core::fmt;
use std::sync::Arc;

use rescue_system::fault::Fault;

use super::api::HookRegistrationError;

/// Inline hook closure. Receives the executing instance as its receiver.
pub type InlineHook<T> = Arc<dyn Fn(&mut T) -> Result<(), Fault> + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// HookName
// ─────────────────────────────────────────────────────────────────────────────

/// A validated symbolic method name.
///
/// Valid names start with an ASCII letter or `_`, continue with ASCII
/// alphanumerics or `_`, and may end with a single `?` or `!`.
///
/// ```
/// use rescue_hooks::hooks::HookName;
///
/// assert!(HookName::parse("log_start").is_ok());
/// assert!(HookName::parse("ready?").is_ok());
/// assert!(HookName::parse("1").is_err());
/// assert!(HookName::parse("two words").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HookName(String);

impl HookName {
    /// Validates `value` as a symbolic name.
    ///
    /// # Errors
    ///
    /// Returns [`HookRegistrationError::UnsupportedHookValue`] if `value` is
    /// not a bare identifier.
    pub fn parse(value: impl Into<String>) -> Result<Self, HookRegistrationError> {
        let value = value.into();
        if is_symbol(&value) {
            Ok(Self(value))
        } else {
            Err(HookRegistrationError::UnsupportedHookValue { value })
        }
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for HookName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_symbol(value: &str) -> bool {
    let body = value.strip_suffix(['?', '!']).unwrap_or(value);

    let mut chars = body.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ─────────────────────────────────────────────────────────────────────────────
// Hook
// ─────────────────────────────────────────────────────────────────────────────

/// A single before or after hook.
pub enum Hook<T> {
    /// A method name resolved on the instance at call time.
    Named(HookName),
    /// A closure run with the instance as receiver.
    Inline(InlineHook<T>),
}

impl<T> Hook<T> {
    /// Returns the method name for named hooks.
    #[must_use]
    pub fn name(&self) -> Option<&HookName> {
        match self {
            Hook::Named(name) => Some(name),
            Hook::Inline(_) => None,
        }
    }

    /// Short label used in logs.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Hook::Named(name) => name.as_str(),
            Hook::Inline(_) => "<block>",
        }
    }
}

impl<T> Clone for Hook<T> {
    fn clone(&self) -> Self {
        match self {
            Hook::Named(name) => Hook::Named(name.clone()),
            Hook::Inline(block) => Hook::Inline(Arc::clone(block)),
        }
    }
}

impl<T> fmt::Debug for Hook<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::Named(name) => f.debug_tuple("Named").field(&name.as_str()).finish(),
            Hook::Inline(_) => f.write_str("Inline(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_identifiers() {
        for name in ["a", "_private", "inc_hook_exec_count", "valid?", "save!", "x1"] {
            assert!(HookName::parse(name).is_ok(), "{name} should be accepted");
        }
    }

    #[test]
    fn rejects_non_symbols() {
        for value in ["", "1", "1abc", "two words", "a-b", "?", "a??", "{}", "a!b"] {
            let err = HookName::parse(value).expect_err("should be rejected");
            match err {
                HookRegistrationError::UnsupportedHookValue { value: rejected } => {
                    assert_eq!(rejected, value);
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn label_distinguishes_named_and_inline() {
        let named: Hook<()> = Hook::Named(HookName::parse("log_start").unwrap());
        let inline: Hook<()> = Hook::Inline(Arc::new(|_: &mut ()| Ok::<(), Fault>(())));

        assert_eq!(named.label(), "log_start");
        assert_eq!(inline.label(), "<block>");
        assert!(inline.name().is_none());
    }
}
