//! Schema-independent predicates over native values.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::MarshalError;

type CheckFn<T> = Arc<dyn Fn(&T) -> Result<(), String> + Send + Sync>;

/// A named predicate over a native value.
///
/// Constraints run after the schema has accepted a value, in the order they
/// were attached. The first failure wins.
///
/// # Examples
///
/// ```
/// use envspec_core::Constraint;
///
/// let even = Constraint::new("must be even", |v: &u32| {
///     if v % 2 == 0 { Ok(()) } else { Err(format!("{v} is odd")) }
/// });
/// assert!(even.check(&4).is_ok());
/// assert_eq!(even.check(&3).unwrap_err().to_string(), "3 is odd");
/// ```
pub struct Constraint<T> {
    description: String,
    user_defined: bool,
    check: CheckFn<T>,
}

impl<T: 'static> Constraint<T> {
    /// Creates an application-defined constraint.
    pub fn new<F>(description: impl Into<String>, check: F) -> Self
    where
        F: Fn(&T) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            user_defined: true,
            check: Arc::new(check),
        }
    }

    /// Creates a constraint that ships with a library rather than the
    /// application.
    pub fn builtin<F>(description: impl Into<String>, check: F) -> Self
    where
        F: Fn(&T) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            user_defined: false,
            ..Self::new(description, check)
        }
    }
}

impl<T> Constraint<T> {
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_user_defined(&self) -> bool {
        self.user_defined
    }

    /// Runs the predicate.
    pub fn check(&self, value: &T) -> Result<(), MarshalError> {
        (self.check)(value).map_err(|reason| MarshalError::Constraint {
            description: self.description.clone(),
            reason,
        })
    }

    pub fn info(&self) -> ConstraintInfo {
        ConstraintInfo {
            description: self.description.clone(),
            user_defined: self.user_defined,
        }
    }
}

/// Runs `constraints` in order, stopping at the first failure.
pub fn check_all<T>(constraints: &[Constraint<T>], value: &T) -> Result<(), MarshalError> {
    constraints.iter().try_for_each(|c| c.check(value))
}

impl<T> Clone for Constraint<T> {
    fn clone(&self) -> Self {
        Self {
            description: self.description.clone(),
            user_defined: self.user_defined,
            check: Arc::clone(&self.check),
        }
    }
}

impl<T> fmt::Debug for Constraint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("description", &self.description)
            .field("user_defined", &self.user_defined)
            .finish_non_exhaustive()
    }
}

/// Type-erased description of a constraint, for renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintInfo {
    pub description: String,
    pub user_defined: bool,
}
