//! Error types for registry operations.

use envspec_core::{RelationshipError, ValueError};
use thiserror::Error;

/// Errors returned by the registry and its fixtures.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A variable with the same name is already registered.
    #[error("variable {0} is already registered")]
    AlreadyRegistered(String),

    #[error("variable {0} is not registered")]
    NotRegistered(String),

    /// The variable exists but holds a different native type.
    #[error("variable {name} does not hold values of type {expected}")]
    TypeMismatch { name: String, expected: &'static str },

    #[error(transparent)]
    Relationship(#[from] RelationshipError),

    /// A fixture names a variable that no process environment can hold.
    #[error("invalid environment variable {name:?}: {reason}")]
    InvalidVariable { name: String, reason: &'static str },

    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Convenience alias for results with [`RegistryError`].
pub type Result<T> = std::result::Result<T, RegistryError>;

/// A problem found by [`Registry::validate`](crate::Registry::validate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The environment holds a value the variable rejects.
    #[error(transparent)]
    Invalid(#[from] ValueError),

    /// A required variable has neither a value nor a default.
    #[error("{0} is required but not set")]
    Missing(String),
}

impl ValidationError {
    /// Name of the offending variable.
    pub fn name(&self) -> &str {
        match self {
            Self::Invalid(err) => &err.name,
            Self::Missing(name) => name,
        }
    }
}
