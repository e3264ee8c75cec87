//! Error taxonomy for specifications and values.
//!
//! Errors fall into three tiers:
//!
//! - [`SpecError`]: the specification itself is malformed. These surface
//!   when a [`SpecBuilder`](crate::SpecBuilder) finishes and are fatal.
//! - [`ValueError`]: the value found in the environment is invalid. These are
//!   recoverable and reported to whoever configured the process.
//! - Internal invariant violations (a schema that cannot re-marshal a value
//!   it just accepted) panic and have no error type.
//!
//! Schema violations ([`SchemaError`]) carry a description of the schema they
//! violated so that renderers can produce tailored messages through
//! [`SchemaErrorVisitor`] without matching on the enum themselves.

use thiserror::Error;

use crate::literal::Literal;
use crate::schema::{LengthInfo, NumericInfo, SetInfo};

/// A value is below the configured minimum of a numeric schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("too low, expected {}", numeric_range(.schema))]
pub struct MinError {
    /// The numeric schema that was violated.
    pub schema: NumericInfo,
}

/// A value is above the configured maximum of a numeric schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("too high, expected {}", numeric_range(.schema))]
pub struct MaxError {
    /// The numeric schema that was violated.
    pub schema: NumericInfo,
}

/// A value is shorter than the configured minimum length.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("too short, expected length to be {}", length_range(.schema))]
pub struct MinLengthError {
    /// Length bounds of the violated schema.
    pub schema: LengthInfo,
    /// Actual length of the rejected value, in bytes.
    pub length: usize,
}

/// A value is longer than the configured maximum length.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("too long, expected length to be {}", length_range(.schema))]
pub struct MaxLengthError {
    /// Length bounds of the violated schema.
    pub schema: LengthInfo,
    /// Actual length of the rejected value, in bytes.
    pub length: usize,
}

/// A value is not one of the members of a set schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {}", set_alternatives(.schema))]
pub struct SetMembershipError {
    /// The set schema that was violated.
    pub schema: SetInfo,
}

/// A value violates the structural rules of its schema.
///
/// The variant set is closed. Renderers that need per-kind messages can
/// either match on it or implement [`SchemaErrorVisitor`].
///
/// # Examples
///
/// ```
/// use envspec_core::{Literal, Schema, SchemaError, NumericSchema, MarshalError};
///
/// let schema = NumericSchema::<u8>::new().with_min(10).with_max(20);
/// let err = schema.unmarshal(&Literal::new("5")).unwrap_err();
/// assert!(matches!(err, MarshalError::Schema(SchemaError::Min(_))));
/// assert_eq!(err.to_string(), "too low, expected between 10 and 20");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Numeric value below the configured minimum.
    #[error(transparent)]
    Min(#[from] MinError),
    /// Numeric value above the configured maximum.
    #[error(transparent)]
    Max(#[from] MaxError),
    /// String or binary value shorter than the configured minimum length.
    #[error(transparent)]
    MinLength(#[from] MinLengthError),
    /// String or binary value longer than the configured maximum length.
    #[error(transparent)]
    MaxLength(#[from] MaxLengthError),
    /// Value outside of a set's members.
    #[error(transparent)]
    SetMembership(#[from] SetMembershipError),
}

impl SchemaError {
    /// Dispatches to the visitor method matching this error's kind.
    pub fn accept<V: SchemaErrorVisitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            SchemaError::Min(err) => visitor.visit_min(err),
            SchemaError::Max(err) => visitor.visit_max(err),
            SchemaError::MinLength(err) => visitor.visit_min_length(err),
            SchemaError::MaxLength(err) => visitor.visit_max_length(err),
            SchemaError::SetMembership(err) => visitor.visit_set_membership(err),
        }
    }
}

/// Double-dispatch target for [`SchemaError`] kinds.
pub trait SchemaErrorVisitor {
    fn visit_min(&mut self, err: &MinError);
    fn visit_max(&mut self, err: &MaxError);
    fn visit_min_length(&mut self, err: &MinLengthError);
    fn visit_max_length(&mut self, err: &MaxLengthError);
    fn visit_set_membership(&mut self, err: &SetMembershipError);
}

/// Failure to convert between a native value and its literal, or to validate
/// a native value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarshalError {
    /// The value breaks a structural rule of the schema.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// The value fails a constraint attached to the specification.
    #[error("{reason}")]
    Constraint {
        /// Description of the constraint that failed.
        description: String,
        /// Reason given by the constraint's check.
        reason: String,
    },
    /// The literal could not be parsed, or a custom marshaler rejected it.
    #[error("{0}")]
    Malformed(String),
}

impl MarshalError {
    /// Returns the underlying schema violation, if any.
    pub fn schema_error(&self) -> Option<&SchemaError> {
        match self {
            MarshalError::Schema(err) => Some(err),
            _ => None,
        }
    }
}

/// The runtime value of a variable is invalid.
///
/// Always carries the offending literal. For sensitive variables the literal
/// is kept for programmatic access but left out of the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", value_error_message(.name, .literal, .sensitive, .cause))]
pub struct ValueError {
    /// Name of the variable.
    pub name: String,
    /// The literal exactly as it was found in the environment.
    pub literal: Literal,
    /// Whether the variable is marked sensitive.
    pub sensitive: bool,
    /// Why the literal was rejected.
    #[source]
    pub cause: MarshalError,
}

impl ValueError {
    pub fn new(
        name: impl Into<String>,
        literal: Literal,
        sensitive: bool,
        cause: MarshalError,
    ) -> Self {
        Self {
            name: name.into(),
            literal,
            sensitive,
            cause,
        }
    }
}

/// A schema's own configuration is invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct InvalidSchemaError {
    pub reason: String,
}

impl InvalidSchemaError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// The specification is malformed.
///
/// Raised once, when the builder finishes. A malformed specification is a
/// programming error in the application.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("specification is invalid: variable name must not be empty")]
    MissingName,

    #[error("specification for {name} is invalid: description must not be empty")]
    MissingDescription { name: String },

    #[error("specification for {name} is invalid: {source}")]
    InvalidSchema {
        name: String,
        #[source]
        source: InvalidSchemaError,
    },

    #[error("specification for {name} is invalid: default value: {cause}")]
    InvalidDefault { name: String, cause: MarshalError },

    #[error("specification for {name} is invalid: example #{index}: {cause}")]
    InvalidExample {
        name: String,
        index: usize,
        cause: MarshalError,
    },

    #[error("specification for {name} is invalid: no examples could be produced")]
    NoExamples { name: String },
}

fn numeric_range(schema: &NumericInfo) -> String {
    match (&schema.min, &schema.max) {
        (Some(min), Some(max)) => format!("between {min} and {max}"),
        (Some(min), None) => format!("{min} or greater"),
        (None, Some(max)) => format!("{max} or less"),
        (None, None) => format!("between {} and {}", schema.limit_min, schema.limit_max),
    }
}

fn length_range(schema: &LengthInfo) -> String {
    match (schema.min, schema.max) {
        (Some(min), Some(max)) if min == max => format!("exactly {min} {}", bytes(min)),
        (Some(min), Some(max)) => format!("between {min} and {max} bytes"),
        (Some(min), None) => format!("at least {min} {}", bytes(min)),
        (None, Some(max)) => format!("at most {max} {}", bytes(max)),
        (None, None) => "non-empty".to_string(),
    }
}

fn bytes(n: usize) -> &'static str {
    if n == 1 { "byte" } else { "bytes" }
}

fn set_alternatives(schema: &SetInfo) -> String {
    let quoted: Vec<String> = schema
        .members
        .iter()
        .map(|m| m.quote().into_owned())
        .collect();

    match quoted.as_slice() {
        [] => "no value, the set is empty".to_string(),
        [only] => only.clone(),
        [a, b] => format!("either {a} or {b}"),
        [a, b, c] => format!("{a}, {b} or {c}"),
        [a, b, c, d] => format!("{a}, {b}, {c} or {d}"),
        [a, b, .., last] => format!(
            "{a}, {b} ... {last}, or one of {} other values",
            quoted.len() - 3
        ),
    }
}

fn value_error_message(
    name: &str,
    literal: &Literal,
    sensitive: &bool,
    cause: &MarshalError,
) -> String {
    if *sensitive {
        format!("value of {name} is invalid: {cause}")
    } else {
        format!("value of {name} ({}) is invalid: {cause}", literal.quote())
    }
}
