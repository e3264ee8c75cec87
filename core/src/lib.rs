//! Strongly-typed environment variable specifications.
//!
//! This crate describes environment variables; it never reads the
//! environment itself. The main pieces are:
//!
//! - [`Literal`]: the canonical string form of a value.
//! - [`Schema`]: converts between literals and native values, with the
//!   closed set of kinds [`NumericSchema`], [`StringSchema`], [`SetSchema`],
//!   [`BinarySchema`] and [`OtherSchema`].
//! - [`Constraint`]: an extra predicate over native values.
//! - [`Spec`]: the immutable declaration of one variable, built with
//!   [`SpecBuilder`] and viewed without its native type through [`AnySpec`].
//! - [`Example`]: documentation values, ranked by [`best_example`].
//! - [`add_relationship`]: links specs that supersede or refer to each other.
//!
//! Errors come in tiers: [`SpecError`] for malformed specifications (a
//! programming mistake), [`ValueError`] for bad input, and
//! [`RelationshipError`] for contradictory links. Schema violations carry a
//! [`SchemaError`] that renderers can visit with a [`SchemaErrorVisitor`].
//!
//! # Example
//!
//! ```
//! use envspec_core::*;
//!
//! let workers = SpecBuilder::<u8>::new("WORKERS", "number of worker threads")
//!     .default_value(4)
//!     .example(16, "a large machine")
//!     .done(NumericSchema::new().with_min(1).with_max(64));
//!
//! assert_eq!(workers.unmarshal(&Literal::new("8")).unwrap(), 8);
//!
//! let err = workers.unmarshal(&Literal::new("0")).unwrap_err();
//! assert_eq!(err.to_string(), "too low, expected between 1 and 64");
//!
//! let examples: Vec<&str> = workers.examples().iter().map(|e| e.canonical.as_str()).collect();
//! assert_eq!(examples, vec!["4", "16", "1", "64"]);
//! ```

mod constraint;
mod error;
mod example;
mod literal;
mod relationship;
pub mod schema;
mod spec;

pub use constraint::{Constraint, ConstraintInfo, check_all};
pub use error::{
    InvalidSchemaError, MarshalError, MaxError, MaxLengthError, MinError, MinLengthError,
    SchemaError, SchemaErrorVisitor, SetMembershipError, SpecError, ValueError,
};
pub use example::{Example, ExampleSource, best_example, compare_examples};
pub use literal::Literal;
pub use relationship::{
    Relationship, RelationshipError, RelationshipKind, RelationshipStore, SpecRef,
    add_relationship,
};
pub use schema::{
    Base64, BinaryInfo, BinarySchema, Encoding, Hex, LengthInfo, Number, NumericInfo,
    NumericSchema, OtherInfo, OtherSchema, Schema, SchemaInfo, SchemaVisitor, SetInfo, SetSchema,
    StringSchema, natural_limits,
};
pub use spec::{AnySpec, DefaultValue, Documentation, Spec, SpecBuilder, SpecId};
