//! Schemas describe which values a variable accepts.
//!
//! Every schema converts between a native value and its canonical
//! [`Literal`], validates values on the way through, and can offer example
//! values for documentation. The set of schema kinds is closed:
//!
//! - [`NumericSchema`] for any integer or floating-point type
//! - [`StringSchema`] for free-form strings with optional length bounds
//! - [`SetSchema`] for a finite enumeration of values
//! - [`BinarySchema`] for byte sequences in a textual [`Encoding`]
//! - [`OtherSchema`] for anything validated only by a caller-supplied parser
//!
//! Renderers inspect schemas through [`Schema::describe`], which returns a
//! [`SchemaInfo`] that can be matched on or visited with a
//! [`SchemaVisitor`].

mod binary;
mod numeric;
mod other;
mod set;
mod string;

use std::fmt;

use serde::Serialize;

use crate::error::{InvalidSchemaError, MarshalError};
use crate::example::Example;
use crate::literal::Literal;

pub use binary::{Base64, BinarySchema, Encoding, Hex};
pub use numeric::{Number, NumericSchema, natural_limits};
pub use other::OtherSchema;
pub use set::SetSchema;
pub use string::StringSchema;

/// A typed description of the values a variable accepts.
///
/// Implementations are immutable once handed to a
/// [`SpecBuilder`](crate::SpecBuilder). The builder calls
/// [`finalize`](Schema::finalize) exactly once before any other method is
/// relied upon.
pub trait Schema<T>: fmt::Debug + Send + Sync {
    /// Describes the schema for renderers.
    fn describe(&self) -> SchemaInfo;

    /// Checks the schema's own configuration.
    fn finalize(&self) -> Result<(), InvalidSchemaError>;

    /// Validates `value` and returns its canonical literal.
    fn marshal(&self, value: &T) -> Result<Literal, MarshalError>;

    /// Parses and validates `literal`.
    fn unmarshal(&self, literal: &Literal) -> Result<T, MarshalError>;

    /// Example values for documentation.
    ///
    /// In conservative mode the schema only offers values it is confident
    /// are useful, because better examples already exist.
    fn examples(&self, conservative: bool) -> Vec<Example>;
}

/// Description of a numeric schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumericInfo {
    /// Native type name, e.g. `u16` or `f64`.
    pub type_name: &'static str,
    /// Configured minimum, if any.
    pub min: Option<Literal>,
    /// Configured maximum, if any.
    pub max: Option<Literal>,
    /// Effective minimum: configured minimum or the type's natural minimum.
    pub limit_min: Literal,
    /// Effective maximum: configured maximum or the type's natural maximum.
    pub limit_max: Literal,
}

/// Length bounds in bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LengthInfo {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl LengthInfo {
    /// Returns `true` if exactly one length is accepted.
    pub fn is_exact(&self) -> bool {
        matches!((self.min, self.max), (Some(min), Some(max)) if min == max)
    }
}

/// Description of a set schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetInfo {
    /// Member literals in declaration order.
    pub members: Vec<Literal>,
}

/// Description of a binary schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinaryInfo {
    /// Name of the textual encoding, e.g. `hex`.
    pub encoding: &'static str,
    /// Bounds on the decoded value, in bytes.
    pub length: LengthInfo,
    /// Bounds on the encoded literal, in bytes.
    pub literal_length: LengthInfo,
}

/// Description of a schema with no structural validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OtherInfo {
    pub type_name: &'static str,
}

/// Closed set of schema descriptions.
///
/// # Examples
///
/// ```
/// use envspec_core::{NumericSchema, Schema, SchemaInfo};
///
/// let info = NumericSchema::<i8>::new().describe();
/// match info {
///     SchemaInfo::Numeric(n) => {
///         assert_eq!(n.limit_min.as_str(), "-128");
///         assert_eq!(n.limit_max.as_str(), "127");
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaInfo {
    Numeric(NumericInfo),
    String(LengthInfo),
    Set(SetInfo),
    Binary(BinaryInfo),
    Other(OtherInfo),
}

impl SchemaInfo {
    /// Short name of the schema kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SchemaInfo::Numeric(_) => "numeric",
            SchemaInfo::String(_) => "string",
            SchemaInfo::Set(_) => "set",
            SchemaInfo::Binary(_) => "binary",
            SchemaInfo::Other(_) => "other",
        }
    }

    /// Dispatches to the visitor method matching this schema's kind.
    pub fn accept<V: SchemaVisitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            SchemaInfo::Numeric(info) => visitor.visit_numeric(info),
            SchemaInfo::String(info) => visitor.visit_string(info),
            SchemaInfo::Set(info) => visitor.visit_set(info),
            SchemaInfo::Binary(info) => visitor.visit_binary(info),
            SchemaInfo::Other(info) => visitor.visit_other(info),
        }
    }
}

/// Double-dispatch target for [`SchemaInfo`] kinds.
pub trait SchemaVisitor {
    fn visit_numeric(&mut self, info: &NumericInfo);
    fn visit_string(&mut self, info: &LengthInfo);
    fn visit_set(&mut self, info: &SetInfo);
    fn visit_binary(&mut self, info: &BinaryInfo);
    fn visit_other(&mut self, info: &OtherInfo);
}

/// Checks configured length bounds. Shared by string and binary schemas.
pub(crate) fn finalize_length(info: &LengthInfo) -> Result<(), InvalidSchemaError> {
    if let Some(min) = info.min {
        if min < 1 {
            return Err(InvalidSchemaError::new(
                "minimum length must be at least 1 byte",
            ));
        }
    }
    if let (Some(min), Some(max)) = (info.min, info.max) {
        if max < min {
            return Err(InvalidSchemaError::new(format!(
                "maximum length ({max}) is less than minimum length ({min})"
            )));
        }
    }
    Ok(())
}

/// Checks `length` against configured bounds.
pub(crate) fn check_length(info: &LengthInfo, length: usize) -> Result<(), MarshalError> {
    use crate::error::{MaxLengthError, MinLengthError, SchemaError};

    if let Some(min) = info.min {
        if length < min {
            return Err(SchemaError::from(MinLengthError {
                schema: info.clone(),
                length,
            })
            .into());
        }
    }
    if let Some(max) = info.max {
        if length > max {
            return Err(SchemaError::from(MaxLengthError {
                schema: info.clone(),
                length,
            })
            .into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct KindCollector(Vec<&'static str>);

    impl SchemaVisitor for KindCollector {
        fn visit_numeric(&mut self, _: &NumericInfo) {
            self.0.push("numeric");
        }
        fn visit_string(&mut self, _: &LengthInfo) {
            self.0.push("string");
        }
        fn visit_set(&mut self, _: &SetInfo) {
            self.0.push("set");
        }
        fn visit_binary(&mut self, _: &BinaryInfo) {
            self.0.push("binary");
        }
        fn visit_other(&mut self, _: &OtherInfo) {
            self.0.push("other");
        }
    }

    #[test]
    fn test_visitor_dispatch_covers_every_kind() {
        let infos = [
            NumericSchema::<u16>::new().describe(),
            StringSchema::new().describe(),
            SetSchema::boolean("true", "false").describe(),
            BinarySchema::new(Hex).describe(),
            OtherSchema::<std::net::Ipv4Addr>::via_from_str().describe(),
        ];

        let mut collector = KindCollector::default();
        for info in &infos {
            info.accept(&mut collector);
        }
        assert_eq!(collector.0, vec!["numeric", "string", "set", "binary", "other"]);
        assert_eq!(
            infos.iter().map(SchemaInfo::kind).collect::<Vec<_>>(),
            collector.0
        );
    }

    #[test]
    fn test_finalize_length() {
        assert!(finalize_length(&LengthInfo::default()).is_ok());
        assert!(finalize_length(&LengthInfo { min: Some(0), max: None }).is_err());
        assert!(finalize_length(&LengthInfo { min: Some(4), max: Some(2) }).is_err());
        assert!(finalize_length(&LengthInfo { min: Some(2), max: Some(2) }).is_ok());
    }

    #[test]
    fn test_schema_info_serializes_with_kind_tag() {
        let info = StringSchema::new().with_min_length(3).describe();
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["kind"], "string");
        assert_eq!(json["min"], 3);
    }
}
