//! Variable specifications and their builder.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::constraint::{Constraint, ConstraintInfo, check_all};
use crate::error::{MarshalError, SpecError};
use crate::example::{Example, SuppliedExample, best_example, build_examples, marshal_checked};
use crate::literal::Literal;
use crate::relationship::{Relationship, RelationshipKind, RelationshipStore, SpecRef};
use crate::schema::{Schema, SchemaInfo};

static NEXT_SPEC_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a built specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SpecId(u64);

impl SpecId {
    fn next() -> Self {
        Self(NEXT_SPEC_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// A default value together with its canonical literal.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultValue<T> {
    pub value: T,
    pub literal: Literal,
}

/// Long-form documentation attached to a specification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Documentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub paragraphs: Vec<String>,
    /// Paragraphs a renderer should make stand out.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub important: Vec<String>,
}

impl Documentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_paragraph(mut self, text: impl Into<String>) -> Self {
        self.paragraphs.push(text.into());
        self
    }

    pub fn with_important(mut self, text: impl Into<String>) -> Self {
        self.important.push(text.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.paragraphs.is_empty() && self.important.is_empty()
    }
}

/// The complete declaration of one environment variable.
///
/// Built once by [`SpecBuilder`] and immutable afterwards, except for the
/// relationships added through [`add_relationship`](crate::add_relationship).
#[derive(Debug)]
pub struct Spec<T> {
    id: SpecId,
    name: String,
    description: String,
    schema: Box<dyn Schema<T>>,
    default: Option<DefaultValue<T>>,
    required: bool,
    sensitive: bool,
    deprecated: bool,
    constraints: Vec<Constraint<T>>,
    examples: Vec<Example>,
    documentation: Documentation,
    relationships: RelationshipStore,
}

impl<T> Spec<T> {
    pub fn schema(&self) -> &dyn Schema<T> {
        self.schema.as_ref()
    }

    pub fn default_value(&self) -> Option<&DefaultValue<T>> {
        self.default.as_ref()
    }

    pub fn constraints(&self) -> &[Constraint<T>] {
        &self.constraints
    }

    /// Checks `value` and produces its canonical literal.
    pub fn marshal(&self, value: &T) -> Result<Literal, MarshalError> {
        marshal_checked(self.schema(), &self.constraints, value)
    }

    /// Parses `literal` and checks the result against the constraints.
    pub fn unmarshal(&self, literal: &Literal) -> Result<T, MarshalError> {
        let value = self.schema.unmarshal(literal)?;
        check_all(&self.constraints, &value)?;
        Ok(value)
    }

    /// Checks `value` against the schema and the constraints.
    pub fn validate(&self, value: &T) -> Result<(), MarshalError> {
        self.marshal(value).map(|_| ())
    }
}

/// Type-erased view of a [`Spec`].
///
/// Lets renderers, registries and the relationship graph handle
/// specifications of different native types together.
pub trait AnySpec: fmt::Debug + Send + Sync {
    fn id(&self) -> SpecId;

    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn schema_info(&self) -> SchemaInfo;

    fn default_literal(&self) -> Option<&Literal>;

    fn is_required(&self) -> bool;

    fn is_sensitive(&self) -> bool;

    fn is_deprecated(&self) -> bool;

    fn constraint_info(&self) -> Vec<ConstraintInfo>;

    /// Examples, deduplicated, in documentation order.
    fn examples(&self) -> &[Example];

    fn documentation(&self) -> &Documentation;

    /// The raw relationship store; see [`add_relationship`](crate::add_relationship).
    fn relationship_store(&self) -> &RelationshipStore;

    fn as_any(&self) -> &dyn Any;

    fn spec_ref(&self) -> SpecRef {
        SpecRef {
            id: self.id(),
            name: self.name().to_string(),
        }
    }

    fn best_example(&self) -> Option<&Example> {
        best_example(self.examples(), self.default_literal())
    }

    /// Relationships with this spec as subject, in insertion order.
    fn relationships(&self) -> Vec<Relationship> {
        let id = self.id();
        self.relationship_store()
            .snapshot()
            .iter()
            .map(|r| r.from_perspective(id))
            .collect()
    }

    /// The specs this one relates to through `kind`.
    fn related(&self, kind: RelationshipKind) -> Vec<SpecRef> {
        self.relationships()
            .into_iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.object)
            .collect()
    }

    fn supersedes(&self) -> Vec<SpecRef> {
        self.related(RelationshipKind::Supersedes)
    }

    fn superseded_by(&self) -> Vec<SpecRef> {
        self.related(RelationshipKind::IsSupersededBy)
    }

    fn refers_to(&self) -> Vec<SpecRef> {
        self.related(RelationshipKind::RefersTo)
    }

    fn referred_to_by(&self) -> Vec<SpecRef> {
        self.related(RelationshipKind::IsReferredToBy)
    }
}

impl<T> AnySpec for Spec<T>
where
    T: fmt::Debug + Send + Sync + 'static,
{
    fn id(&self) -> SpecId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn schema_info(&self) -> SchemaInfo {
        self.schema.describe()
    }

    fn default_literal(&self) -> Option<&Literal> {
        self.default.as_ref().map(|d| &d.literal)
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    fn constraint_info(&self) -> Vec<ConstraintInfo> {
        self.constraints.iter().map(Constraint::info).collect()
    }

    fn examples(&self) -> &[Example] {
        &self.examples
    }

    fn documentation(&self) -> &Documentation {
        &self.documentation
    }

    fn relationship_store(&self) -> &RelationshipStore {
        &self.relationships
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Accumulates the parts of a [`Spec`].
///
/// Nothing is checked until [`done`](Self::done) or
/// [`try_done`](Self::try_done), which consume the builder.
///
/// # Examples
///
/// ```
/// use envspec_core::{AnySpec, NumericSchema, SpecBuilder};
///
/// let port = SpecBuilder::<u16>::new("PORT", "the port to listen on")
///     .default_value(8080)
///     .done(NumericSchema::new().with_min(1024));
///
/// assert_eq!(port.default_literal().unwrap().as_str(), "8080");
/// assert_eq!(port.examples()[0].canonical.as_str(), "8080");
/// assert!(!port.is_required());
/// ```
#[derive(Debug)]
pub struct SpecBuilder<T> {
    name: String,
    description: String,
    default: Option<T>,
    required: bool,
    sensitive: bool,
    deprecated: bool,
    constraints: Vec<Constraint<T>>,
    examples: Vec<SuppliedExample<T>>,
    documentation: Documentation,
}

impl<T> SpecBuilder<T> {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            default: None,
            required: false,
            sensitive: false,
            deprecated: false,
            constraints: Vec::new(),
            examples: Vec::new(),
            documentation: Documentation::default(),
        }
    }

    /// Value used when the variable is unset or empty.
    pub fn default_value(mut self, value: T) -> Self {
        self.default = Some(value);
        self
    }

    /// The variable must produce a value, either from the environment or
    /// from the default.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The value must not appear in logs or reports.
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn constraint(mut self, constraint: Constraint<T>) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn example(mut self, value: T, description: impl Into<String>) -> Self {
        self.examples.push(SuppliedExample {
            value,
            description: description.into(),
            normative: false,
        });
        self
    }

    /// Like [`example`](Self::example), for a value that belongs to a known,
    /// exhaustive list.
    pub fn normative_example(mut self, value: T, description: impl Into<String>) -> Self {
        self.examples.push(SuppliedExample {
            value,
            description: description.into(),
            normative: true,
        });
        self
    }

    pub fn documentation(mut self, documentation: Documentation) -> Self {
        self.documentation = documentation;
        self
    }

    /// Validates everything and builds the spec.
    pub fn try_done<S>(self, schema: S) -> Result<Spec<T>, SpecError>
    where
        S: Schema<T> + 'static,
    {
        if self.name.is_empty() {
            return Err(SpecError::MissingName);
        }
        if self.description.is_empty() {
            return Err(SpecError::MissingDescription { name: self.name });
        }

        schema.finalize().map_err(|source| SpecError::InvalidSchema {
            name: self.name.clone(),
            source,
        })?;

        let default = match self.default {
            Some(value) => {
                let literal = marshal_checked(&schema, &self.constraints, &value).map_err(|cause| {
                    SpecError::InvalidDefault {
                        name: self.name.clone(),
                        cause,
                    }
                })?;
                Some(DefaultValue { value, literal })
            }
            None => None,
        };

        let examples = build_examples(
            &self.name,
            &schema,
            &self.constraints,
            &self.examples,
            default.as_ref().map(|d| &d.literal),
        )?;

        tracing::debug!(
            variable = %self.name,
            kind = schema.describe().kind(),
            examples = examples.len(),
            "built specification"
        );

        Ok(Spec {
            id: SpecId::next(),
            name: self.name,
            description: self.description,
            schema: Box::new(schema),
            default,
            required: self.required,
            sensitive: self.sensitive,
            deprecated: self.deprecated,
            constraints: self.constraints,
            examples,
            documentation: self.documentation,
            relationships: RelationshipStore::new(),
        })
    }

    /// Like [`try_done`](Self::try_done), but a malformed specification is
    /// fatal.
    ///
    /// # Panics
    ///
    /// Panics with the [`SpecError`] if the specification is invalid.
    pub fn done<S>(self, schema: S) -> Spec<T>
    where
        S: Schema<T> + 'static,
    {
        match self.try_done(schema) {
            Ok(spec) => spec,
            Err(err) => panic!("{err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use crate::example::ExampleSource;
    use crate::schema::{NumericSchema, OtherSchema, SetSchema, StringSchema};
    use std::net::Ipv4Addr;

    #[test]
    fn test_missing_name_and_description() {
        let err = SpecBuilder::<String>::new("", "x").try_done(StringSchema::new()).unwrap_err();
        assert_eq!(err, SpecError::MissingName);
        assert_eq!(err.to_string(), "specification is invalid: variable name must not be empty");

        let err = SpecBuilder::<String>::new("NAME", "").try_done(StringSchema::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "specification for NAME is invalid: description must not be empty"
        );
    }

    #[test]
    fn test_invalid_schema_is_named() {
        let err = SpecBuilder::<u8>::new("N", "n")
            .try_done(NumericSchema::new().with_min(10).with_max(5))
            .unwrap_err();
        assert!(matches!(err, SpecError::InvalidSchema { ref name, .. } if name == "N"));
    }

    #[test]
    fn test_invalid_default() {
        let err = SpecBuilder::<u8>::new("N", "n")
            .default_value(50)
            .try_done(NumericSchema::new().with_max(10))
            .unwrap_err();
        assert!(matches!(
            err,
            SpecError::InvalidDefault {
                cause: MarshalError::Schema(SchemaError::Max(_)),
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "specification for N is invalid: default value: too high, expected 10 or less"
        );
    }

    #[test]
    fn test_default_failing_constraint() {
        let err = SpecBuilder::<u8>::new("N", "n")
            .default_value(3)
            .constraint(Constraint::new("even", |v: &u8| {
                if v % 2 == 0 { Ok(()) } else { Err("must be even".into()) }
            }))
            .try_done(NumericSchema::new())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "specification for N is invalid: default value: must be even"
        );
    }

    #[test]
    fn test_no_examples_is_an_error() {
        let err = SpecBuilder::<Ipv4Addr>::new("ADDR", "address")
            .try_done(OtherSchema::via_from_str())
            .unwrap_err();
        assert_eq!(err, SpecError::NoExamples { name: "ADDR".into() });

        let spec = SpecBuilder::new("ADDR", "address")
            .example(Ipv4Addr::LOCALHOST, "loopback")
            .done(OtherSchema::via_from_str());
        assert_eq!(spec.examples()[0].canonical.as_str(), "127.0.0.1");
        assert_eq!(spec.examples()[0].source, ExampleSource::Builder);
    }

    #[test]
    #[should_panic(expected = "specification for N is invalid")]
    fn test_done_panics_on_error() {
        let _ = SpecBuilder::<u8>::new("N", "n")
            .default_value(50)
            .done(NumericSchema::new().with_max(10));
    }

    #[test]
    fn test_flags_and_documentation() {
        let docs = Documentation::new()
            .with_summary("Log level")
            .with_paragraph("Controls verbosity.")
            .with_important("Debug output may contain secrets.");
        let spec = SpecBuilder::<String>::new("LOG_LEVEL", "log level")
            .required()
            .sensitive()
            .deprecated()
            .documentation(docs.clone())
            .done(SetSchema::from_literals(["debug", "info"]));

        assert!(spec.is_required() && spec.is_sensitive() && spec.is_deprecated());
        assert_eq!(spec.documentation(), &docs);
        assert!(!spec.documentation().is_empty());
        assert_eq!(spec.schema_info().kind(), "set");
    }

    #[test]
    fn test_marshal_and_unmarshal_apply_constraints() {
        let spec = SpecBuilder::<i32>::new("N", "n")
            .default_value(2)
            .constraint(Constraint::new("even", |v: &i32| {
                if v % 2 == 0 { Ok(()) } else { Err("must be even".into()) }
            }))
            .done(NumericSchema::new());

        assert_eq!(spec.marshal(&4).unwrap().as_str(), "4");
        assert!(spec.marshal(&5).is_err());
        assert_eq!(spec.unmarshal(&Literal::new("-6")).unwrap(), -6);
        assert!(spec.unmarshal(&Literal::new("7")).is_err());
        assert!(spec.validate(&8).is_ok());
        assert_eq!(spec.constraint_info()[0].description, "even");
    }

    #[test]
    fn test_ids_are_unique() {
        let a = SpecBuilder::<String>::new("A", "a")
            .example("x".into(), "")
            .done(StringSchema::new());
        let b = SpecBuilder::<String>::new("A", "a")
            .example("x".into(), "")
            .done(StringSchema::new());
        assert_ne!(a.id(), b.id());
        assert_eq!(a.spec_ref().name, "A");
    }

    #[test]
    fn test_downcast_through_any() {
        let spec = SpecBuilder::<u8>::new("N", "n").default_value(1).done(NumericSchema::new());
        let erased: &dyn AnySpec = &spec;
        let typed = erased.as_any().downcast_ref::<Spec<u8>>().unwrap();
        assert_eq!(typed.default_value().unwrap().value, 1);
        assert!(erased.as_any().downcast_ref::<Spec<u16>>().is_none());
    }

    #[test]
    fn test_best_example_uses_default() {
        let spec = SpecBuilder::<u8>::new("N", "n")
            .example(7, "a lucky number")
            .default_value(3)
            .done(NumericSchema::new());
        assert_eq!(spec.best_example().unwrap().canonical.as_str(), "3");
    }
}
