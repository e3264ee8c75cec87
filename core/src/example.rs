//! Example values for documentation.
//!
//! A specification's examples come from three places, merged by
//! [`build_examples`]:
//!
//! 1. examples supplied to the builder, in call order;
//! 2. examples generated by the schema, in conservative mode when the
//!    builder supplied examples or a default;
//! 3. the default value, placed first.
//!
//! Examples are unique by canonical literal; the first occurrence wins.
//! [`best_example`] then picks a single example to show.

use std::cmp::Ordering;

use serde::Serialize;

use crate::constraint::{Constraint, check_all};
use crate::error::{MarshalError, SpecError};
use crate::literal::Literal;
use crate::schema::Schema;

/// Where an example came from, ordered from lowest to highest priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExampleSource {
    #[default]
    Unknown,
    /// Generated by the schema.
    Schema,
    /// Supplied to the builder by the application.
    Builder,
    /// Derived from the default value.
    Default,
}

/// An illustrative value of a variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Example {
    /// The value as it would appear in the environment.
    pub canonical: Literal,
    /// What the example illustrates. May be empty.
    pub description: String,
    /// Whether the example is one of a known, exhaustive list of values
    /// rather than an arbitrary sample.
    pub normative: bool,
    pub source: ExampleSource,
}

impl Example {
    pub fn new(
        canonical: impl Into<Literal>,
        description: impl Into<String>,
        source: ExampleSource,
    ) -> Self {
        Self {
            canonical: canonical.into(),
            description: description.into(),
            normative: false,
            source,
        }
    }

    /// Marks the example as normative.
    pub fn normative(mut self) -> Self {
        self.normative = true;
        self
    }
}

/// A native example handed to the builder, marshaled when the spec is built.
#[derive(Debug, Clone)]
pub(crate) struct SuppliedExample<T> {
    pub value: T,
    pub description: String,
    pub normative: bool,
}

fn push_unique(examples: &mut Vec<Example>, example: Example) -> bool {
    if examples.iter().any(|e| e.canonical == example.canonical) {
        return false;
    }
    examples.push(example);
    true
}

/// Produces a canonical literal for `value` through the schema and the
/// constraints.
pub(crate) fn marshal_checked<T>(
    schema: &dyn Schema<T>,
    constraints: &[Constraint<T>],
    value: &T,
) -> Result<Literal, MarshalError> {
    let literal = schema.marshal(value)?;
    check_all(constraints, value)?;
    Ok(literal)
}

/// Merges supplied, schema-generated and default examples.
///
/// Schema-generated examples that fail validation are skipped. If the
/// default's literal is already present, that example is reclassified as
/// the default in place rather than moved.
pub(crate) fn build_examples<T>(
    name: &str,
    schema: &dyn Schema<T>,
    constraints: &[Constraint<T>],
    supplied: &[SuppliedExample<T>],
    default: Option<&Literal>,
) -> Result<Vec<Example>, SpecError> {
    let mut examples = Vec::new();

    for (index, example) in supplied.iter().enumerate() {
        let canonical = marshal_checked(schema, constraints, &example.value).map_err(|cause| {
            SpecError::InvalidExample {
                name: name.to_string(),
                index,
                cause,
            }
        })?;
        push_unique(
            &mut examples,
            Example {
                canonical,
                description: example.description.clone(),
                normative: example.normative,
                source: ExampleSource::Builder,
            },
        );
    }

    let conservative = !supplied.is_empty() || default.is_some();
    for generated in schema.examples(conservative) {
        let canonical = schema
            .unmarshal(&generated.canonical)
            .and_then(|value| marshal_checked(schema, constraints, &value));
        match canonical {
            Ok(canonical) => {
                push_unique(&mut examples, Example { canonical, ..generated });
            }
            Err(err) => {
                tracing::debug!(
                    variable = name,
                    example = %generated.canonical,
                    error = %err,
                    "skipping schema example"
                );
            }
        }
    }

    if let Some(default) = default {
        match examples.iter_mut().find(|e| &e.canonical == default) {
            Some(existing) => {
                existing.source = ExampleSource::Default;
                if existing.description.is_empty() {
                    existing.description = "the default value".to_string();
                }
            }
            None => examples.insert(
                0,
                Example::new(default.clone(), "the default value", ExampleSource::Default),
            ),
        }
    }

    if examples.is_empty() {
        return Err(SpecError::NoExamples {
            name: name.to_string(),
        });
    }
    Ok(examples)
}

/// Total order used to rank examples, best first.
///
/// Normative before non-normative, then by source priority, then longer
/// descriptions first. Among non-normative schema examples shorter literals
/// win; otherwise longer literals win.
pub fn compare_examples(a: &Example, b: &Example) -> Ordering {
    b.normative
        .cmp(&a.normative)
        .then_with(|| b.source.cmp(&a.source))
        .then_with(|| b.description.len().cmp(&a.description.len()))
        .then_with(|| {
            let generated = !a.normative && a.source == ExampleSource::Schema;
            if generated {
                a.canonical.len().cmp(&b.canonical.len())
            } else {
                b.canonical.len().cmp(&a.canonical.len())
            }
        })
}

/// Picks the single example to show in documentation.
///
/// The example matching `default` wins outright. Otherwise the examples are
/// ranked with [`compare_examples`]; ties keep their original order.
///
/// # Examples
///
/// ```
/// use envspec_core::{Example, ExampleSource, best_example};
///
/// let examples = vec![
///     Example::new("1", "", ExampleSource::Schema),
///     Example::new("8080", "the usual port", ExampleSource::Builder),
/// ];
/// assert_eq!(best_example(&examples, None).unwrap().canonical.as_str(), "8080");
/// ```
pub fn best_example<'a>(examples: &'a [Example], default: Option<&Literal>) -> Option<&'a Example> {
    if let Some(default) = default {
        if let Some(example) = examples.iter().find(|e| &e.canonical == default) {
            return Some(example);
        }
    }

    let mut ranked: Vec<&Example> = examples.iter().collect();
    ranked.sort_by(|a, b| compare_examples(a, b));
    ranked.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{NumericSchema, SetSchema, StringSchema};

    fn supplied<T>(value: T, description: &str) -> SuppliedExample<T> {
        SuppliedExample {
            value,
            description: description.to_string(),
            normative: false,
        }
    }

    fn literals(examples: &[Example]) -> Vec<&str> {
        examples.iter().map(|e| e.canonical.as_str()).collect()
    }

    #[test]
    fn test_default_matching_builder_example_appears_once() {
        let schema = StringSchema::new();
        let default = Literal::new("x");
        let examples = build_examples(
            "NAME",
            &schema,
            &[],
            &[supplied("x".to_string(), "")],
            Some(&default),
        )
        .unwrap();

        assert_eq!(literals(&examples), vec!["x"]);
        assert_eq!(examples[0].source, ExampleSource::Default);
    }

    #[test]
    fn test_default_is_prepended() {
        let schema = NumericSchema::<u8>::new().with_min(1).with_max(9);
        let default = Literal::new("5");
        let examples =
            build_examples("N", &schema, &[], &[supplied(3, "three")], Some(&default)).unwrap();

        // Conservative schema examples still include the configured bounds.
        assert_eq!(literals(&examples), vec!["5", "3", "1", "9"]);
        assert_eq!(examples[0].source, ExampleSource::Default);
        assert_eq!(examples[1].source, ExampleSource::Builder);
        assert_eq!(examples[2].source, ExampleSource::Schema);
    }

    #[test]
    fn test_permissive_mode_without_supplied_examples() {
        let schema = NumericSchema::<u8>::new().with_min(0).with_max(100);
        let examples = build_examples("N", &schema, &[], &[], None).unwrap();
        assert_eq!(literals(&examples), vec!["0", "100", "45", "60"]);
    }

    #[test]
    fn test_duplicate_builder_examples_keep_first() {
        let schema = StringSchema::new();
        let examples = build_examples(
            "N",
            &schema,
            &[],
            &[supplied("a".to_string(), "first"), supplied("a".to_string(), "second")],
            None,
        )
        .unwrap();
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].description, "first");
    }

    #[test]
    fn test_invalid_builder_example_is_spec_error() {
        let schema = NumericSchema::<u8>::new().with_max(10);
        let err = build_examples("N", &schema, &[], &[supplied(1, ""), supplied(11, "")], None)
            .unwrap_err();
        assert!(matches!(err, SpecError::InvalidExample { index: 1, .. }));
    }

    #[test]
    fn test_schema_examples_failing_constraints_are_skipped() {
        let schema = NumericSchema::<u8>::new().with_min(0).with_max(100);
        let above_hundred = Constraint::new("above 100", |v: &u8| {
            if *v > 100 { Ok(()) } else { Err("too small".into()) }
        });
        let err = build_examples("N", &schema, &[above_hundred], &[], None).unwrap_err();
        assert_eq!(err, SpecError::NoExamples { name: "N".into() });

        let below_fifty = Constraint::new("below 50", |v: &u8| {
            if *v < 50 { Ok(()) } else { Err("too big".into()) }
        });
        let examples = build_examples("N", &schema, &[below_fifty], &[], None).unwrap();
        assert_eq!(literals(&examples), vec!["0", "45"]);
    }

    #[test]
    fn test_best_example_prefers_default() {
        let examples = vec![
            Example::new("a", "long description here", ExampleSource::Builder).normative(),
            Example::new("b", "", ExampleSource::Default),
        ];
        let best = best_example(&examples, Some(&Literal::new("b"))).unwrap();
        assert_eq!(best.canonical.as_str(), "b");
    }

    #[test]
    fn test_best_example_ranking() {
        let examples = vec![
            Example::new("schema-long", "", ExampleSource::Schema),
            Example::new("s", "", ExampleSource::Schema),
            Example::new("builder", "", ExampleSource::Builder),
        ];
        assert_eq!(best_example(&examples, None).unwrap().canonical.as_str(), "builder");

        let normative = vec![
            Example::new("builder", "described", ExampleSource::Builder),
            Example::new("member", "", ExampleSource::Schema).normative(),
        ];
        assert_eq!(best_example(&normative, None).unwrap().canonical.as_str(), "member");
    }

    #[test]
    fn test_best_example_literal_length_rules() {
        let generated = vec![
            Example::new("12345", "", ExampleSource::Schema),
            Example::new("7", "", ExampleSource::Schema),
        ];
        assert_eq!(best_example(&generated, None).unwrap().canonical.as_str(), "7");

        let supplied = vec![
            Example::new("7", "", ExampleSource::Builder),
            Example::new("12345", "", ExampleSource::Builder),
        ];
        assert_eq!(best_example(&supplied, None).unwrap().canonical.as_str(), "12345");

        let described = vec![
            Example::new("12345", "short", ExampleSource::Builder),
            Example::new("7", "a longer one", ExampleSource::Builder),
        ];
        assert_eq!(best_example(&described, None).unwrap().canonical.as_str(), "7");
    }

    #[test]
    fn test_best_example_ties_keep_order() {
        let examples = vec![
            Example::new("b", "", ExampleSource::Builder),
            Example::new("a", "", ExampleSource::Builder),
        ];
        assert_eq!(best_example(&examples, None).unwrap().canonical.as_str(), "b");
    }

    #[test]
    fn test_set_examples_with_default() {
        let schema = SetSchema::from_literals(["red", "green", "blue"]);
        let default = Literal::new("green");
        let examples = build_examples("C", &schema, &[], &[], Some(&default)).unwrap();
        assert_eq!(literals(&examples), vec!["red", "green", "blue"]);
        assert_eq!(examples[1].source, ExampleSource::Default);
        assert_eq!(best_example(&examples, Some(&default)).unwrap().canonical.as_str(), "green");
    }
}
