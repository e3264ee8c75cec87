//! Serializable descriptions of registered variables.

use serde::Serialize;

use envspec_core::{ConstraintInfo, Documentation, Example, Literal, Relationship, SchemaInfo};

use crate::variable::AnyVariable;

/// Placeholder shown instead of the value of a sensitive variable.
pub const REDACTED: &str = "<redacted>";

/// Resolution outcome of a variable, as shown in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Status {
    /// Set in the environment to an accepted value.
    Set { value: Literal },
    /// Unset, so the default applies.
    Default { value: Literal },
    /// Unset with no default, and not required.
    Unset,
    /// Required, unset and without a default.
    Missing,
    /// Set to a value the variable rejects.
    Invalid { error: String },
}

/// Everything known about one registered variable.
///
/// Values of sensitive variables, including their default, are replaced by
/// [`REDACTED`].
#[derive(Debug, Clone, Serialize)]
pub struct VariableReport {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub type_name: &'static str,
    pub schema: SchemaInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Literal>,
    pub required: bool,
    pub sensitive: bool,
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<ConstraintInfo>,
    pub examples: Vec<Example>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_example: Option<Example>,
    #[serde(skip_serializing_if = "Documentation::is_empty")]
    pub documentation: Documentation,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
    pub status: Status,
}

impl VariableReport {
    /// Describes `variable`, resolving it if needed.
    pub fn new(variable: &dyn AnyVariable) -> Self {
        let spec = variable.spec();
        let sensitive = spec.is_sensitive();
        let shown = |literal: &Literal| {
            if sensitive {
                Literal::new(REDACTED)
            } else {
                literal.clone()
            }
        };

        let status = match variable.canonical() {
            Ok(Some(value)) if variable.is_default() => Status::Default { value: shown(value) },
            Ok(Some(value)) => Status::Set { value: shown(value) },
            Ok(None) if spec.is_required() => Status::Missing,
            Ok(None) => Status::Unset,
            Err(err) => Status::Invalid {
                error: err.to_string(),
            },
        };

        Self {
            name: spec.name().to_string(),
            description: spec.description().to_string(),
            type_name: variable.type_name(),
            schema: spec.schema_info(),
            default: spec.default_literal().map(shown),
            required: spec.is_required(),
            sensitive,
            deprecated: spec.is_deprecated(),
            constraints: spec.constraint_info(),
            examples: spec.examples().to_vec(),
            best_example: spec.best_example().cloned(),
            documentation: spec.documentation().clone(),
            relationships: spec.relationships(),
            status,
        }
    }

    /// Whether the status counts as a problem.
    pub fn is_problem(&self) -> bool {
        matches!(self.status, Status::Missing | Status::Invalid { .. })
    }
}
