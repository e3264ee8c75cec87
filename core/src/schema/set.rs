//! Finite enumerations of accepted values.

use std::collections::HashSet;
use std::fmt;

use crate::error::{InvalidSchemaError, MarshalError, SchemaError, SetMembershipError};
use crate::example::{Example, ExampleSource};
use crate::literal::Literal;
use crate::schema::{Schema, SchemaInfo, SetInfo};

/// Schema that accepts exactly one of a fixed list of members.
///
/// Each member's literal is computed once, at construction. Members must
/// render to non-empty, unique literals and there must be at least two of
/// them; both rules are checked by [`finalize`](Schema::finalize).
///
/// # Examples
///
/// ```
/// use envspec_core::{Literal, Schema, SetSchema};
///
/// let level = SetSchema::from_literals(["debug", "info", "warn"]);
/// assert_eq!(level.unmarshal(&Literal::new("info")).unwrap(), "info");
///
/// let err = level.unmarshal(&Literal::new("trace")).unwrap_err();
/// assert_eq!(err.to_string(), "expected debug, info or warn");
/// ```
#[derive(Clone)]
pub struct SetSchema<T> {
    members: Vec<(T, Literal)>,
}

impl<T> SetSchema<T>
where
    T: Clone + PartialEq + Send + Sync,
{
    /// Creates a set from native members and a function that renders each
    /// member as its literal.
    pub fn new<I, F>(members: I, to_literal: F) -> Self
    where
        I: IntoIterator<Item = T>,
        F: Fn(&T) -> String,
    {
        let members = members
            .into_iter()
            .map(|m| {
                let literal = Literal::new(to_literal(&m));
                (m, literal)
            })
            .collect();
        Self { members }
    }

    /// Members in declaration order.
    pub fn members(&self) -> impl Iterator<Item = &T> {
        self.members.iter().map(|(m, _)| m)
    }

    /// Literal forms of the members, in declaration order.
    pub fn literals(&self) -> impl Iterator<Item = &Literal> {
        self.members.iter().map(|(_, l)| l)
    }

    fn info(&self) -> SetInfo {
        SetInfo {
            members: self.literals().cloned().collect(),
        }
    }

    fn membership_error(&self) -> MarshalError {
        SchemaError::from(SetMembershipError {
            schema: self.info(),
        })
        .into()
    }
}

impl SetSchema<String> {
    /// Creates a set of strings, each member being its own literal.
    pub fn from_literals<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(members.into_iter().map(Into::into), String::clone)
    }
}

impl SetSchema<bool> {
    /// Creates a boolean set with the given literals for `true` and `false`.
    ///
    /// # Examples
    ///
    /// ```
    /// use envspec_core::{Literal, Schema, SetSchema};
    ///
    /// let flag = SetSchema::boolean("yes", "no");
    /// assert!(flag.unmarshal(&Literal::new("yes")).unwrap());
    /// assert_eq!(flag.marshal(&false).unwrap().as_str(), "no");
    /// ```
    pub fn boolean(true_literal: impl Into<String>, false_literal: impl Into<String>) -> Self {
        let (t, f) = (true_literal.into(), false_literal.into());
        Self::new([true, false], move |v| if *v { t.clone() } else { f.clone() })
    }
}

impl<T> fmt::Debug for SetSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetSchema")
            .field("members", &self.members.iter().map(|(_, l)| l).collect::<Vec<_>>())
            .finish()
    }
}

impl<T> Schema<T> for SetSchema<T>
where
    T: Clone + PartialEq + Send + Sync,
{
    fn describe(&self) -> SchemaInfo {
        SchemaInfo::Set(self.info())
    }

    fn finalize(&self) -> Result<(), InvalidSchemaError> {
        if self.members.len() < 2 {
            return Err(InvalidSchemaError::new(
                "set must contain at least two members",
            ));
        }

        let mut seen = HashSet::new();
        for (index, (_, literal)) in self.members.iter().enumerate() {
            if literal.is_empty() {
                return Err(InvalidSchemaError::new(format!(
                    "set member #{index} has an empty literal"
                )));
            }
            if !seen.insert(literal) {
                return Err(InvalidSchemaError::new(format!(
                    "set members must be unique, {} appears more than once",
                    literal.quote()
                )));
            }
        }
        Ok(())
    }

    fn marshal(&self, value: &T) -> Result<Literal, MarshalError> {
        self.members
            .iter()
            .find(|(m, _)| m == value)
            .map(|(_, literal)| literal.clone())
            .ok_or_else(|| self.membership_error())
    }

    fn unmarshal(&self, literal: &Literal) -> Result<T, MarshalError> {
        self.members
            .iter()
            .find(|(_, l)| l == literal)
            .map(|(m, _)| m.clone())
            .ok_or_else(|| self.membership_error())
    }

    fn examples(&self, _conservative: bool) -> Vec<Example> {
        // Members are exhaustive, so they are always worth listing.
        self.literals()
            .map(|literal| Example::new(literal.clone(), "", ExampleSource::Schema).normative())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters(n: usize) -> SetSchema<String> {
        SetSchema::from_literals(('a'..='z').take(n).map(String::from))
    }

    #[test]
    fn test_arity_messages() {
        let z = Literal::new("z");
        assert_eq!(
            letters(2).unmarshal(&z).unwrap_err().to_string(),
            "expected either a or b"
        );
        assert_eq!(
            letters(3).unmarshal(&z).unwrap_err().to_string(),
            "expected a, b or c"
        );
        assert_eq!(
            letters(4).unmarshal(&z).unwrap_err().to_string(),
            "expected a, b, c or d"
        );
        assert_eq!(
            letters(6).unmarshal(&z).unwrap_err().to_string(),
            "expected a, b ... f, or one of 3 other values"
        );
    }

    #[test]
    fn test_marshal_rejects_non_members() {
        let schema = letters(3);
        assert_eq!(schema.marshal(&"b".to_string()).unwrap().as_str(), "b");
        assert!(matches!(
            schema.marshal(&"q".to_string()),
            Err(MarshalError::Schema(SchemaError::SetMembership(_)))
        ));
    }

    #[test]
    fn test_custom_literals() {
        #[derive(Debug, Clone, Copy, PartialEq)]
        enum Mode {
            Fast,
            Safe,
        }

        let schema = SetSchema::new([Mode::Fast, Mode::Safe], |m| format!("{m:?}").to_lowercase());
        assert!(schema.finalize().is_ok());
        assert_eq!(schema.marshal(&Mode::Safe).unwrap().as_str(), "safe");
        assert_eq!(schema.unmarshal(&Literal::new("fast")).unwrap(), Mode::Fast);
        assert!(schema.unmarshal(&Literal::new("Fast")).is_err());
    }

    #[test]
    fn test_finalize_rejects_bad_sets() {
        assert!(letters(1).finalize().is_err());
        assert!(SetSchema::from_literals(["a", "a"]).finalize().is_err());
        assert!(SetSchema::from_literals(["a", ""]).finalize().is_err());
        assert!(SetSchema::boolean("on", "on").finalize().is_err());
        assert!(SetSchema::boolean("true", "false").finalize().is_ok());
    }

    #[test]
    fn test_examples_list_every_member() {
        let schema = letters(3);
        let examples = schema.examples(true);
        assert_eq!(examples.len(), 3);
        assert!(examples.iter().all(|e| e.normative && e.source == ExampleSource::Schema));
    }
}
