//! Free-form string schema.

use crate::error::{InvalidSchemaError, MarshalError};
use crate::example::{Example, ExampleSource};
use crate::literal::Literal;
use crate::schema::{LengthInfo, Schema, SchemaInfo, check_length, finalize_length};

/// ASCII text cycled through to build generated examples of the right length.
const EXAMPLE_TEXT: &str = "hello_world";

/// Schema for arbitrary strings, optionally bounded in length.
///
/// Lengths are measured in bytes of the literal. The native value and the
/// literal are the same string.
///
/// # Examples
///
/// ```
/// use envspec_core::{Literal, Schema, StringSchema};
///
/// let code = StringSchema::new().with_min_length(3).with_max_length(3);
/// assert!(code.unmarshal(&Literal::new("abc")).is_ok());
///
/// let err = code.unmarshal(&Literal::new("ab")).unwrap_err();
/// assert_eq!(err.to_string(), "too short, expected length to be exactly 3 bytes");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    length: LengthInfo,
}

impl StringSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum length in bytes.
    pub fn with_min_length(mut self, min: usize) -> Self {
        self.length.min = Some(min);
        self
    }

    /// Sets the maximum length in bytes.
    pub fn with_max_length(mut self, max: usize) -> Self {
        self.length.max = Some(max);
        self
    }

    pub fn min_length(&self) -> Option<usize> {
        self.length.min
    }

    pub fn max_length(&self) -> Option<usize> {
        self.length.max
    }

    fn generated_example(&self) -> Option<String> {
        let mut size = EXAMPLE_TEXT.len().max(self.length.min.unwrap_or(0));
        if let Some(max) = self.length.max {
            size = size.min(max);
        }
        if size == 0 {
            return None;
        }
        Some(EXAMPLE_TEXT.chars().cycle().take(size).collect())
    }
}

impl Schema<String> for StringSchema {
    fn describe(&self) -> SchemaInfo {
        SchemaInfo::String(self.length.clone())
    }

    fn finalize(&self) -> Result<(), InvalidSchemaError> {
        finalize_length(&self.length)
    }

    fn marshal(&self, value: &String) -> Result<Literal, MarshalError> {
        check_length(&self.length, value.len())?;
        Ok(Literal::new(value.as_str()))
    }

    fn unmarshal(&self, literal: &Literal) -> Result<String, MarshalError> {
        check_length(&self.length, literal.len())?;
        Ok(literal.as_str().to_string())
    }

    fn examples(&self, conservative: bool) -> Vec<Example> {
        if conservative {
            return Vec::new();
        }
        self.generated_example()
            .map(|text| Example::new(text, "", ExampleSource::Schema))
            .into_iter()
            .collect()
    }
}
