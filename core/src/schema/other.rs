//! Catch-all schema backed by caller-supplied conversions.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{InvalidSchemaError, MarshalError};
use crate::example::Example;
use crate::literal::Literal;
use crate::schema::{OtherInfo, Schema, SchemaInfo};

type MarshalFn<T> = Arc<dyn Fn(&T) -> Result<String, String> + Send + Sync>;
type UnmarshalFn<T> = Arc<dyn Fn(&str) -> Result<T, String> + Send + Sync>;

/// Schema for values with no structure beyond what their conversion
/// functions enforce.
///
/// Contributes no examples, so specifications using it need an explicit
/// example or a default.
///
/// # Examples
///
/// ```
/// use std::net::IpAddr;
/// use envspec_core::{Literal, OtherSchema, Schema};
///
/// let addr = OtherSchema::<IpAddr>::via_from_str();
/// assert!(addr.unmarshal(&Literal::new("127.0.0.1")).is_ok());
/// assert!(addr.unmarshal(&Literal::new("localhost")).is_err());
/// ```
pub struct OtherSchema<T> {
    type_name: &'static str,
    marshal: MarshalFn<T>,
    unmarshal: UnmarshalFn<T>,
}

impl<T: 'static> OtherSchema<T> {
    /// Creates a schema from a pair of conversion functions.
    pub fn new<M, U>(marshal: M, unmarshal: U) -> Self
    where
        M: Fn(&T) -> Result<String, String> + Send + Sync + 'static,
        U: Fn(&str) -> Result<T, String> + Send + Sync + 'static,
    {
        Self {
            type_name: std::any::type_name::<T>(),
            marshal: Arc::new(marshal),
            unmarshal: Arc::new(unmarshal),
        }
    }
}

impl<T> OtherSchema<T>
where
    T: FromStr + fmt::Display + 'static,
    T::Err: fmt::Display,
{
    /// Creates a schema that converts through [`FromStr`] and
    /// [`Display`](fmt::Display).
    pub fn via_from_str() -> Self {
        Self::new(
            |v: &T| Ok(v.to_string()),
            |s: &str| s.parse::<T>().map_err(|e| e.to_string()),
        )
    }
}

impl<T> Clone for OtherSchema<T> {
    fn clone(&self) -> Self {
        Self {
            type_name: self.type_name,
            marshal: Arc::clone(&self.marshal),
            unmarshal: Arc::clone(&self.unmarshal),
        }
    }
}

impl<T> fmt::Debug for OtherSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtherSchema")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

impl<T> Schema<T> for OtherSchema<T> {
    fn describe(&self) -> SchemaInfo {
        SchemaInfo::Other(OtherInfo {
            type_name: self.type_name,
        })
    }

    fn finalize(&self) -> Result<(), InvalidSchemaError> {
        Ok(())
    }

    fn marshal(&self, value: &T) -> Result<Literal, MarshalError> {
        (self.marshal)(value)
            .map(Literal::new)
            .map_err(MarshalError::Malformed)
    }

    fn unmarshal(&self, literal: &Literal) -> Result<T, MarshalError> {
        (self.unmarshal)(literal.as_str()).map_err(MarshalError::Malformed)
    }

    fn examples(&self, _conservative: bool) -> Vec<Example> {
        Vec::new()
    }
}
