//! Numeric schemas over every primitive integer and float width.

use std::fmt;
use std::marker::PhantomData;

use crate::error::{InvalidSchemaError, MarshalError, MaxError, MinError, SchemaError};
use crate::example::{Example, ExampleSource};
use crate::literal::Literal;
use crate::schema::{NumericInfo, Schema, SchemaInfo};

/// A native numeric type usable with [`NumericSchema`].
///
/// Implemented for `i8`..`i64`, `u8`..`u64`, `f32` and `f64`. The associated
/// constants form the natural-limit table used when a schema has no
/// configured bound.
pub trait Number: Copy + PartialOrd + fmt::Debug + Send + Sync + 'static {
    /// Smallest representable value (most negative for floats).
    const NATURAL_MIN: Self;
    /// Largest representable value.
    const NATURAL_MAX: Self;
    /// Name of the native type.
    const TYPE_NAME: &'static str;

    fn to_f64(self) -> f64;

    /// Converts back from `f64`, rounding integers to nearest and
    /// saturating at the natural limits.
    fn from_f64(value: f64) -> Self;

    /// Canonical literal form.
    fn format(self) -> String;

    /// Parses a literal.
    fn parse(literal: &str) -> Result<Self, String>;
}

macro_rules! impl_integer {
    ($($t:ty),* $(,)?) => {
        $(
            impl Number for $t {
                const NATURAL_MIN: Self = <$t>::MIN;
                const NATURAL_MAX: Self = <$t>::MAX;
                const TYPE_NAME: &'static str = stringify!($t);

                fn to_f64(self) -> f64 {
                    self as f64
                }

                fn from_f64(value: f64) -> Self {
                    value.round() as $t
                }

                fn format(self) -> String {
                    self.to_string()
                }

                fn parse(literal: &str) -> Result<Self, String> {
                    literal
                        .parse::<$t>()
                        .map_err(|e| format!("expected an integer: {e}"))
                }
            }
        )*
    };
}

macro_rules! impl_float {
    ($($t:ty),* $(,)?) => {
        $(
            impl Number for $t {
                const NATURAL_MIN: Self = <$t>::MIN;
                const NATURAL_MAX: Self = <$t>::MAX;
                const TYPE_NAME: &'static str = stringify!($t);

                fn to_f64(self) -> f64 {
                    self as f64
                }

                fn from_f64(value: f64) -> Self {
                    value as $t
                }

                fn format(self) -> String {
                    self.to_string()
                }

                fn parse(literal: &str) -> Result<Self, String> {
                    let value = literal
                        .parse::<$t>()
                        .map_err(|e| format!("expected a number: {e}"))?;
                    if !value.is_finite() {
                        return Err("expected a finite number".to_string());
                    }
                    Ok(value)
                }
            }
        )*
    };
}

impl_integer!(i8, i16, i32, i64, u8, u16, u32, u64);
impl_float!(f32, f64);

/// Returns the natural `(min, max)` of `T`.
///
/// # Examples
///
/// ```
/// use envspec_core::natural_limits;
///
/// assert_eq!(natural_limits::<i8>(), (-128, 127));
/// assert_eq!(natural_limits::<u16>(), (0, 65535));
/// ```
pub fn natural_limits<T: Number>() -> (T, T) {
    (T::NATURAL_MIN, T::NATURAL_MAX)
}

/// Ratios of the effective span used to synthesize intermediate examples.
const EXAMPLE_RATIOS: [f64; 2] = [0.45, 0.60];

/// Schema for integers and floats with optional inclusive bounds.
///
/// # Examples
///
/// ```
/// use envspec_core::{Literal, NumericSchema, Schema};
///
/// let port = NumericSchema::<u16>::new().with_min(1);
/// assert_eq!(port.unmarshal(&Literal::new("8080")).unwrap(), 8080);
/// assert!(port.unmarshal(&Literal::new("0")).is_err());
/// assert!(port.unmarshal(&Literal::new("70000")).is_err());
/// assert_eq!(port.limits(), (1, 65535));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct NumericSchema<T: Number> {
    min: Option<T>,
    max: Option<T>,
    _native: PhantomData<T>,
}

impl<T: Number> NumericSchema<T> {
    /// Creates an unbounded schema.
    pub fn new() -> Self {
        Self {
            min: None,
            max: None,
            _native: PhantomData,
        }
    }

    /// Sets the inclusive minimum.
    pub fn with_min(mut self, min: T) -> Self {
        self.min = Some(min);
        self
    }

    /// Sets the inclusive maximum.
    pub fn with_max(mut self, max: T) -> Self {
        self.max = Some(max);
        self
    }

    /// Configured minimum.
    pub fn min(&self) -> Option<T> {
        self.min
    }

    /// Configured maximum.
    pub fn max(&self) -> Option<T> {
        self.max
    }

    /// Effective bounds: each configured bound, or the natural limit of `T`
    /// where none is configured.
    pub fn limits(&self) -> (T, T) {
        (
            self.min.unwrap_or(T::NATURAL_MIN),
            self.max.unwrap_or(T::NATURAL_MAX),
        )
    }

    fn validate(&self, value: T) -> Result<(), MarshalError> {
        if let Some(min) = self.min {
            if value < min {
                return Err(SchemaError::from(MinError {
                    schema: self.info(),
                })
                .into());
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return Err(SchemaError::from(MaxError {
                    schema: self.info(),
                })
                .into());
            }
        }
        Ok(())
    }

    fn info(&self) -> NumericInfo {
        let (limit_min, limit_max) = self.limits();
        NumericInfo {
            type_name: T::TYPE_NAME,
            min: self.min.map(|v| Literal::new(v.format())),
            max: self.max.map(|v| Literal::new(v.format())),
            limit_min: Literal::new(limit_min.format()),
            limit_max: Literal::new(limit_max.format()),
        }
    }
}

impl<T: Number> Default for NumericSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn round_trips<T: Number>(value: T) -> bool {
    matches!(T::parse(&value.format()), Ok(parsed) if parsed == value)
}

impl<T: Number> Schema<T> for NumericSchema<T> {
    fn describe(&self) -> SchemaInfo {
        SchemaInfo::Numeric(self.info())
    }

    fn finalize(&self) -> Result<(), InvalidSchemaError> {
        if let Some(min) = self.min {
            if !round_trips(min) {
                return Err(InvalidSchemaError::new(format!(
                    "minimum value ({min:?}) cannot be represented as {}",
                    T::TYPE_NAME
                )));
            }
        }
        if let Some(max) = self.max {
            if !round_trips(max) {
                return Err(InvalidSchemaError::new(format!(
                    "maximum value ({max:?}) cannot be represented as {}",
                    T::TYPE_NAME
                )));
            }
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(InvalidSchemaError::new(format!(
                    "minimum value ({}) is greater than maximum value ({})",
                    min.format(),
                    max.format()
                )));
            }
        }
        Ok(())
    }

    fn marshal(&self, value: &T) -> Result<Literal, MarshalError> {
        let literal = value.format();
        // Non-finite floats format fine but never parse back.
        T::parse(&literal).map_err(MarshalError::Malformed)?;
        self.validate(*value)?;
        Ok(Literal::new(literal))
    }

    fn unmarshal(&self, literal: &Literal) -> Result<T, MarshalError> {
        let value = T::parse(literal.as_str()).map_err(MarshalError::Malformed)?;
        self.validate(value)?;
        Ok(value)
    }

    fn examples(&self, conservative: bool) -> Vec<Example> {
        let mut examples = Vec::new();

        if let Some(min) = self.min {
            examples.push(Example::new(
                min.format(),
                "the minimum accepted value",
                ExampleSource::Schema,
            ));
        }
        if let Some(max) = self.max {
            examples.push(Example::new(
                max.format(),
                "the maximum accepted value",
                ExampleSource::Schema,
            ));
        }
        if conservative {
            return examples;
        }

        let (lo, hi) = self.limits();
        let (lo, hi) = (lo.to_f64(), hi.to_f64());
        for ratio in EXAMPLE_RATIOS {
            // Weighted sum rather than lo + (hi - lo) * ratio, which overflows
            // to infinity across the full f64 range.
            let value = T::from_f64(lo * (1.0 - ratio) + hi * ratio);
            examples.push(Example::new(value.format(), "", ExampleSource::Schema));
        }

        examples
    }
}
