//! Variables: specifications bound to an environment.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::{Arc, OnceLock};

use envspec_core::{AnySpec, Literal, Spec, ValueError};

/// A resolved value.
#[derive(Debug, Clone, PartialEq)]
pub struct Value<T> {
    pub native: T,
    /// The literal as read from the environment. For a default value this is
    /// the default's canonical literal.
    pub verbatim: Literal,
    pub canonical: Literal,
    /// Whether the value came from the spec's default.
    pub is_default: bool,
}

#[derive(Debug)]
enum Resolution<T> {
    Resolved(Option<Value<T>>),
    Failed(ValueError),
}

/// A [`Spec`] bound to an [`Environment`](crate::Environment).
///
/// The environment is read the first time the value is needed; the outcome,
/// including an error, is kept for the lifetime of the variable.
/// Concurrent first accesses block until a single resolution finishes.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use envspec_core::{NumericSchema, SpecBuilder};
/// use envspec_registry::{MemoryEnvironment, Variable};
///
/// let spec = SpecBuilder::<u16>::new("PORT", "listen port")
///     .default_value(8080)
///     .done(NumericSchema::new());
/// let env = Arc::new(MemoryEnvironment::from_iter([("PORT", "0443")]));
///
/// let port = Variable::new(Arc::new(spec), env);
/// let value = port.resolve().unwrap().unwrap();
/// assert_eq!(value.native, 443);
/// assert_eq!(value.verbatim.as_str(), "0443");
/// assert_eq!(value.canonical.as_str(), "443");
/// ```
pub struct Variable<T> {
    spec: Arc<Spec<T>>,
    env: Arc<dyn crate::Environment>,
    resolution: OnceLock<Resolution<T>>,
}

impl<T> Variable<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    pub fn new(spec: Arc<Spec<T>>, env: Arc<dyn crate::Environment>) -> Self {
        Self {
            spec,
            env,
            resolution: OnceLock::new(),
        }
    }

    pub fn spec(&self) -> &Arc<Spec<T>> {
        &self.spec
    }

    /// Resolves the variable on first call and returns the cached outcome.
    ///
    /// `Ok(None)` means the variable is unset and has no default.
    ///
    /// # Panics
    ///
    /// Panics if the schema cannot marshal a value it has just unmarshaled
    /// and validated, which is a defect in the schema.
    pub fn resolve(&self) -> Result<Option<&Value<T>>, &ValueError> {
        match self.resolution.get_or_init(|| self.compute()) {
            Resolution::Resolved(value) => Ok(value.as_ref()),
            Resolution::Failed(err) => Err(err),
        }
    }

    /// The native value, if any.
    pub fn value(&self) -> Result<Option<T>, ValueError> {
        self.resolve()
            .map(|v| v.map(|v| v.native.clone()))
            .map_err(ValueError::clone)
    }

    pub fn error(&self) -> Option<&ValueError> {
        self.resolve().err()
    }

    /// Whether the variable resolved to an acceptable state.
    ///
    /// A required variable with no value and no default is invalid even
    /// though resolving it raised no error.
    pub fn is_valid(&self) -> bool {
        match self.resolve() {
            Ok(Some(_)) => true,
            Ok(None) => !self.spec.is_required(),
            Err(_) => false,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution.get().is_some()
    }

    fn compute(&self) -> Resolution<T> {
        let name = self.spec.name();
        let verbatim = Literal::new(self.env.get(name));

        if verbatim.is_empty() {
            let value = self.spec.default_value().map(|d| Value {
                native: d.value.clone(),
                verbatim: d.literal.clone(),
                canonical: d.literal.clone(),
                is_default: true,
            });
            tracing::debug!(variable = name, is_default = value.is_some(), "resolved variable");
            return Resolution::Resolved(value);
        }

        let native = match self.spec.unmarshal(&verbatim) {
            Ok(native) => native,
            Err(cause) => {
                let err = ValueError::new(name, verbatim, self.spec.is_sensitive(), cause);
                tracing::warn!(variable = name, error = %err, "invalid value");
                return Resolution::Failed(err);
            }
        };

        let canonical = match self.spec.schema().marshal(&native) {
            Ok(canonical) => canonical,
            Err(err) => panic!("schema for {name} failed to marshal a value it accepted: {err}"),
        };

        tracing::debug!(variable = name, is_default = false, "resolved variable");
        Resolution::Resolved(Some(Value {
            native,
            verbatim,
            canonical,
            is_default: false,
        }))
    }
}

impl<T: fmt::Debug> fmt::Debug for Variable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("spec", &self.spec)
            .field("resolution", &self.resolution.get())
            .finish_non_exhaustive()
    }
}

/// Type-erased view of a [`Variable`], as stored by the
/// [`Registry`](crate::Registry).
pub trait AnyVariable: Send + Sync {
    fn spec(&self) -> &dyn AnySpec;

    /// Name of the native type, for diagnostics.
    fn type_name(&self) -> &'static str;

    /// Resolves the variable and returns the canonical literal.
    fn canonical(&self) -> Result<Option<&Literal>, &ValueError>;

    /// Resolves the variable and reports whether the value is the default.
    fn is_default(&self) -> bool;

    fn is_valid(&self) -> bool;

    fn is_resolved(&self) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    fn name(&self) -> &str {
        self.spec().name()
    }

    fn error(&self) -> Option<&ValueError> {
        self.canonical().err()
    }
}

impl<T> AnyVariable for Variable<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn spec(&self) -> &dyn AnySpec {
        self.spec.as_ref()
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn canonical(&self) -> Result<Option<&Literal>, &ValueError> {
        self.resolve().map(|v| v.map(|v| &v.canonical))
    }

    fn is_default(&self) -> bool {
        matches!(self.resolve(), Ok(Some(v)) if v.is_default)
    }

    fn is_valid(&self) -> bool {
        Variable::is_valid(self)
    }

    fn is_resolved(&self) -> bool {
        Variable::is_resolved(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{Environment, MemoryEnvironment};
    use envspec_core::{
        Constraint, NumericSchema, OtherSchema, SetSchema, SpecBuilder, StringSchema,
    };

    fn bind<T>(spec: Spec<T>, vars: &[(&str, &str)]) -> Variable<T>
    where
        T: Clone + fmt::Debug + Send + Sync + 'static,
    {
        let env = MemoryEnvironment::from_iter(vars.iter().copied());
        Variable::new(Arc::new(spec), Arc::new(env))
    }

    fn port() -> Spec<u16> {
        SpecBuilder::new("PORT", "listen port")
            .default_value(8080)
            .done(NumericSchema::new().with_min(1))
    }

    #[test]
    fn test_unset_uses_default() {
        let var = bind(port(), &[]);
        assert!(!var.is_resolved());
        let value = var.resolve().unwrap().unwrap();
        assert_eq!(value.native, 8080);
        assert!(value.is_default);
        assert!(var.is_resolved());
        assert!(AnyVariable::is_default(&var));
    }

    #[test]
    fn test_empty_literal_counts_as_unset() {
        let var = bind(port(), &[("PORT", "")]);
        assert_eq!(var.value().unwrap(), Some(8080));
    }

    #[test]
    fn test_unset_without_default() {
        let spec = SpecBuilder::<String>::new("NAME", "a name")
            .example("x".to_string(), "")
            .done(StringSchema::new());
        let var = bind(spec, &[]);
        assert_eq!(var.value().unwrap(), None);
        assert!(var.is_valid());
    }

    #[test]
    fn test_schema_error_keeps_literal() {
        let var = bind(port(), &[("PORT", "0")]);
        let err = var.error().unwrap();
        assert_eq!(err.literal.as_str(), "0");
        assert_eq!(err.to_string(), "value of PORT (0) is invalid: too low, expected 1 or greater");
        assert!(err.cause.schema_error().is_some());
        assert!(!var.is_valid());
    }

    #[test]
    #[should_panic(expected = "failed to marshal a value it accepted")]
    fn test_unmarshalable_native_value_is_fatal() {
        let schema = OtherSchema::<u32>::new(
            |v: &u32| if *v == 7 { Err("nope".into()) } else { Ok(v.to_string()) },
            |s: &str| s.parse::<u32>().map_err(|e| e.to_string()),
        );
        let spec = SpecBuilder::new("N", "a number").example(1, "").done(schema);
        let var = bind(spec, &[("N", "7")]);
        let _ = var.value();
    }

    #[test]
    fn test_constraint_error() {
        let spec = SpecBuilder::<String>::new("MODE", "mode")
            .constraint(Constraint::new("not fast", |v: &String| {
                if v == "fast" { Err("fast mode is disabled".into()) } else { Ok(()) }
            }))
            .done(SetSchema::from_literals(["fast", "safe"]));
        let var = bind(spec, &[("MODE", "fast")]);
        assert_eq!(
            var.error().unwrap().to_string(),
            "value of MODE (fast) is invalid: fast mode is disabled"
        );
    }

    #[test]
    fn test_sensitive_error_omits_literal() {
        let spec = SpecBuilder::<u16>::new("PIN", "pin code")
            .sensitive()
            .example(1234, "")
            .done(NumericSchema::new());
        let var = bind(spec, &[("PIN", "hunter2")]);
        let message = var.error().unwrap().to_string();
        assert!(message.starts_with("value of PIN is invalid: "));
        assert!(!message.contains("hunter2"));
    }

    #[test]
    fn test_outcome_is_cached() {
        let env = Arc::new(MemoryEnvironment::from_iter([("PORT", "1")]));
        let var = Variable::new(Arc::new(port()), env.clone());
        assert_eq!(var.value().unwrap(), Some(1));

        env.set("PORT", "2");
        assert_eq!(var.value().unwrap(), Some(1));
    }

    #[test]
    fn test_downcast() {
        let var: Arc<dyn AnyVariable> = Arc::new(bind(port(), &[]));
        assert_eq!(var.name(), "PORT");
        assert_eq!(var.type_name(), "u16");
        assert!(var.as_any().downcast_ref::<Variable<u16>>().is_some());
        assert!(var.clone().into_any().downcast::<Variable<u8>>().is_err());
        assert!(var.into_any().downcast::<Variable<u16>>().is_ok());
    }
}
