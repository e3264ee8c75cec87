//! Registry of variables keyed by name.
//!
//! A [`Registry`] owns one [`Variable`] per registered [`Spec`], all bound
//! to the same [`Environment`]. Registries are plain values: create one per
//! application, or one per test for isolation.
//!
//! ```
//! use std::sync::Arc;
//! use envspec_core::{NumericSchema, SetSchema, SpecBuilder};
//! use envspec_registry::{MemoryEnvironment, Registry};
//!
//! let env = Arc::new(MemoryEnvironment::from_iter([("WORKERS", "8")]));
//! let registry = Registry::new(env);
//!
//! let workers = registry
//!     .register(
//!         SpecBuilder::<u8>::new("WORKERS", "worker threads")
//!             .default_value(4)
//!             .done(NumericSchema::new().with_min(1)),
//!     )
//!     .unwrap();
//! registry
//!     .register(
//!         SpecBuilder::<String>::new("LOG_LEVEL", "log level")
//!             .required()
//!             .done(SetSchema::from_literals(["debug", "info"])),
//!     )
//!     .unwrap();
//!
//! assert_eq!(workers.value().unwrap(), Some(8));
//!
//! let problems = registry.validate();
//! assert_eq!(problems.len(), 1);
//! assert_eq!(problems[0].to_string(), "LOG_LEVEL is required but not set");
//! ```

use std::any::type_name;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use envspec_core::{Relationship, RelationshipKind, Spec, add_relationship};

use crate::environment::{Environment, OsEnvironment};
use crate::error::{RegistryError, Result, ValidationError};
use crate::report::VariableReport;
use crate::variable::{AnyVariable, Variable};

type VariableMap = HashMap<String, Arc<dyn AnyVariable>>;

/// Thread-safe mapping from variable name to [`Variable`].
///
/// Iteration order is unspecified; [`report`](Self::report) and
/// [`validate`](Self::validate) sort by name.
pub struct Registry {
    env: Arc<dyn Environment>,
    variables: RwLock<VariableMap>,
}

impl Registry {
    /// Creates an empty registry whose variables read from `env`.
    pub fn new(env: Arc<dyn Environment>) -> Self {
        Self {
            env,
            variables: RwLock::new(HashMap::new()),
        }
    }

    /// Creates an empty registry bound to the process environment.
    pub fn with_os_environment() -> Self {
        Self::new(Arc::new(OsEnvironment))
    }

    pub fn environment(&self) -> &Arc<dyn Environment> {
        &self.env
    }

    fn read(&self) -> RwLockReadGuard<'_, VariableMap> {
        // Every write replaces whole entries, so a poisoned map is still
        // consistent.
        self.variables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, VariableMap> {
        self.variables.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Binds `spec` to the registry's environment.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyRegistered`] if a variable with the
    /// same name exists.
    pub fn register<T>(&self, spec: Spec<T>) -> Result<Arc<Variable<T>>>
    where
        T: Clone + fmt::Debug + Send + Sync + 'static,
    {
        self.register_shared(Arc::new(spec))
    }

    /// Like [`register`](Self::register), for a spec that is also used
    /// elsewhere.
    pub fn register_shared<T>(&self, spec: Arc<Spec<T>>) -> Result<Arc<Variable<T>>>
    where
        T: Clone + fmt::Debug + Send + Sync + 'static,
    {
        let variable = Arc::new(Variable::new(spec, Arc::clone(&self.env)));
        let name = variable.name().to_string();

        let mut variables = self.write();
        if variables.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        variables.insert(name.clone(), variable.clone());
        drop(variables);

        tracing::debug!(variable = %name, "registered variable");
        Ok(variable)
    }

    /// Removes the variable called `name` and returns it.
    pub fn unregister(&self, name: &str) -> Result<Arc<dyn AnyVariable>> {
        let removed = self.write().remove(name);
        match removed {
            Some(variable) => {
                tracing::debug!(variable = name, "unregistered variable");
                Ok(variable)
            }
            None => Err(RegistryError::NotRegistered(name.to_string())),
        }
    }

    /// Removes every variable.
    ///
    /// Variables handed out earlier keep their cached values; registering
    /// the same specs again produces fresh, unresolved variables.
    pub fn reset(&self) {
        let removed = std::mem::take(&mut *self.write());
        tracing::debug!(count = removed.len(), "reset registry");
    }

    /// Looks up a variable by name and native type.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotRegistered`] for an unknown name and
    /// [`RegistryError::TypeMismatch`] if the variable holds another type.
    pub fn get<T>(&self, name: &str) -> Result<Arc<Variable<T>>>
    where
        T: Clone + fmt::Debug + Send + Sync + 'static,
    {
        let variable = self
            .get_any(name)
            .ok_or_else(|| RegistryError::NotRegistered(name.to_string()))?;
        variable
            .into_any()
            .downcast::<Variable<T>>()
            .map_err(|_| RegistryError::TypeMismatch {
                name: name.to_string(),
                expected: type_name::<T>(),
            })
    }

    pub fn get_any(&self, name: &str) -> Option<Arc<dyn AnyVariable>> {
        self.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Copies the current set of variables, in no particular order.
    pub fn variables(&self) -> Vec<Arc<dyn AnyVariable>> {
        self.read().values().cloned().collect()
    }

    fn sorted_variables(&self) -> Vec<Arc<dyn AnyVariable>> {
        let mut variables = self.variables();
        variables.sort_by(|a, b| a.name().cmp(b.name()));
        variables
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Adds a relationship between two registered variables.
    pub fn relate(
        &self,
        subject: &str,
        object: &str,
        kind: RelationshipKind,
    ) -> Result<Relationship> {
        let lookup = |name: &str| {
            self.get_any(name)
                .ok_or_else(|| RegistryError::NotRegistered(name.to_string()))
        };
        let (subject, object) = (lookup(subject)?, lookup(object)?);
        Ok(add_relationship(subject.spec(), object.spec(), kind)?)
    }

    /// Resolves every variable and collects the problems, sorted by name.
    pub fn validate(&self) -> Vec<ValidationError> {
        self.sorted_variables()
            .iter()
            .filter_map(|variable| {
                if let Some(err) = variable.error() {
                    return Some(ValidationError::Invalid(err.clone()));
                }
                (!variable.is_valid())
                    .then(|| ValidationError::Missing(variable.name().to_string()))
            })
            .collect()
    }

    /// Describes every variable, sorted by name.
    pub fn report(&self) -> Vec<VariableReport> {
        self.sorted_variables()
            .iter()
            .map(|variable| VariableReport::new(variable.as_ref()))
            .collect()
    }

    /// [`report`](Self::report) as pretty-printed JSON.
    pub fn report_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.report())?)
    }

    /// [`report`](Self::report) as YAML.
    pub fn report_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.report())?)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        f.debug_struct("Registry").field("variables", &names).finish_non_exhaustive()
    }
}
