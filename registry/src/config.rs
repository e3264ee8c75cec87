//! Environment fixtures for tests and documentation runs.
//!
//! A fixture is a YAML file listing variable values, loaded into an
//! [`Environment`] before variables are resolved.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! variables:
//!   PORT: "8080"
//!   LOG_LEVEL: debug
//! inherit: false
//! ```
//!
//! Quote values that YAML would otherwise read as numbers or booleans.

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::environment::{
    Environment, MemoryEnvironment, OsEnvironment, Snapshot, check_variable,
};
use crate::error::{RegistryError, Result};

/// Current fixture format version.
pub const FIXTURE_VERSION: &str = "1.0";

fn default_version() -> String {
    FIXTURE_VERSION.to_string()
}

/// A named set of environment variable values.
///
/// # Examples
///
/// ```
/// use envspec_registry::{Environment, EnvironmentFixture};
///
/// let fixture: EnvironmentFixture = serde_yaml::from_str(r#"
/// variables:
///   PORT: "8080"
/// "#).unwrap();
///
/// let env = fixture.into_environment();
/// assert_eq!(env.get("PORT"), "8080");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentFixture {
    /// Fixture format version (e.g., `"1.0"`).
    #[serde(default = "default_version")]
    pub version: String,
    /// Variable values by name.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    /// Start from the process environment instead of an empty one when
    /// building an environment with [`into_environment`](Self::into_environment).
    #[serde(default)]
    pub inherit: bool,
}

impl Default for EnvironmentFixture {
    fn default() -> Self {
        Self {
            version: default_version(),
            variables: BTreeMap::new(),
            inherit: false,
        }
    }
}

impl EnvironmentFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn with_inherit(mut self, inherit: bool) -> Self {
        self.inherit = inherit;
        self
    }

    /// Captures the current contents of `env`.
    pub fn capture(env: &dyn Environment) -> Self {
        Self {
            variables: Snapshot::take(env).vars().clone(),
            ..Self::default()
        }
    }

    /// Checks that every variable could be set in the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidVariable`] for the first offending
    /// variable, in name order.
    pub fn check(&self) -> Result<()> {
        for (name, value) in &self.variables {
            check_variable(name, value).map_err(|reason| RegistryError::InvalidVariable {
                name: name.clone(),
                reason,
            })?;
        }
        Ok(())
    }

    /// Loads a fixture from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::RegistryError::IoError) if the file cannot
    /// be read, [`YamlError`](crate::RegistryError::YamlError) if parsing
    /// fails, or [`InvalidVariable`](crate::RegistryError::InvalidVariable)
    /// if a variable fails [`check`](Self::check).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let fixture: Self = serde_yaml::from_reader(reader)?;
        fixture.check()?;
        Ok(fixture)
    }

    /// Saves the fixture as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::RegistryError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::RegistryError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Sets every fixture variable in `env`, leaving other variables alone.
    ///
    /// `inherit` is not consulted; `env` already holds whatever it holds.
    pub fn apply(&self, env: &dyn Environment) {
        for (name, value) in &self.variables {
            env.set(name, value);
        }
    }

    /// Builds an in-memory environment holding the fixture's variables, on
    /// top of a copy of the process environment when `inherit` is set.
    pub fn into_environment(self) -> MemoryEnvironment {
        let env = if self.inherit {
            MemoryEnvironment::from_iter(Snapshot::take(&OsEnvironment).vars().clone())
        } else {
            MemoryEnvironment::new()
        };
        self.apply(&env);
        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
version: "1.0"
variables:
  PORT: "8080"
  LOG_LEVEL: debug
inherit: false
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let fixture: EnvironmentFixture = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(fixture.version, "1.0");
        assert_eq!(fixture.variables.len(), 2);
        assert_eq!(fixture.variables["PORT"], "8080");
        assert!(!fixture.inherit);
    }

    #[test]
    fn test_deserialize_minimal() {
        let fixture: EnvironmentFixture = serde_yaml::from_str("{}").unwrap();
        assert_eq!(fixture, EnvironmentFixture::new());
        assert_eq!(fixture.version, FIXTURE_VERSION);
    }

    #[test]
    fn test_apply_keeps_other_variables() {
        let env = MemoryEnvironment::from_iter([("OTHER", "x"), ("PORT", "1")]);
        EnvironmentFixture::new().with_variable("PORT", "2").apply(&env);
        assert_eq!(env.get("PORT"), "2");
        assert_eq!(env.get("OTHER"), "x");
    }

    #[test]
    fn test_inherit_copies_process_environment() {
        let name = "ENVSPEC_REGISTRY_TEST_FIXTURE_INHERIT";
        OsEnvironment.set(name, "inherited");

        let env = EnvironmentFixture::new().with_inherit(true).into_environment();
        assert_eq!(env.get(name), "inherited");
        let env = EnvironmentFixture::new().into_environment();
        assert_eq!(env.get(name), "");

        OsEnvironment.unset(name);
    }

    #[test]
    fn test_check_rejects_invalid_names() {
        assert!(EnvironmentFixture::new().with_variable("PORT", "1").check().is_ok());

        let err = EnvironmentFixture::new().with_variable("A=B", "x").check().unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvalidVariable { ref name, .. } if name == "A=B"
        ));
        assert_eq!(err.to_string(), "invalid environment variable \"A=B\": name contains '='");
    }

    #[test]
    fn test_load_rejects_invalid_names() {
        let dir = std::env::temp_dir().join("envspec_registry_test_fixture_invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("fixture.yml");
        std::fs::write(&path, "variables:\n  \"A=B\": x\n").unwrap();

        let result = EnvironmentFixture::load(&path);
        assert!(matches!(result, Err(RegistryError::InvalidVariable { .. })));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_apply_to_os_environment_skips_invalid_names() {
        let name = "ENVSPEC_REGISTRY_TEST_FIXTURE_APPLY_OS";
        EnvironmentFixture::new()
            .with_variable("A=B", "x")
            .with_variable(name, "set")
            .apply(&OsEnvironment);
        assert_eq!(OsEnvironment.get(name), "set");
        OsEnvironment.unset(name);
    }

    #[test]
    fn test_capture() {
        let env = MemoryEnvironment::from_iter([("A", "1")]);
        let fixture = EnvironmentFixture::capture(&env);
        assert_eq!(fixture, EnvironmentFixture::new().with_variable("A", "1"));
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = std::env::temp_dir().join("envspec_registry_test_fixture_rt");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("fixture.yml");

        let original: EnvironmentFixture = serde_yaml::from_str(sample_yaml()).unwrap();
        original.save(&path).unwrap();

        let loaded = EnvironmentFixture::load(&path).unwrap();
        assert_eq!(loaded, original);

        std::fs::remove_dir_all(&dir).ok();
    }
}
