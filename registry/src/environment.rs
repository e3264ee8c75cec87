//! The environment boundary.
//!
//! Variables read their values through the [`Environment`] trait, so the
//! process environment ([`OsEnvironment`]) and an in-memory map
//! ([`MemoryEnvironment`]) are interchangeable.

use std::collections::BTreeMap;
use std::env::VarError;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Checks that `name` and `value` can be stored in a process environment.
///
/// Names must be non-empty and free of `=` and NUL; values must be free of
/// NUL.
pub fn check_variable(name: &str, value: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        Err("name is empty")
    } else if name.contains('=') {
        Err("name contains '='")
    } else if name.contains('\0') {
        Err("name contains a NUL byte")
    } else if value.contains('\0') {
        Err("value contains a NUL byte")
    } else {
        Ok(())
    }
}

/// A source of environment variable values.
///
/// An unset variable and a variable set to the empty string are treated
/// alike: both read as `""`. [`OsEnvironment`] also reads values that are
/// not valid UTF-8 as `""`, logging a warning, rather than decoding them
/// lossily.
pub trait Environment: Send + Sync {
    /// Returns the value of `name`, or an empty string if it is unset.
    fn get(&self, name: &str) -> String;

    fn set(&self, name: &str, value: &str);

    fn unset(&self, name: &str);

    /// Calls `visit` for each variable until it returns `false`.
    ///
    /// Returns `true` if every variable was visited.
    fn for_each(&self, visit: &mut dyn FnMut(&str, &str) -> bool) -> bool;
}

/// The environment of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEnvironment;

impl Environment for OsEnvironment {
    fn get(&self, name: &str) -> String {
        if check_variable(name, "").is_err() {
            return String::new();
        }
        match std::env::var(name) {
            Ok(value) => value,
            Err(VarError::NotPresent) => String::new(),
            Err(VarError::NotUnicode(_)) => {
                tracing::warn!(variable = name, "ignoring value that is not valid UTF-8");
                String::new()
            }
        }
    }

    fn set(&self, name: &str, value: &str) {
        if let Err(reason) = check_variable(name, value) {
            tracing::warn!(variable = name, reason, "not setting environment variable");
            return;
        }
        // SAFETY: the process environment is shared by all threads; callers
        // of `set` are responsible for not racing other readers, which in
        // practice means calling it from test setup or before spawning
        // threads.
        unsafe { std::env::set_var(name, value) }
    }

    fn unset(&self, name: &str) {
        if let Err(reason) = check_variable(name, "") {
            tracing::warn!(variable = name, reason, "not unsetting environment variable");
            return;
        }
        // SAFETY: see `set`.
        unsafe { std::env::remove_var(name) }
    }

    fn for_each(&self, visit: &mut dyn FnMut(&str, &str) -> bool) -> bool {
        for (name, value) in std::env::vars_os() {
            let (Some(name), Some(value)) = (name.to_str(), value.to_str()) else {
                tracing::warn!(
                    variable = %name.to_string_lossy(),
                    "skipping variable that is not valid UTF-8"
                );
                continue;
            };
            if !visit(name, value) {
                return false;
            }
        }
        true
    }
}

/// An environment held in memory, independent of the process.
///
/// # Examples
///
/// ```
/// use envspec_registry::{Environment, MemoryEnvironment};
///
/// let env = MemoryEnvironment::from_iter([("PORT", "8080")]);
/// assert_eq!(env.get("PORT"), "8080");
/// assert_eq!(env.get("HOST"), "");
/// ```
#[derive(Debug, Default)]
pub struct MemoryEnvironment {
    vars: Mutex<BTreeMap<String, String>>,
}

impl MemoryEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.vars.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copies the current contents, sorted by name.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryEnvironment
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: Mutex::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }
}

impl Environment for MemoryEnvironment {
    fn get(&self, name: &str) -> String {
        self.lock().get(name).cloned().unwrap_or_default()
    }

    fn set(&self, name: &str, value: &str) {
        self.lock().insert(name.to_string(), value.to_string());
    }

    fn unset(&self, name: &str) {
        self.lock().remove(name);
    }

    fn for_each(&self, visit: &mut dyn FnMut(&str, &str) -> bool) -> bool {
        // Visit a copy so the callback may modify the environment.
        let vars = self.to_map();
        vars.iter().all(|(name, value)| visit(name, value))
    }
}

/// A saved copy of an environment's contents.
///
/// # Examples
///
/// ```
/// use envspec_registry::{Environment, MemoryEnvironment, Snapshot};
///
/// let env = MemoryEnvironment::from_iter([("A", "1")]);
/// let snapshot = Snapshot::take(&env);
///
/// env.set("A", "2");
/// env.set("B", "3");
/// snapshot.restore(&env);
///
/// assert_eq!(env.get("A"), "1");
/// assert_eq!(env.get("B"), "");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    vars: BTreeMap<String, String>,
}

impl Snapshot {
    pub fn take(env: &dyn Environment) -> Self {
        let mut vars = BTreeMap::new();
        env.for_each(&mut |name, value| {
            vars.insert(name.to_string(), value.to_string());
            true
        });
        Self { vars }
    }

    /// Makes `env` hold exactly the saved variables again.
    pub fn restore(&self, env: &dyn Environment) {
        let mut stale = Vec::new();
        env.for_each(&mut |name, _| {
            if !self.vars.contains_key(name) {
                stale.push(name.to_string());
            }
            true
        });
        for name in stale {
            env.unset(&name);
        }
        for (name, value) in &self.vars {
            env.set(name, value);
        }
    }

    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
