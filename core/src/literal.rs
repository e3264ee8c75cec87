//! Canonical string form of environment variable values.
//!
//! A [`Literal`] is exactly what appears in the environment. Two literals are
//! equal if and only if their strings are equal; no normalization happens
//! here. Schemas decide what the canonical form of a native value is.

use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Characters that can appear in a shell word without quoting.
static BARE_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_@%+=:,./-]+$").expect("static regex must compile")
});

/// The string representation of a value as it appears in the environment.
///
/// # Examples
///
/// ```
/// use envspec_core::Literal;
///
/// let port = Literal::new("8080");
/// assert_eq!(port.as_str(), "8080");
/// assert_eq!(port.quote(), "8080");
///
/// let greeting = Literal::new("it's here");
/// assert_eq!(greeting.quote(), r#"'it'"'"'s here'"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Literal(String);

impl Literal {
    /// Creates a literal from any string-like value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the literal, returning the raw string.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns `true` if the literal is the empty string.
    ///
    /// An empty literal is indistinguishable from an unset variable.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length of the literal in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the literal in a form that is safe to paste into a POSIX shell.
    ///
    /// Strings made only of word characters and `@ % + = : , . / -` are
    /// returned as-is. Anything else is wrapped in single quotes, with
    /// embedded single quotes spliced out as `'"'"'`.
    ///
    /// # Examples
    ///
    /// ```
    /// use envspec_core::Literal;
    ///
    /// assert_eq!(Literal::new("https://example.org/a,b").quote(), "https://example.org/a,b");
    /// assert_eq!(Literal::new("two words").quote(), "'two words'");
    /// assert_eq!(Literal::new("").quote(), "''");
    /// ```
    pub fn quote(&self) -> Cow<'_, str> {
        if BARE_WORD_RE.is_match(&self.0) {
            return Cow::Borrowed(&self.0);
        }
        Cow::Owned(format!("'{}'", self.0.replace('\'', r#"'"'"'"#)))
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for Literal {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
