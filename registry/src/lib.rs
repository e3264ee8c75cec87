//! Binding of envspec specifications to an environment.
//!
//! This crate connects the declarations from [`envspec_core`] to actual
//! values:
//!
//! - [`Environment`] is the boundary to variable storage, implemented by
//!   [`OsEnvironment`] and [`MemoryEnvironment`].
//! - [`Variable`] resolves a spec against an environment once and caches
//!   the outcome.
//! - [`Registry`] holds variables by name, validates them together and
//!   produces [`VariableReport`]s for documentation.
//! - [`EnvironmentFixture`] loads test environments from YAML, and
//!   [`Snapshot`] saves and restores an environment around a test.
//!
//! # Quick start
//!
//! ```
//! use std::sync::Arc;
//! use envspec_core::{BinarySchema, Hex, SpecBuilder};
//! use envspec_registry::{EnvironmentFixture, Registry, Status};
//!
//! let env = EnvironmentFixture::new()
//!     .with_variable("SESSION_KEY", "00112233")
//!     .into_environment();
//! let registry = Registry::new(Arc::new(env));
//!
//! let key = registry
//!     .register(
//!         SpecBuilder::<Vec<u8>>::new("SESSION_KEY", "session signing key")
//!             .sensitive()
//!             .required()
//!             .done(BinarySchema::new(Hex).with_min_length(4)),
//!     )
//!     .unwrap();
//!
//! assert_eq!(key.value().unwrap(), Some(vec![0x00, 0x11, 0x22, 0x33]));
//! assert!(registry.validate().is_empty());
//!
//! let report = registry.report();
//! assert_eq!(report[0].status, Status::Set { value: "<redacted>".into() });
//! ```

mod config;
mod environment;
mod error;
mod registry;
mod report;
mod variable;

pub use config::{EnvironmentFixture, FIXTURE_VERSION};
pub use environment::{Environment, MemoryEnvironment, OsEnvironment, Snapshot, check_variable};
pub use error::{RegistryError, Result, ValidationError};
pub use registry::Registry;
pub use report::{REDACTED, Status, VariableReport};
pub use variable::{AnyVariable, Value, Variable};
