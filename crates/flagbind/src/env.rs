//! Environment variable providers.
//!
//! The parse engine never touches `std::env` directly. It asks an
//! [`EnvLookup`], so tests can run against a fixed environment.

use std::collections::HashMap;
use std::env::VarError;

use crate::EnvError;

/// Abstraction over environment variable lookup.
pub trait EnvLookup {
    /// Looks up a variable.
    ///
    /// `Ok(None)` means the variable is not set. An `Err` aborts the parse.
    fn lookup(&self, name: &str) -> Result<Option<String>, EnvError>;
}

/// Reads the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn lookup(&self, name: &str) -> Result<Option<String>, EnvError> {
        match std::env::var(name) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(EnvError::NotUnicode {
                name: name.to_string(),
            }),
        }
    }
}

/// Fixed in-memory environment for testing.
#[derive(Debug, Clone, Default)]
pub struct MockEnv {
    vars: HashMap<String, String>,
    failing: Vec<String>,
}

impl MockEnv {
    /// Create an empty mock environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an environment variable.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Make lookups of `name` fail, as a broken provider would.
    pub fn with_failure(mut self, name: impl Into<String>) -> Self {
        self.failing.push(name.into());
        self
    }
}

impl EnvLookup for MockEnv {
    fn lookup(&self, name: &str) -> Result<Option<String>, EnvError> {
        if self.failing.iter().any(|failing| failing == name) {
            return Err(EnvError::Lookup {
                name: name.to_string(),
                reason: "mock failure".to_string(),
            });
        }
        Ok(self.vars.get(name).cloned())
    }
}
