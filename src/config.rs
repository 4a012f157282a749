//! Session configuration.

use std::path::Path;

use serde::Deserialize;

use crate::error::HarnessError;

/// Literal prefix stripped from declared test names when they are displayed.
pub const DEFAULT_NAME_PREFIX: &str = "test_";
/// Initial capacity of the captured-output scratch buffer, in bytes.
pub const DEFAULT_CAPTURE_CAPACITY: usize = 256;

/// Configuration for a [`crate::Session`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub name_prefix: String,
    pub capture_capacity: usize,
    /// Growth ceiling for the scratch buffer. `None` means unbounded.
    pub capture_limit: Option<usize>,
    /// When false the session starts with null sinks.
    pub print: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            capture_capacity: DEFAULT_CAPTURE_CAPACITY,
            capture_limit: None,
            print: true,
        }
    }
}

impl SessionConfig {
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    pub fn with_capture_capacity(mut self, capacity: usize) -> Self {
        self.capture_capacity = capacity;
        self
    }

    pub fn with_capture_limit(mut self, limit: usize) -> Self {
        self.capture_limit = Some(limit);
        self
    }

    pub fn with_print(mut self, print: bool) -> Self {
        self.print = print;
        self
    }

    /// Reads a JSON config; absent fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, HarnessError> {
        let text = std::fs::read_to_string(path).map_err(|source| HarnessError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| HarnessError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Display form of a declared test name: the configured prefix stripped
    /// when present, the name unchanged otherwise.
    pub fn display_name<'a>(&self, declared: &'a str) -> &'a str {
        declared
            .strip_prefix(self.name_prefix.as_str())
            .unwrap_or(declared)
    }
}
