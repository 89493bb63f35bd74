//! Named search configurations.
//!
//! Configurations are loaded from a JSON document of the form
//! `{"configurations": [{"name": "...", "pattern": "...", ...}]}`. Each entry
//! carries the fields of [`MatchOptions`] alongside its name. A constraint may
//! refer to another configuration by name.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::options::MatchOptions;

/// A saved pattern with its options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Unique name within a registry.
    pub name: String,
    /// The options the pattern compiles with.
    #[serde(flatten)]
    pub options: MatchOptions,
}

impl Configuration {
    /// Creates a configuration.
    #[must_use]
    pub fn new(name: impl Into<String>, options: MatchOptions) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }

    /// Returns the configuration name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the options.
    #[must_use]
    pub const fn options(&self) -> &MatchOptions {
        &self.options
    }
}

/// Errors raised while loading configurations.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The configuration file could not be read.
    #[error("failed to read configurations from {path}: {source}")]
    Read {
        /// The file that failed to load.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// The document is not valid configuration JSON.
    #[error("invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),
    /// Two configurations share a name.
    #[error("configuration '{name}' is defined more than once")]
    Duplicate {
        /// The repeated name.
        name: String,
    },
}

#[derive(Deserialize)]
struct Document {
    configurations: Vec<Configuration>,
}

/// Named configurations available to a search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationRegistry {
    entries: BTreeMap<String, Configuration>,
}

impl ConfigurationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a registry from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Parse`] for malformed JSON and
    /// [`ConfigurationError::Duplicate`] when two entries share a name.
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let document: Document = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for configuration in document.configurations {
            registry.insert(configuration)?;
        }
        Ok(registry)
    }

    /// Reads and parses a registry from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Read`] when the file cannot be read, or
    /// any error [`Self::from_json`] reports.
    pub fn from_path(path: &Path) -> Result<Self, ConfigurationError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Adds a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Duplicate`] if the name is taken.
    pub fn insert(&mut self, configuration: Configuration) -> Result<(), ConfigurationError> {
        if self.entries.contains_key(&configuration.name) {
            return Err(ConfigurationError::Duplicate {
                name: configuration.name,
            });
        }
        self.entries
            .insert(configuration.name.clone(), configuration);
        Ok(())
    }

    /// Looks up a configuration by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Configuration> {
        self.entries.get(name)
    }

    /// Returns every configuration in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Configuration> {
        self.entries.values()
    }

    /// Returns the number of configurations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
