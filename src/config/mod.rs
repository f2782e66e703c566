//! Configuration for `pmu`.
//!
//! Read-only loader for `.pmu.yml`, discovered by walking up from the
//! working directory. The file names the default project, default
//! repositories, and per-field alias tables:
//!
//! ```yaml
//! project:
//!   owner: acme
//!   number: 3
//! repositories:
//!   - acme/widgets
//! fields:
//!   status:
//!     field: Status
//!     values:
//!       backlog: Backlog
//!       in_progress: In Progress
//!       done: Done
//!   priority:
//!     field: Priority
//!     values:
//!       p0: P0
//!       p1: P1
//! ```
//!
//! Writing configuration (init flows) is out of scope; the core only
//! consumes it.

use crate::error::{PmuError, Result};
use crate::model::RepoRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration filename looked up during discovery.
pub const CONFIG_FILENAME: &str = ".pmu.yml";

/// The default project a command operates on.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectConfig {
    pub owner: String,
    pub number: u32,
}

/// Per-field alias table: a display name plus shorthand value mappings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldConfig {
    /// Display name of the project field (e.g., "Status").
    pub field: String,
    /// Alias -> canonical display value (e.g., "p0" -> "P0").
    #[serde(default)]
    pub values: HashMap<String, String>,
}

/// Loaded `.pmu.yml` contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub repositories: Vec<String>,
    #[serde(default)]
    pub fields: HashMap<String, FieldConfig>,
    /// Default field values applied to newly created items, keyed by the
    /// field key (e.g., "status").
    #[serde(default)]
    pub defaults: HashMap<String, String>,
}

impl Config {
    /// Load configuration by walking up from `start` until `.pmu.yml` is
    /// found.
    ///
    /// # Errors
    ///
    /// Returns a config error when no file is found, or a parse error when
    /// the file is malformed.
    pub fn discover(start: &Path) -> Result<Self> {
        let path = find_config_file(start).ok_or_else(|| {
            PmuError::Config(format!(
                "no {CONFIG_FILENAME} found in {} or any parent directory",
                start.display()
            ))
        })?;
        Self::load(&path)
    }

    /// Load configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed, or when
    /// required fields are missing.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants commands rely on.
    ///
    /// # Errors
    ///
    /// Returns a config error when the project owner or number is missing.
    pub fn validate(&self) -> Result<()> {
        if self.project.owner.trim().is_empty() {
            return Err(PmuError::Config("project.owner is required".to_string()));
        }
        if self.project.number == 0 {
            return Err(PmuError::Config("project.number is required".to_string()));
        }
        for repo in &self.repositories {
            if RepoRef::parse(repo).is_none() {
                return Err(PmuError::Config(format!(
                    "invalid repository '{repo}' (expected owner/repo)"
                )));
            }
        }
        Ok(())
    }

    /// First configured repository, used for bare issue numbers.
    #[must_use]
    pub fn default_repo(&self) -> Option<RepoRef> {
        self.repositories.first().and_then(|s| RepoRef::parse(s))
    }

    /// Resolve a shorthand field value through the alias table.
    ///
    /// Unknown keys and unmapped values pass through unchanged; alias
    /// lookup is case-insensitive on the alias side.
    #[must_use]
    pub fn resolve_field_value(&self, field_key: &str, raw: &str) -> String {
        let Some(field) = self.field_config(field_key) else {
            return raw.to_string();
        };
        let lowered = raw.to_lowercase();
        field
            .values
            .iter()
            .find(|(alias, _)| alias.to_lowercase() == lowered)
            .map_or_else(|| raw.to_string(), |(_, value)| value.clone())
    }

    /// Display name of a configured field, falling back to capitalizing
    /// the key (e.g., "status" -> "Status").
    #[must_use]
    pub fn field_display_name(&self, field_key: &str) -> String {
        self.field_config(field_key).map_or_else(
            || capitalize(field_key),
            |field| field.field.clone(),
        )
    }

    fn field_config(&self, field_key: &str) -> Option<&FieldConfig> {
        let lowered = field_key.to_lowercase();
        self.fields
            .iter()
            .find(|(key, _)| key.to_lowercase() == lowered)
            .map(|(_, field)| field)
    }
}

/// Walk up from `start` looking for the config file.
#[must_use]
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        current = dir.parent();
    }
    None
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}
