//! Configuration loading, validation and merging.
//!
//! The configuration is a JSON document with recognized top-level sections
//! (`databases`, `env`, `settings`, `dependencies`, `schema`, `files`,
//! `post_create_scripts`). It is kept as a [`serde_json::Value`] tree so
//! free-form override structures survive untouched; [`Config`] provides
//! typed accessors over the merged result.

mod defaults;
mod merge;
pub mod restricted;

pub use defaults::default_config;
pub use merge::merge_values;
pub use restricted::{validate_config, ValidationIssue};

use anyhow::Context;
use serde_json::{Map, Value};
use std::path::Path;

/// The effective configuration for one generation run: the built-in defaults
/// deep-merged with a validated user configuration.
#[derive(Debug, Clone)]
pub struct Config {
    root: Value,
}

static EMPTY_VEC: Vec<Value> = Vec::new();

impl Config {
    /// Load a configuration from a JSON file.
    ///
    /// Parses the document, validates it against the restricted-name sets
    /// (collecting every violation before failing), and merges it over the
    /// built-in defaults.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing or unreadable, the JSON is malformed, or
    /// validation finds restricted-name or identifier-safety violations.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let user: Value = serde_json::from_str(&content)
            .with_context(|| format!("malformed JSON in config file: {}", path.display()))?;
        Self::from_user_value(user)
    }

    /// Build the effective configuration from an already-parsed user value.
    pub fn from_user_value(user: Value) -> anyhow::Result<Self> {
        let issues = validate_config(&user);
        if !issues.is_empty() {
            anyhow::bail!(restricted::format_issues(&issues));
        }
        let root = merge_values(&default_config(), &user);
        Ok(Config { root })
    }

    /// The full merged configuration tree.
    pub fn root(&self) -> &Value {
        &self.root
    }

    fn settings(&self) -> Option<&Map<String, Value>> {
        self.root.get("settings").and_then(Value::as_object)
    }

    /// A string-valued setting, or `default` when absent or not a string.
    pub fn setting_str(&self, key: &str, default: &str) -> String {
        self.settings()
            .and_then(|s| s.get(key))
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    /// A string-valued setting, or `None` when absent, null, or empty.
    pub fn setting_opt(&self, key: &str) -> Option<String> {
        self.settings()
            .and_then(|s| s.get(key))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Database connection descriptors, in input order.
    pub fn databases(&self) -> &[Value] {
        self.root
            .get("databases")
            .and_then(Value::as_array)
            .map_or(&EMPTY_VEC, Vec::as_slice)
    }

    /// The `env` section, if present.
    pub fn env_vars(&self) -> Option<&Map<String, Value>> {
        self.root.get("env").and_then(Value::as_object)
    }

    /// Dependency specifier strings, defaults first.
    pub fn dependencies(&self) -> Vec<String> {
        self.string_list("dependencies")
    }

    /// Relative paths to pre-create empty.
    pub fn files(&self) -> Vec<String> {
        self.string_list("files")
    }

    /// Shell commands to run after generation, in declared order.
    pub fn post_create_scripts(&self) -> Vec<String> {
        self.string_list("post_create_scripts")
    }

    /// The user-declared service schema (may be empty).
    pub fn schema(&self) -> Value {
        self.root
            .get("schema")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    fn string_list(&self, key: &str) -> Vec<String> {
        self.root
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}
