//! Configuration types for arch-conform.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Options that change how names and dependencies are matched.
///
/// Passed by value into every evaluation; there is no global state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOptions {
    /// Compare names and namespaces case-sensitively (default: false).
    #[serde(default)]
    pub case_sensitive: bool,

    /// Treat string constants of `const` fields as dependency text (default: false).
    #[serde(default)]
    pub search_field_constants: bool,
}

impl CheckOptions {
    /// Creates the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets case sensitivity.
    #[must_use]
    pub fn case_sensitive(mut self, value: bool) -> Self {
        self.case_sensitive = value;
        self
    }

    /// Sets whether string constants are scanned.
    #[must_use]
    pub fn search_field_constants(mut self, value: bool) -> Self {
        self.search_field_constants = value;
        self
    }
}

/// Top-level configuration file (`arch-conform.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Severity threshold for failing a run (default: "error").
    #[serde(default)]
    pub fail_on: Option<String>,

    /// Matching options.
    #[serde(default)]
    pub options: CheckOptions,

    /// Where metadata dumps are loaded from.
    #[serde(default)]
    pub metadata: MetadataConfig,

    /// Per-rule overrides keyed by rule name.
    #[serde(default)]
    pub overrides: HashMap<String, RuleOverride>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.overrides
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<crate::Severity> {
        self.overrides.get(rule_name).and_then(|c| c.severity)
    }
}

/// Metadata source configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Glob patterns of JSON metadata dumps, relative to the config file.
    #[serde(default)]
    pub paths: Vec<String>,
}

/// Per-rule override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleOverride {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<crate::Severity>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: std::path::PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}
