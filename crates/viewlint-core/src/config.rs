//! Layered configuration resolution.
//!
//! Configuration arrives as TOML documents ([`ConfigDocument`]),
//! layered built-in defaults < global config < project config. A
//! malformed `[rules.<id>]` entry is localized to that entry: the
//! rest of the document still applies and the failure is reported,
//! never swallowed.

use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Per-rule configuration entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSettings {
    /// Whether this rule is enabled (default: true).
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Rule-specific parameter overrides.
    #[serde(flatten)]
    pub params: BTreeMap<String, toml::Value>,
}

/// One configuration layer parsed from a TOML document.
#[derive(Debug, Clone, Default)]
pub struct ConfigDocument {
    /// Severity threshold for a failing exit code.
    pub fail_on: Option<Severity>,
    /// Rule entries that parsed cleanly.
    pub rules: BTreeMap<String, RuleSettings>,
    /// Entries that failed to parse, reported but not fatal.
    pub errors: Vec<ConfigParseError>,
}

impl ConfigDocument {
    /// Loads a layer from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Parse`] when the document as a whole is not
    /// valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses a layer from a TOML string.
    ///
    /// Document-level syntax errors are fatal; a malformed rule
    /// entry is collected into [`ConfigDocument::errors`] and the
    /// remaining entries still apply.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the document is not valid
    /// TOML or its top-level fields have the wrong shape.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;

        let fail_on = match table.get("fail_on") {
            None => None,
            Some(value) => Some(value.clone().try_into().map_err(|e: toml::de::Error| {
                ConfigError::Parse {
                    message: format!("invalid `fail_on`: {e}"),
                }
            })?),
        };

        let mut rules = BTreeMap::new();
        let mut errors = Vec::new();
        if let Some(value) = table.get("rules") {
            let entries = value.as_table().ok_or_else(|| ConfigError::Parse {
                message: "`rules` must be a table of rule entries".to_string(),
            })?;
            for (rule_id, entry) in entries {
                match entry.clone().try_into::<RuleSettings>() {
                    Ok(settings) => {
                        rules.insert(rule_id.clone(), settings);
                    }
                    Err(e) => errors.push(ConfigParseError {
                        rule_id: rule_id.clone(),
                        message: e.to_string(),
                    }),
                }
            }
        }

        Ok(Self {
            fail_on,
            rules,
            errors,
        })
    }
}

/// Resolved, immutable configuration snapshot for one analysis run.
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Severity threshold for a failing exit code.
    pub fail_on: Severity,
    /// Per-rule entries after layering.
    pub rules: BTreeMap<String, RuleSettings>,
    /// Parse errors collected from all layers, for reporting.
    pub parse_errors: Vec<ConfigParseError>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            fail_on: Severity::Error,
            rules: BTreeMap::new(),
            parse_errors: Vec::new(),
        }
    }
}

impl Configuration {
    /// Resolves layered documents into one snapshot.
    ///
    /// Later layers strictly override earlier ones per rule id;
    /// rules no layer mentions keep their catalog defaults.
    #[must_use]
    pub fn resolve(layers: Vec<ConfigDocument>) -> Self {
        let mut resolved = Self::default();
        for layer in layers {
            if let Some(fail_on) = layer.fail_on {
                resolved.fail_on = fail_on;
            }
            for (rule_id, settings) in layer.rules {
                resolved.rules.insert(rule_id, settings);
            }
            resolved.parse_errors.extend(layer.errors);
        }
        resolved
    }

    /// Looks up the entry for a rule.
    #[must_use]
    pub fn rule(&self, rule_id: &str) -> Option<&RuleSettings> {
        self.rules.get(rule_id)
    }

    /// Checks whether a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_id: &str) -> bool {
        self.rules
            .get(rule_id)
            .map_or(true, |s| s.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_id: &str) -> Option<Severity> {
        self.rules.get(rule_id).and_then(|s| s.severity)
    }
}

/// Configuration errors fatal to a whole document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading a config file.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The document is not valid TOML.
    #[error("failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

/// A malformed rule entry, isolated to that entry.
#[derive(Debug, Clone, Error)]
#[error("invalid configuration for rule `{rule_id}`: {message}")]
pub struct ConfigParseError {
    /// The rule entry that failed.
    pub rule_id: String,
    /// Why it failed.
    pub message: String,
}
