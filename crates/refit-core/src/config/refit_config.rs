//! Configuration schema
//!
//! ```json
//! {
//!   "$schema": "https://refit.dev/schema/refit.json",
//!   "analysis": { "parallel": true, "skipGenerated": true, "maxFixIterations": 10 },
//!   "rules": { "redundancy/return-void-expression": "warn" },
//!   "refactorings": { "check-expression-for-null": false },
//!   "formatting": { "indentUnit": "    ", "newline": "lf", "blankLineBeforeNullCheck": true }
//! }
//! ```

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::diagnostics::Severity;
use crate::{RefitError, Result};

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RefitConfig {
    /// JSON schema reference for editor support
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[schemars(description = "Diagnostic dispatch settings")]
    pub analysis: AnalysisConfig,

    /// Diagnostic id to severity override
    #[schemars(description = "Per-rule severity: off, info, warn or error")]
    pub rules: IndexMap<String, RuleSeverity>,

    /// Refactoring id to enabled flag
    #[schemars(description = "Enable or disable individual refactorings")]
    pub refactorings: IndexMap<String, bool>,

    #[schemars(description = "Layout used for inserted code")]
    pub formatting: FormattingOptions,
}

impl RefitConfig {
    /// Load from a file, picking the format from the extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| RefitError::io_error(path, e))?;
        let ext = path.extension().and_then(|e| e.to_str());

        match ext {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .map_err(|e| RefitError::config_error(format!("Invalid YAML: {e}"))),
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| RefitError::config_error(format!("Invalid JSON: {e}"))),
            Some("toml") => toml::from_str(&content)
                .map_err(|e| RefitError::config_error(format!("Invalid TOML: {e}"))),
            _ => Err(RefitError::config_error(
                "Unsupported file extension (expected .json, .toml, .yaml or .yml)",
            )),
        }
    }

    /// JSON schema for the configuration file
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(RefitConfig)).unwrap_or_default()
    }
}

/// Diagnostic dispatch settings
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisConfig {
    /// Run per-node callbacks on the rayon pool
    pub parallel: bool,
    /// Skip documents that start with an `<auto-generated>` comment
    pub skip_generated: bool,
    /// Upper bound on fix/recompute rounds in batch mode
    pub max_fix_iterations: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            skip_generated: true,
            max_fix_iterations: 10,
        }
    }
}

/// Rule severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    /// Disable the rule
    Off,
    Info,
    Warn,
    Error,
}

impl RuleSeverity {
    /// Effective severity, `None` when the rule is switched off
    pub fn to_severity(self) -> Option<Severity> {
        match self {
            RuleSeverity::Off => None,
            RuleSeverity::Info => Some(Severity::Info),
            RuleSeverity::Warn => Some(Severity::Warning),
            RuleSeverity::Error => Some(Severity::Error),
        }
    }
}

/// Line ending used in generated code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum Newline {
    #[default]
    Lf,
    Crlf,
}

impl Newline {
    pub fn as_str(self) -> &'static str {
        match self {
            Newline::Lf => "\n",
            Newline::Crlf => "\r\n",
        }
    }
}

/// Layout of code the rewrites insert
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct FormattingOptions {
    pub indent_unit: String,
    pub newline: Newline,
    /// Separate an inserted null check from the statement before it
    pub blank_line_before_null_check: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            indent_unit: "    ".to_string(),
            newline: Newline::Lf,
            blank_line_before_null_check: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: RefitConfig = serde_json::from_str(r#"{"rules": {"a/b": "off"}}"#).unwrap();
        assert_eq!(config.rules.get("a/b"), Some(&RuleSeverity::Off));
        assert!(config.analysis.skip_generated);
        assert_eq!(config.formatting.indent_unit, "    ");
    }

    #[test]
    fn test_camel_case_keys() {
        let config: RefitConfig = serde_json::from_str(
            r#"{"formatting": {"blankLineBeforeNullCheck": false, "newline": "crlf"}}"#,
        )
        .unwrap();
        assert!(!config.formatting.blank_line_before_null_check);
        assert_eq!(config.formatting.newline.as_str(), "\r\n");
    }

    #[test]
    fn test_rule_severity_mapping() {
        assert_eq!(RuleSeverity::Off.to_severity(), None);
        assert_eq!(RuleSeverity::Warn.to_severity(), Some(Severity::Warning));
    }

    #[test]
    fn test_schema_mentions_sections() {
        let schema = RefitConfig::json_schema().to_string();
        assert!(schema.contains("refactorings"));
        assert!(schema.contains("formatting"));
    }
}
