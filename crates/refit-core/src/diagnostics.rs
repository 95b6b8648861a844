//! Diagnostic data model

use std::fmt;

use rowan::TextRange;
use serde::{Deserialize, Serialize};

use crate::semantic::CompilerDiagnostic;
use crate::snapshot::SnapshotId;

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Not shown to the user; drives editor effects such as fading
    Hidden,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Severity::Hidden => "hidden",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(text)
    }
}

/// Static description of a diagnostic an analyzer can report
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiagnosticDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    /// Message with positional placeholders `{0}`, `{1}`, ...
    pub message_format: &'static str,
    pub category: &'static str,
    pub default_severity: Severity,
    pub enabled_by_default: bool,
}

impl DiagnosticDescriptor {
    /// Substitute positional arguments into the message format
    pub fn format_message(&self, args: &[String]) -> String {
        let mut message = self.message_format.to_string();
        for (index, arg) in args.iter().enumerate() {
            message = message.replace(&format!("{{{index}}}"), arg);
        }
        message
    }
}

/// Where a diagnostic points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub snapshot: SnapshotId,
    pub range: TextRange,
}

/// A reported finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub id: String,
    pub severity: Severity,
    pub message: String,
    pub args: Vec<String>,
    pub location: Location,
    pub additional_locations: Vec<Location>,
}

impl Diagnostic {
    pub fn range(&self) -> TextRange {
        self.location.range
    }

    /// Lift a compiler diagnostic so fix providers can be routed to it
    pub fn from_compiler(snapshot: SnapshotId, diagnostic: &CompilerDiagnostic) -> Self {
        Self {
            id: diagnostic.id.clone(),
            severity: Severity::Error,
            message: diagnostic.message.clone(),
            args: Vec::new(),
            location: Location {
                snapshot,
                range: diagnostic.range,
            },
            additional_locations: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: DiagnosticDescriptor = DiagnosticDescriptor {
        id: "style/sample",
        title: "Sample",
        message_format: "Replace '{0}' with '{1}'",
        category: "style",
        default_severity: Severity::Info,
        enabled_by_default: true,
    };

    #[test]
    fn test_format_message() {
        let message = SAMPLE.format_message(&["return".to_string(), "x".to_string()]);
        assert_eq!(message, "Replace 'return' with 'x'");
        assert_eq!(SAMPLE.format_message(&[]), "Replace '{0}' with '{1}'");
    }

    #[test]
    fn test_severity_order_and_serde() {
        assert!(Severity::Hidden < Severity::Error);
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "\"warning\"");
    }
}
