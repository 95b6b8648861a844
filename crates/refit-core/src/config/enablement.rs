//! Rule and refactoring enablement gate
//!
//! An [`Enablement`] is built once per session from configuration and shared
//! as `Arc<Enablement>`; it is never mutated afterwards. A process-wide
//! default can be installed once with [`Enablement::install_global`].

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::refit_config::{RefitConfig, RuleSeverity};
use crate::diagnostics::{DiagnosticDescriptor, Severity};
use crate::{RefitError, Result};

static GLOBAL: OnceCell<Arc<Enablement>> = OnceCell::new();

/// Immutable id → enabled lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enablement {
    rules: HashMap<String, RuleSeverity>,
    refactorings: HashMap<String, bool>,
    default_enabled: bool,
}

impl Default for Enablement {
    fn default() -> Self {
        Self::all_enabled()
    }
}

impl Enablement {
    /// Everything enabled at its default severity
    pub fn all_enabled() -> Self {
        Self {
            rules: HashMap::new(),
            refactorings: HashMap::new(),
            default_enabled: true,
        }
    }

    pub fn from_config(config: &RefitConfig) -> Self {
        Self {
            rules: config
                .rules
                .iter()
                .map(|(id, severity)| (id.clone(), *severity))
                .collect(),
            refactorings: config
                .refactorings
                .iter()
                .map(|(id, enabled)| (id.clone(), *enabled))
                .collect(),
            default_enabled: true,
        }
    }

    /// Refactorings not mentioned in configuration fall back to `enabled`
    pub fn with_default(mut self, enabled: bool) -> Self {
        self.default_enabled = enabled;
        self
    }

    pub fn with_refactoring(mut self, id: impl Into<String>, enabled: bool) -> Self {
        self.refactorings.insert(id.into(), enabled);
        self
    }

    pub fn with_rule(mut self, id: impl Into<String>, severity: RuleSeverity) -> Self {
        self.rules.insert(id.into(), severity);
        self
    }

    /// Whether a refactoring or rule id is enabled
    pub fn is_enabled(&self, id: &str) -> bool {
        self.is_enabled_or(id, self.default_enabled)
    }

    /// Like [`is_enabled`](Self::is_enabled) with an explicit fallback for unknown ids
    pub fn is_enabled_or(&self, id: &str, default: bool) -> bool {
        if let Some(enabled) = self.refactorings.get(id) {
            return *enabled;
        }
        if let Some(severity) = self.rules.get(id) {
            return *severity != RuleSeverity::Off;
        }
        default
    }

    /// Logical OR over `ids`
    pub fn is_any_enabled(&self, ids: &[&str]) -> bool {
        ids.iter().any(|id| self.is_enabled(id))
    }

    pub fn is_diagnostic_enabled(&self, descriptor: &DiagnosticDescriptor) -> bool {
        self.severity_for(descriptor).is_some()
    }

    /// Effective severity of a descriptor, `None` when it is disabled
    pub fn severity_for(&self, descriptor: &DiagnosticDescriptor) -> Option<Severity> {
        match self.rules.get(descriptor.id) {
            Some(severity) => severity.to_severity(),
            None => descriptor
                .enabled_by_default
                .then_some(descriptor.default_severity),
        }
    }

    /// Install the process-wide default; fails if one is already installed
    pub fn install_global(enablement: Arc<Enablement>) -> Result<()> {
        GLOBAL
            .set(enablement)
            .map_err(|_| RefitError::config_error("Global enablement is already installed"))
    }

    /// The installed process-wide default, or everything enabled
    pub fn global() -> Arc<Enablement> {
        GLOBAL
            .get_or_init(|| Arc::new(Enablement::all_enabled()))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULE: DiagnosticDescriptor = DiagnosticDescriptor {
        id: "style/rule",
        title: "Rule",
        message_format: "Rule",
        category: "style",
        default_severity: Severity::Info,
        enabled_by_default: true,
    };

    const OPT_IN: DiagnosticDescriptor = DiagnosticDescriptor {
        id: "style/opt-in",
        enabled_by_default: false,
        ..RULE
    };

    #[test]
    fn test_refactoring_lookup() {
        let gate = Enablement::all_enabled().with_refactoring("swap", false);
        assert!(!gate.is_enabled("swap"));
        assert!(gate.is_enabled("anything-else"));
        assert!(gate.is_any_enabled(&["swap", "anything-else"]));
        assert!(!gate.is_any_enabled(&["swap"]));
        assert!(!gate.is_any_enabled(&[]));
    }

    #[test]
    fn test_default_can_be_flipped() {
        let gate = Enablement::all_enabled()
            .with_default(false)
            .with_refactoring("on", true);
        assert!(gate.is_enabled("on"));
        assert!(!gate.is_enabled("off"));
        assert!(gate.is_enabled_or("off", true));
    }

    #[test]
    fn test_severity_overrides() {
        let gate = Enablement::all_enabled()
            .with_rule("style/rule", RuleSeverity::Error)
            .with_rule("style/opt-in", RuleSeverity::Warn);
        assert_eq!(gate.severity_for(&RULE), Some(Severity::Error));
        assert_eq!(gate.severity_for(&OPT_IN), Some(Severity::Warning));

        let defaults = Enablement::all_enabled();
        assert_eq!(defaults.severity_for(&RULE), Some(Severity::Info));
        assert_eq!(defaults.severity_for(&OPT_IN), None);

        let off = Enablement::all_enabled().with_rule("style/rule", RuleSeverity::Off);
        assert!(!off.is_diagnostic_enabled(&RULE));
        assert!(!off.is_enabled("style/rule"));
    }

    #[test]
    fn test_from_config() {
        let mut config = RefitConfig::default();
        config.refactorings.insert("x".to_string(), false);
        config.rules.insert("style/rule".to_string(), RuleSeverity::Off);
        let gate = Enablement::from_config(&config);
        assert!(!gate.is_enabled("x"));
        assert!(!gate.is_diagnostic_enabled(&RULE));
    }
}
