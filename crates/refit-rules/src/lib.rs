//! REFIT Rules
//!
//! Built-in analyzers, code fix providers and refactoring providers for the
//! REFIT engine, plus the rewrite recipes they share.
//!
//! ```rust,ignore
//! use refit_core::{AnalysisOptions, CancellationToken, Session};
//!
//! let session = Session::new("void M() { return Log(); } void Log() { }");
//! let diagnostics = session.analyze(
//!     &refit_rules::analyzer_registry(),
//!     &AnalysisOptions::default(),
//!     &CancellationToken::new(),
//! )?;
//! ```

pub mod analyzers;
pub mod catalog;
pub mod fixes;
pub mod recipe;
pub mod refactorings;

use refit_core::{ActionRegistry, Analyzer, AnalyzerRegistry, DiagnosticDescriptor};

pub use catalog::{REFACTORINGS, RefactoringInfo};
pub use recipe::{ConversionMethod, Recipe};

/// Every built-in analyzer, in registration order
pub fn builtin_analyzers() -> Vec<Box<dyn Analyzer>> {
    vec![
        Box::new(analyzers::ConditionalExpressionAnalyzer),
        Box::new(analyzers::ReturnVoidExpressionAnalyzer),
    ]
}

/// Registry holding every built-in analyzer
pub fn analyzer_registry() -> AnalyzerRegistry {
    let mut registry = AnalyzerRegistry::new();
    for analyzer in builtin_analyzers() {
        registry.add(analyzer.as_ref());
    }
    registry
}

/// Registry holding every built-in fix and refactoring provider
pub fn action_registry() -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    registry.add_fix_provider(fixes::ReplaceReturnFixProvider);
    registry.add_fix_provider(fixes::ConditionalExpressionFixProvider);
    registry.add_fix_provider(fixes::AddDefaultReturnFixProvider);

    registry.add_refactoring_provider(refactorings::CheckExpressionForNullProvider);
    registry.add_refactoring_provider(refactorings::IfStatementProvider);
    registry.add_refactoring_provider(refactorings::ModifyExpressionProvider);
    registry.add_refactoring_provider(refactorings::FormatSummaryProvider);
    registry
}

/// Descriptors of every built-in analyzer
pub fn descriptors() -> Vec<DiagnosticDescriptor> {
    catalog::all_descriptors()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registries_are_complete() {
        let registry = analyzer_registry();
        assert_eq!(registry.len(), 2);
        let mut ids: Vec<&str> = registry.descriptors().map(|d| d.id).collect();
        ids.sort_unstable();
        let mut expected: Vec<&str> = descriptors().iter().map(|d| d.id).collect();
        expected.sort_unstable();
        assert_eq!(ids, expected);

        let actions = action_registry();
        assert_eq!(actions.fix_providers().count(), 3);
        assert_eq!(actions.refactoring_providers().count(), 4);
    }

    #[test]
    fn test_refactoring_ids_are_listed() {
        let registry = action_registry();
        for provider in registry.refactoring_providers() {
            for id in provider.refactoring_ids() {
                assert!(REFACTORINGS.iter().any(|r| r.id == *id), "{id} not listed");
            }
        }
    }
}
