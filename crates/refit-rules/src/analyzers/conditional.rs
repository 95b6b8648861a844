//! Conditional expression checks
//!
//! Three independent checks on every `c ? a : b`:
//! - the condition is not parenthesized
//! - the expression is a null-check select that `??` expresses directly
//! - the branches are opposite boolean literals

use refit_core::syntax::ast::{AstNode, ConditionalExpr, Expr};
use refit_core::syntax::trivia::{contains_directives, node_span, span_trivia_is_whitespace};
use refit_core::syntax::SyntaxKind;
use refit_core::{Analyzer, AnalysisContext, DiagnosticDescriptor, NodeContext, Reporter, Result};

use crate::catalog::{PARENTHESIZE_CONDITION, SIMPLIFY_CONDITIONAL, USE_COALESCE};
use crate::recipe::{boolean_select, coalesce_operands};

pub struct ConditionalExpressionAnalyzer;

impl Analyzer for ConditionalExpressionAnalyzer {
    fn name(&self) -> &'static str {
        "conditional-expression"
    }

    fn supported_diagnostics(&self) -> Vec<DiagnosticDescriptor> {
        vec![PARENTHESIZE_CONDITION, USE_COALESCE, SIMPLIFY_CONDITIONAL]
    }

    fn initialize(&self, context: &mut AnalysisContext) {
        context.register(&[SyntaxKind::ConditionalExpr], analyze_conditional);
    }
}

fn analyze_conditional(cx: &NodeContext<'_>, reporter: &mut Reporter<'_>) -> Result<()> {
    let Some(conditional) = ConditionalExpr::cast(cx.node().clone()) else {
        return Ok(());
    };
    let Some(condition) = conditional.condition() else {
        return Ok(());
    };
    let node = conditional.syntax();
    let span = node_span(node);

    if !matches!(condition, Expr::Paren(_)) {
        reporter.report(&PARENTHESIZE_CONDITION, node_span(condition.syntax()), Vec::new());
    }

    if coalesce_operands(&conditional).is_some() && span_trivia_is_whitespace(node) {
        reporter.report(&USE_COALESCE, span, Vec::new());
    }

    cx.cancellation().check()?;
    if boolean_select(&conditional).is_some() && !contains_directives(node, span) {
        reporter.report(&SIMPLIFY_CONDITIONAL, span, Vec::new());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use refit_core::{
        AnalysisOptions, AnalyzerRegistry, CancellationToken, DeclarationOracle, Diagnostic,
        Enablement, Snapshot,
    };

    fn diagnostics(source: &str) -> Vec<Diagnostic> {
        let snapshot = Snapshot::parse(source);
        let oracle = DeclarationOracle::new(&snapshot);
        let mut registry = AnalyzerRegistry::new();
        registry.add(&ConditionalExpressionAnalyzer);
        registry
            .analyze(
                &snapshot,
                &oracle,
                &Enablement::all_enabled(),
                &AnalysisOptions::default(),
                &CancellationToken::new(),
            )
            .unwrap()
    }

    fn ids(source: &str) -> Vec<String> {
        diagnostics(source).into_iter().map(|d| d.id).collect()
    }

    #[test]
    fn test_parenthesize_condition() {
        let found = diagnostics("r = a == b ? c : d;");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, PARENTHESIZE_CONDITION.id);
        assert_eq!(u32::from(found[0].range().start()), 4);
        assert_eq!(u32::from(found[0].range().end()), 10);
        assert!(ids("r = (a == b) ? c : d;").is_empty());
    }

    #[test]
    fn test_use_coalesce() {
        assert_eq!(ids("r = (x != null) ? x : y;"), vec![USE_COALESCE.id]);
        assert_eq!(ids("r = (x == null) ? y : x;"), vec![USE_COALESCE.id]);
        assert_eq!(ids("r = (null != x.Name) ? x.Name : y;"), vec![USE_COALESCE.id]);
        assert_eq!(ids("return (x != null) ? (x) : y;"), vec![USE_COALESCE.id]);
        assert!(ids("r = (x != null) ? y : x;").is_empty());
        assert!(ids("r = (x != null) ? x /*cmt*/ : y;").is_empty());
    }

    #[test]
    fn test_simplify_conditional() {
        assert_eq!(ids("r = (a) ? true : false;"), vec![SIMPLIFY_CONDITIONAL.id]);
        assert_eq!(ids("r = (a) ? false : true;"), vec![SIMPLIFY_CONDITIONAL.id]);
        assert!(ids("r = (a) ? true : true;").is_empty());
        assert!(ids("r = (a) ? true\n#if DEBUG\n: false;\n#endif\n").is_empty());
    }
}
