//! `return`/`yield return` of an expression that produces no value

use refit_core::syntax::ast::{AstNode, Expr, Stmt};
use refit_core::syntax::trivia::{contains_directives, node_span};
use refit_core::syntax::{SyntaxKind, SyntaxToken, TextRange};
use refit_core::{Analyzer, AnalysisContext, DiagnosticDescriptor, NodeContext, Reporter, Result};

use crate::catalog::{RETURN_VOID, RETURN_VOID_FADE_OUT};

pub struct ReturnVoidExpressionAnalyzer;

impl Analyzer for ReturnVoidExpressionAnalyzer {
    fn name(&self) -> &'static str {
        "return-void-expression"
    }

    fn supported_diagnostics(&self) -> Vec<DiagnosticDescriptor> {
        vec![RETURN_VOID, RETURN_VOID_FADE_OUT]
    }

    fn initialize(&self, context: &mut AnalysisContext) {
        context.register(
            &[SyntaxKind::ReturnStmt, SyntaxKind::YieldReturnStmt],
            analyze_return,
        );
    }
}

/// Keyword tokens and expression of a wrapper statement
fn wrapper_parts(stmt: &Stmt) -> Option<(Vec<SyntaxToken>, Expr, &'static str)> {
    match stmt {
        Stmt::Return(ret) => Some((vec![ret.return_kw()?], ret.expr()?, "return")),
        Stmt::YieldReturn(ret) => Some((
            vec![ret.yield_kw()?, ret.return_kw()?],
            ret.expr()?,
            "yield return",
        )),
        _ => None,
    }
}

fn analyze_return(cx: &NodeContext<'_>, reporter: &mut Reporter<'_>) -> Result<()> {
    let Some(stmt) = Stmt::cast(cx.node().clone()) else {
        return Ok(());
    };
    let Some((keywords, expr, label)) = wrapper_parts(&stmt) else {
        return Ok(());
    };

    let is_void = cx
        .semantics()
        .type_of(expr.syntax())?
        .is_some_and(|ty| ty.is_void_like());
    if !is_void {
        return Ok(());
    }

    let Some(first) = keywords.first() else {
        return Ok(());
    };
    let between = TextRange::new(first.text_range().start(), node_span(expr.syntax()).start());
    if contains_directives(stmt.syntax(), between) {
        return Ok(());
    }

    reporter.report(&RETURN_VOID, node_span(stmt.syntax()), vec![label.to_string()]);
    for keyword in &keywords {
        reporter.report(&RETURN_VOID_FADE_OUT, keyword.text_range(), Vec::new());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use refit_core::{
        AnalysisOptions, AnalyzerRegistry, CancellationToken, DeclarationOracle, Diagnostic,
        Enablement, RuleSeverity, Severity, Snapshot,
    };

    fn run(source: &str, enablement: &Enablement) -> Vec<Diagnostic> {
        let snapshot = Snapshot::parse(source);
        let oracle = DeclarationOracle::new(&snapshot);
        let mut registry = AnalyzerRegistry::new();
        registry.add(&ReturnVoidExpressionAnalyzer);
        registry
            .analyze(
                &snapshot,
                &oracle,
                enablement,
                &AnalysisOptions::default(),
                &CancellationToken::new(),
            )
            .unwrap()
    }

    const SOURCE: &str = "class C\n{\n    void M()\n    {\n        return Log();\n    }\n\n    IEnumerable<int> Items()\n    {\n        yield return Log();\n        yield return Count();\n    }\n\n    void Log() { }\n    int Count() { return 1; }\n}\n";

    #[test]
    fn test_reports_statement_and_fade_out() {
        let found = run(SOURCE, &Enablement::all_enabled());
        let summary: Vec<(&str, Severity, &str)> = found
            .iter()
            .map(|d| (d.id.as_str(), d.severity, d.message.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (RETURN_VOID.id, Severity::Warning, "Replace 'return' statement with expression statement"),
                (RETURN_VOID_FADE_OUT.id, Severity::Hidden, ""),
                (RETURN_VOID.id, Severity::Warning, "Replace 'yield return' statement with expression statement"),
                (RETURN_VOID_FADE_OUT.id, Severity::Hidden, ""),
                (RETURN_VOID_FADE_OUT.id, Severity::Hidden, ""),
            ]
        );
        let text = &SOURCE[usize::from(found[0].range().start())..usize::from(found[0].range().end())];
        assert_eq!(text, "return Log();");
    }

    #[test]
    fn test_directive_between_keyword_and_expression() {
        let source = "void M()\n{\n    return\n#if DEBUG\n        Log();\n#endif\n}\nvoid Log() { }\n";
        assert!(run(source, &Enablement::all_enabled()).is_empty());
    }

    #[test]
    fn test_disabled_rule_reports_nothing() {
        let enablement = Enablement::all_enabled()
            .with_rule(RETURN_VOID.id, RuleSeverity::Off)
            .with_rule(RETURN_VOID_FADE_OUT.id, RuleSeverity::Off);
        assert!(run(SOURCE, &enablement).is_empty());
    }
}
