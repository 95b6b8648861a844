//! Check a freshly assigned reference for null

use refit_core::syntax::ast::{AstNode, Expr, Stmt, significant_text};
use refit_core::syntax::{SyntaxKind, SyntaxNode};
use refit_core::{
    ActionSet, CodeAction, EquivalenceKey, NodeTarget, RefactoringContext, RefactoringProvider,
    Result, resolve_statement,
};

use crate::catalog::CHECK_EXPRESSION_FOR_NULL;
use crate::recipe::{Recipe, is_null_guard_for};

pub struct CheckExpressionForNullProvider;

impl RefactoringProvider for CheckExpressionForNullProvider {
    fn id(&self) -> &'static str {
        "check-expression-for-null"
    }

    fn refactoring_ids(&self) -> &'static [&'static str] {
        &[CHECK_EXPRESSION_FOR_NULL]
    }

    fn compute_refactorings(&self, cx: &RefactoringContext<'_>, actions: &mut ActionSet) -> Result<()> {
        let Some(node) = resolve_statement(cx.root(), cx.span()) else {
            return Ok(());
        };
        if node.parent().is_none_or(|p| !matches!(p.kind(), SyntaxKind::Block | SyntaxKind::Root)) {
            return Ok(());
        }
        let Some(stmt) = Stmt::cast(node) else {
            return Ok(());
        };
        let Some((checked, typed)) = checked_expression(&stmt) else {
            return Ok(());
        };

        let is_reference = cx
            .semantics()
            .type_of(&typed)?
            .is_some_and(|ty| ty.is_reference_type());
        if !is_reference {
            return Ok(());
        }
        let already_guarded = stmt
            .syntax()
            .next_sibling()
            .and_then(Stmt::cast)
            .is_some_and(|next| is_null_guard_for(&next, &checked));
        if already_guarded {
            return Ok(());
        }

        actions.register(CodeAction::refactoring(
            format!("Check '{checked}' for null"),
            EquivalenceKey::new(CHECK_EXPRESSION_FOR_NULL),
            Recipe::InsertNullGuard {
                target: NodeTarget::new(cx.snapshot(), stmt.syntax()),
                expression: checked,
            },
        ));
        Ok(())
    }
}

/// Expression text to check and the node whose type decides applicability
fn checked_expression(stmt: &Stmt) -> Option<(String, SyntaxNode)> {
    match stmt {
        Stmt::LocalDecl(decl) => {
            let mut declarators = decl.declarators();
            let declarator = declarators.next()?;
            if declarators.next().is_some() {
                return None;
            }
            declarator.initializer()?;
            let name = declarator.name()?.text().to_string();
            Some((name, declarator.syntax().clone()))
        }
        Stmt::Expr(expr_stmt) => match expr_stmt.expr()? {
            Expr::Assign(assign) => {
                let lhs = assign.lhs()?;
                if !matches!(lhs, Expr::Name(_) | Expr::Member(_)) {
                    return None;
                }
                Some((significant_text(lhs.syntax()), lhs.syntax().clone()))
            }
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refit_core::{ActionRegistry, CancellationToken, CodeAction, Session};
    use refit_core::syntax::TextRange;

    fn titles(source: &str, at: &str) -> Vec<String> {
        actions(source, at).iter().map(|a| a.title().to_string()).collect()
    }

    fn actions(source: &str, at: &str) -> Vec<CodeAction> {
        let session = Session::new(source);
        let mut registry = ActionRegistry::new();
        registry.add_refactoring_provider(CheckExpressionForNullProvider);
        let offset = source.find(at).unwrap() as u32;
        session
            .actions_at(
                &registry,
                TextRange::empty(offset.into()),
                &[],
                &CancellationToken::new(),
            )
            .unwrap()
    }

    const SOURCE: &str = "class C\n{\n    void M(C other)\n    {\n        string s = GetName();\n        int n = 1;\n        other = Make();\n        string t = GetName();\n        if (t != null)\n        {\n        }\n    }\n\n    string GetName() { return \"\"; }\n    C Make() { return null; }\n}\n";

    #[test]
    fn test_offered_for_reference_locals_and_assignments() {
        assert_eq!(titles(SOURCE, "s = GetName"), vec!["Check 's' for null"]);
        assert_eq!(titles(SOURCE, "other = Make"), vec!["Check 'other' for null"]);
    }

    #[test]
    fn test_not_offered_for_values_or_guarded_locals() {
        assert!(titles(SOURCE, "n = 1").is_empty());
        assert!(titles(SOURCE, "t = GetName").is_empty());
    }

    #[test]
    fn test_comparison_without_null_is_not_a_guard() {
        let source = "class C\n{\n    void M(string a)\n    {\n        string s = GetName();\n        if (a != s)\n        {\n        }\n    }\n\n    string GetName() { return \"\"; }\n}\n";
        assert_eq!(titles(source, "s = GetName"), vec!["Check 's' for null"]);
    }
}
