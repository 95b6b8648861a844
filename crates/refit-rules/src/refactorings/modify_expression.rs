//! Make a local initializer match the declared type

use refit_core::syntax::ast::{AstNode, LocalDeclStmt, VarDeclarator};
use refit_core::{
    ActionSet, CodeAction, EquivalenceKey, NodeTarget, RefactoringContext, RefactoringProvider,
    Result, TypeDescriptor, find_node,
};

use crate::catalog::{ADD_CAST_EXPRESSION, CALL_TO_METHOD};
use crate::recipe::{ConversionMethod, Recipe, declared_type_of_initializer};

pub struct ModifyExpressionProvider;

impl RefactoringProvider for ModifyExpressionProvider {
    fn id(&self) -> &'static str {
        "modify-expression"
    }

    fn refactoring_ids(&self) -> &'static [&'static str] {
        &[ADD_CAST_EXPRESSION, CALL_TO_METHOD]
    }

    fn compute_refactorings(&self, cx: &RefactoringContext<'_>, actions: &mut ActionSet) -> Result<()> {
        let Some(declarator) = find_node(cx.root(), cx.span())
            .and_then(|node| node.ancestors().find_map(VarDeclarator::cast))
        else {
            return Ok(());
        };
        let Some(initializer) = declarator.initializer() else {
            return Ok(());
        };
        let semantics = cx.semantics();
        let Some(declared) = declared_type_of_initializer(&initializer, semantics)? else {
            return Ok(());
        };
        let Some(actual) = semantics.type_of(initializer.syntax())? else {
            return Ok(());
        };
        if declared.is_error_type() || actual.is_error_type() || declared.name == actual.name {
            return Ok(());
        }
        let target = NodeTarget::new(cx.snapshot(), initializer.syntax());

        if cx.is_enabled(CALL_TO_METHOD) {
            if let Some(method) = conversion_method(&declared, &actual) {
                let available =
                    !method.needs_linq() || semantics.lookup_well_known_type("System.Linq.Enumerable")?.is_some();
                if available {
                    actions.register(CodeAction::refactoring(
                        format!("Call '{}'", method.name()),
                        EquivalenceKey::new(format!("{CALL_TO_METHOD}.{}", method.name())),
                        Recipe::CallMethod {
                            target: target.clone(),
                            method,
                        },
                    ));
                }
            }
        }

        if cx.is_enabled(ADD_CAST_EXPRESSION) && semantics.is_explicitly_convertible(initializer.syntax(), &declared)? {
            let type_name = declarator
                .syntax()
                .ancestors()
                .find_map(LocalDeclStmt::cast)
                .and_then(|decl| decl.type_ref())
                .map(|type_ref| type_ref.text())
                .unwrap_or_else(|| declared.name.clone());
            actions.register(CodeAction::refactoring(
                format!("Cast to '{type_name}'"),
                EquivalenceKey::new(ADD_CAST_EXPRESSION),
                Recipe::AddCast { target, type_name },
            ));
        }
        Ok(())
    }
}

/// Method that converts a value of `actual` into `declared`
fn conversion_method(declared: &TypeDescriptor, actual: &TypeDescriptor) -> Option<ConversionMethod> {
    if declared.is_string() {
        return Some(ConversionMethod::ToString);
    }
    if !actual.implements_enumerable() {
        return None;
    }
    if declared.is_array {
        Some(ConversionMethod::ToArray)
    } else if declared.constructed_from.as_deref() == Some("List<T>") {
        Some(ConversionMethod::ToList)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refit_core::syntax::TextRange;
    use refit_core::{ActionRegistry, CancellationToken, CodeAction, Session};

    const SOURCE: &str = "class C\n{\n    void M(object o, List<int> list)\n    {\n        int n = o;\n        string s = n;\n        int[] a = list;\n        List<int> l = Items();\n        int same = 1;\n    }\n\n    IEnumerable<int> Items() { yield break; }\n}\n";

    fn actions_at(session: &Session, at: &str) -> Vec<CodeAction> {
        let mut registry = ActionRegistry::new();
        registry.add_refactoring_provider(ModifyExpressionProvider);
        let offset = session.source_text().find(at).unwrap() as u32;
        session
            .actions_at(
                &registry,
                TextRange::empty(offset.into()),
                &[],
                &CancellationToken::new(),
            )
            .unwrap()
    }

    fn apply(at: &str, title: &str) -> String {
        let mut session = Session::new(SOURCE);
        let action = actions_at(&session, at)
            .into_iter()
            .find(|a| a.title() == title)
            .unwrap();
        session.apply(&action, &CancellationToken::new()).unwrap();
        session.source_text().to_string()
    }

    fn titles(at: &str) -> Vec<String> {
        let session = Session::new(SOURCE);
        actions_at(&session, at).iter().map(|a| a.title().to_string()).collect()
    }

    #[test]
    fn test_offered_actions() {
        assert_eq!(titles("n = o"), vec!["Cast to 'int'"]);
        assert_eq!(titles("s = n"), vec!["Call 'ToString'"]);
        assert_eq!(titles("a = list"), vec!["Call 'ToArray'"]);
        assert_eq!(titles("l = Items"), vec!["Call 'ToList'", "Cast to 'List<int>'"]);
        assert!(titles("same = 1").is_empty());
    }

    #[test]
    fn test_applied_edits() {
        assert!(apply("n = o", "Cast to 'int'").contains("int n = (int)o;"));
        assert!(apply("s = n", "Call 'ToString'").contains("string s = n.ToString();"));
        assert!(apply("l = Items", "Call 'ToList'").contains("List<int> l = Items().ToList();"));
    }
}
