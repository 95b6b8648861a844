//! Add `return <default>;` for "not all code paths return a value"

use refit_core::syntax::ast::{AstNode, MethodDecl};
use refit_core::{
    ActionSet, CodeAction, CodeFixProvider, EquivalenceKey, FixContext, NodeTarget, Result,
    find_node,
};
use tracing::debug;

use crate::catalog::{ADD_DEFAULT_RETURN, NOT_ALL_PATHS_RETURN_ID};
use crate::recipe::{Recipe, default_return_value};

pub struct AddDefaultReturnFixProvider;

impl CodeFixProvider for AddDefaultReturnFixProvider {
    fn id(&self) -> &'static str {
        "add-default-return"
    }

    fn fixable_diagnostic_ids(&self) -> &'static [&'static str] {
        &[NOT_ALL_PATHS_RETURN_ID]
    }

    fn register_code_fixes(&self, cx: &FixContext<'_>, actions: &mut ActionSet) -> Result<()> {
        if !cx.enablement().is_enabled(ADD_DEFAULT_RETURN) {
            return Ok(());
        }
        for diagnostic in cx.diagnostics() {
            let Some(method) = find_node(cx.root(), diagnostic.range())
                .and_then(|node| node.ancestors().find_map(MethodDecl::cast))
            else {
                continue;
            };
            if method.body().is_none() {
                continue;
            }
            let Some(value) = default_return_value(&method, cx.semantics())? else {
                debug!("No default value for the return type of {:?}", method.name());
                continue;
            };
            actions.register(CodeAction::fix(
                format!("Add return statement that returns '{value}'"),
                EquivalenceKey::for_fix(&diagnostic.id, self.id()),
                Recipe::AddDefaultReturn {
                    target: NodeTarget::new(cx.snapshot(), method.syntax()),
                },
            ));
        }
        Ok(())
    }
}
