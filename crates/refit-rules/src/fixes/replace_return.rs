//! Replace `return expr;` / `yield return expr;` with `expr;`

use refit_core::syntax::SyntaxKind;
use refit_core::{
    ActionSet, CodeAction, CodeFixProvider, EquivalenceKey, FixContext, NodeTarget, RefitError,
    Result, resolve_statement,
};
use tracing::debug;

use crate::catalog::RETURN_VOID_ID;
use crate::recipe::Recipe;

pub struct ReplaceReturnFixProvider;

impl CodeFixProvider for ReplaceReturnFixProvider {
    fn id(&self) -> &'static str {
        "replace-return"
    }

    fn fixable_diagnostic_ids(&self) -> &'static [&'static str] {
        &[RETURN_VOID_ID]
    }

    fn register_code_fixes(&self, cx: &FixContext<'_>, actions: &mut ActionSet) -> Result<()> {
        for diagnostic in cx.diagnostics() {
            let Some(stmt) = resolve_statement(cx.root(), diagnostic.range()) else {
                debug!("No statement at {:?} for '{}'", diagnostic.range(), diagnostic.id);
                continue;
            };
            let title = match stmt.kind() {
                SyntaxKind::ReturnStmt => "Remove 'return'",
                SyntaxKind::YieldReturnStmt => "Remove 'yield return'",
                kind => return Err(RefitError::unexpected_kind(self.id(), kind)),
            };
            actions.register(CodeAction::fix(
                title,
                EquivalenceKey::for_fix(&diagnostic.id, self.id()),
                Recipe::StripWrapperKeyword {
                    target: NodeTarget::new(cx.snapshot(), &stmt),
                },
            ));
        }
        Ok(())
    }
}
