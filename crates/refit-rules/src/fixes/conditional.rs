//! Fixes for the conditional expression checks

use refit_core::syntax::ast::{AstNode, ConditionalExpr};
use refit_core::{
    ActionSet, CodeAction, CodeFixProvider, EquivalenceKey, FixContext, NodeTarget, Result,
    find_node,
};

use crate::catalog::{PARENTHESIZE_CONDITION_ID, SIMPLIFY_CONDITIONAL_ID, USE_COALESCE_ID};
use crate::recipe::Recipe;

pub struct ConditionalExpressionFixProvider;

impl CodeFixProvider for ConditionalExpressionFixProvider {
    fn id(&self) -> &'static str {
        "conditional-expression"
    }

    fn fixable_diagnostic_ids(&self) -> &'static [&'static str] {
        &[PARENTHESIZE_CONDITION_ID, USE_COALESCE_ID, SIMPLIFY_CONDITIONAL_ID]
    }

    fn register_code_fixes(&self, cx: &FixContext<'_>, actions: &mut ActionSet) -> Result<()> {
        for diagnostic in cx.diagnostics() {
            let Some(conditional) = find_node(cx.root(), diagnostic.range())
                .and_then(|node| node.ancestors().find_map(ConditionalExpr::cast))
            else {
                continue;
            };
            let target = NodeTarget::new(cx.snapshot(), conditional.syntax());
            let (title, recipe) = match diagnostic.id.as_str() {
                PARENTHESIZE_CONDITION_ID => (
                    "Wrap condition in parentheses",
                    Recipe::ParenthesizeCondition { target },
                ),
                USE_COALESCE_ID => ("Use coalesce expression", Recipe::UseCoalesce { target }),
                SIMPLIFY_CONDITIONAL_ID => (
                    "Simplify conditional expression",
                    Recipe::SimplifyConditional { target },
                ),
                _ => continue,
            };
            actions.register(CodeAction::fix(
                title,
                EquivalenceKey::for_fix(&diagnostic.id, self.id()),
                recipe,
            ));
        }
        Ok(())
    }
}
