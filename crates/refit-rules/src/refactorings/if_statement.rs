//! Refactorings of an if-else statement
//!
//! Offered only on the topmost `if` of an `else if` chain, and only while the
//! span lies inside that statement.

use refit_core::syntax::ast::{AstNode, IfStmt};
use refit_core::syntax::trivia::node_span;
use refit_core::{
    ActionSet, CodeAction, EquivalenceKey, NodeTarget, RefactoringContext, RefactoringProvider,
    Result, find_node,
};

use crate::catalog::{REPLACE_IF_ELSE_WITH_CONDITIONAL, REPLACE_IF_WITH_RETURN, SWAP_STATEMENTS_IN_IF_ELSE};
use crate::recipe::{Recipe, boolean_returns, conditional_shape, if_else_parts};

pub struct IfStatementProvider;

impl RefactoringProvider for IfStatementProvider {
    fn id(&self) -> &'static str {
        "if-statement"
    }

    fn refactoring_ids(&self) -> &'static [&'static str] {
        &[
            SWAP_STATEMENTS_IN_IF_ELSE,
            REPLACE_IF_ELSE_WITH_CONDITIONAL,
            REPLACE_IF_WITH_RETURN,
        ]
    }

    fn compute_refactorings(&self, cx: &RefactoringContext<'_>, actions: &mut ActionSet) -> Result<()> {
        let Some(if_stmt) = find_node(cx.root(), cx.span())
            .and_then(|node| node.ancestors().find_map(IfStmt::cast))
            .map(topmost)
        else {
            return Ok(());
        };
        if !node_span(if_stmt.syntax()).contains_range(cx.span()) {
            return Ok(());
        }
        let Some(parts) = if_else_parts(&if_stmt) else {
            return Ok(());
        };
        let target = || NodeTarget::new(cx.snapshot(), if_stmt.syntax());

        if cx.is_enabled(SWAP_STATEMENTS_IN_IF_ELSE) {
            actions.register(CodeAction::refactoring(
                "Swap statements in if-else",
                EquivalenceKey::new(SWAP_STATEMENTS_IN_IF_ELSE),
                Recipe::SwapIfElse { target: target() },
            ));
        }
        if cx.is_enabled(REPLACE_IF_ELSE_WITH_CONDITIONAL) && conditional_shape(&parts).is_some() {
            actions.register(CodeAction::refactoring(
                "Replace if-else with conditional expression",
                EquivalenceKey::new(REPLACE_IF_ELSE_WITH_CONDITIONAL),
                Recipe::IfElseToConditional { target: target() },
            ));
        }
        if cx.is_enabled(REPLACE_IF_WITH_RETURN) && boolean_returns(&parts).is_some() {
            actions.register(CodeAction::refactoring(
                "Replace if-else with return",
                EquivalenceKey::new(REPLACE_IF_WITH_RETURN),
                Recipe::IfElseToReturn { target: target() },
            ));
        }
        Ok(())
    }
}

/// First `if` of the chain `if_stmt` belongs to
fn topmost(if_stmt: IfStmt) -> IfStmt {
    let mut current = if_stmt;
    while current.is_else_if() {
        match current
            .syntax()
            .parent()
            .and_then(|clause| clause.parent())
            .and_then(IfStmt::cast)
        {
            Some(parent) => current = parent,
            None => break,
        }
    }
    current
}
