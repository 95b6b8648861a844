//! Rewrite recipes behind every built-in action
//!
//! A recipe captures only targets and small bits of text at registration.
//! Semantic preconditions are checked again in [`Rewrite::apply`] against
//! the snapshot being rewritten, so an action computed earlier cannot produce
//! an edit its provider would no longer offer.

use refit_core::rewrite::{Replacement, Rewritten, replace, replace_text, replace_with_sequence};
use refit_core::syntax::ast::{
    AssignExpr, AstNode, ConditionalExpr, Expr, IfStmt, LocalDeclStmt, MethodDecl, Stmt,
};
use refit_core::syntax::equivalence::are_equivalent;
use refit_core::syntax::trivia::{
    indentation, set_leading_trivia, set_trailing_trivia, trailing_trivia, with_trivia_from,
    without_trivia,
};
use refit_core::syntax::{GreenNode, NodeOrToken, SyntaxKind, SyntaxNode, factory};
use refit_core::{
    ApplyContext, NodeTarget, RefitError, Result, Rewrite, Semantics, Snapshot, TextTarget,
    TypeDescriptor,
};

/// Conversion method appended by the call-to-method refactoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionMethod {
    ToString,
    ToList,
    ToArray,
}

impl ConversionMethod {
    pub fn name(self) -> &'static str {
        match self {
            ConversionMethod::ToString => "ToString",
            ConversionMethod::ToList => "ToList",
            ConversionMethod::ToArray => "ToArray",
        }
    }

    /// Whether the method comes from `System.Linq.Enumerable`
    pub fn needs_linq(self) -> bool {
        !matches!(self, ConversionMethod::ToString)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipe {
    /// `return expr;` or `yield return expr;` to `expr;`
    StripWrapperKeyword { target: NodeTarget },
    /// `a ? b : c` to `(a) ? b : c`
    ParenthesizeCondition { target: NodeTarget },
    /// `x != null ? x : y` to `x ?? y`
    UseCoalesce { target: NodeTarget },
    /// `c ? true : false` to `c`
    SimplifyConditional { target: NodeTarget },
    /// Insert `if (expr != null) { }` after a statement
    InsertNullGuard { target: NodeTarget, expression: String },
    /// Append `return default;` to a method body
    AddDefaultReturn { target: NodeTarget },
    SwapIfElse { target: NodeTarget },
    IfElseToConditional { target: NodeTarget },
    IfElseToReturn { target: NodeTarget },
    /// Cast an initializer to the declared type
    AddCast { target: NodeTarget, type_name: String },
    CallMethod { target: NodeTarget, method: ConversionMethod },
    /// Plain text replacement of a range
    ReplaceText { target: TextTarget, text: String },
}

impl Rewrite for Recipe {
    fn apply(&self, snapshot: &Snapshot, cx: &ApplyContext<'_>) -> Result<Rewritten> {
        match self {
            Recipe::StripWrapperKeyword { target } => strip_wrapper_keyword(snapshot, target, cx),
            Recipe::ParenthesizeCondition { target } => parenthesize_condition(snapshot, target),
            Recipe::UseCoalesce { target } => use_coalesce(snapshot, target),
            Recipe::SimplifyConditional { target } => simplify_conditional(snapshot, target),
            Recipe::InsertNullGuard { target, expression } => {
                insert_null_guard(snapshot, target, expression, cx)
            }
            Recipe::AddDefaultReturn { target } => add_default_return(snapshot, target, cx),
            Recipe::SwapIfElse { target } => swap_if_else(snapshot, target),
            Recipe::IfElseToConditional { target } => if_else_to_conditional(snapshot, target),
            Recipe::IfElseToReturn { target } => if_else_to_return(snapshot, target),
            Recipe::AddCast { target, type_name } => add_cast(snapshot, target, type_name, cx),
            Recipe::CallMethod { target, method } => call_method(snapshot, target, *method, cx),
            Recipe::ReplaceText { target, text } => replace_text(snapshot, target, text),
        }
    }
}

fn resolve<N: AstNode>(snapshot: &Snapshot, target: &NodeTarget) -> Result<N> {
    let node = target.resolve(snapshot)?;
    let kind = node.kind();
    N::cast(node).ok_or_else(|| RefitError::unexpected_kind("recipe", kind))
}

fn precondition(message: &str) -> RefitError {
    RefitError::precondition_failed(message)
}

fn bare(node: &SyntaxNode) -> GreenNode {
    without_trivia(&node.green())
}

/// Expressions that never need parentheses as an operand
pub(crate) fn is_primary(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Name(_) | Expr::Literal(_) | Expr::Call(_) | Expr::Member(_) | Expr::Paren(_)
    )
}

/// Trivia-free operand, parenthesized when it is not primary
pub(crate) fn operand(expr: &Expr) -> GreenNode {
    let green = bare(expr.syntax());
    if is_primary(expr) {
        green
    } else {
        factory::paren_expr(&green)
    }
}

/// Trivia-free operand, parenthesized only when it binds looser than `??`
fn loose_operand(expr: &Expr) -> GreenNode {
    let green = bare(expr.syntax());
    match expr {
        Expr::Conditional(_) | Expr::Assign(_) => factory::paren_expr(&green),
        _ => green,
    }
}

/// Logical negation with the obvious simplifications
pub(crate) fn negate(expr: &Expr) -> GreenNode {
    let expr = expr.clone().unwrap_parens();
    match &expr {
        Expr::Prefix(prefix) if prefix.op_kind() == Some(SyntaxKind::Bang) => {
            if let Some(inner) = prefix.operand() {
                return bare(inner.clone().unwrap_parens().syntax());
            }
        }
        Expr::Binary(binary) => {
            let swapped = match binary.op_kind() {
                Some(SyntaxKind::EqEq) => Some((SyntaxKind::BangEq, "!=")),
                Some(SyntaxKind::BangEq) => Some((SyntaxKind::EqEq, "==")),
                _ => None,
            };
            if let (Some((op, text)), Some(lhs), Some(rhs)) = (swapped, binary.lhs(), binary.rhs()) {
                return factory::binary_expr(&bare(lhs.syntax()), op, text, &bare(rhs.syntax()));
            }
        }
        Expr::Literal(_) => match expr.literal_kind() {
            Some(SyntaxKind::TrueKw) => return bool_literal(false),
            Some(SyntaxKind::FalseKw) => return bool_literal(true),
            _ => {}
        },
        _ => {}
    }
    factory::not_expr(&operand(&expr))
}

fn bool_literal(value: bool) -> GreenNode {
    let (kind, text) = if value {
        (SyntaxKind::TrueKw, "true")
    } else {
        (SyntaxKind::FalseKw, "false")
    };
    factory::node(
        SyntaxKind::LiteralExpr,
        vec![NodeOrToken::Token(factory::token(kind, text))],
    )
}

fn strip_wrapper_keyword(snapshot: &Snapshot, target: &NodeTarget, cx: &ApplyContext<'_>) -> Result<Rewritten> {
    let stmt: Stmt = resolve(snapshot, target)?;
    let expr = match &stmt {
        Stmt::Return(ret) => ret.expr(),
        Stmt::YieldReturn(ret) => ret.expr(),
        other => return Err(RefitError::unexpected_kind("recipe", other.syntax().kind())),
    }
    .ok_or_else(|| precondition("statement has no expression"))?;

    let is_void = cx
        .semantics
        .type_of(expr.syntax())?
        .is_some_and(|ty| ty.is_void_like());
    if !is_void {
        return Err(precondition("expression is not void"));
    }

    let replacement = factory::expr_stmt(&expr.syntax().green());
    replace(snapshot, target, Replacement::new(replacement))
}

/// Condition of a conditional, parsed from a resolved target
fn conditional_parts(conditional: &ConditionalExpr) -> Result<(Expr, Expr, Expr)> {
    match (
        conditional.condition(),
        conditional.when_true(),
        conditional.when_false(),
    ) {
        (Some(condition), Some(when_true), Some(when_false)) => Ok((condition, when_true, when_false)),
        _ => Err(precondition("incomplete conditional expression")),
    }
}

fn parenthesize_condition(snapshot: &Snapshot, target: &NodeTarget) -> Result<Rewritten> {
    let conditional: ConditionalExpr = resolve(snapshot, target)?;
    let condition = conditional
        .condition()
        .ok_or_else(|| precondition("conditional expression has no condition"))?;
    if matches!(condition, Expr::Paren(_)) {
        return Err(precondition("condition is already parenthesized"));
    }
    let wrapped = factory::paren_expr(&bare(condition.syntax()));
    let condition_target = NodeTarget::new(snapshot, condition.syntax());
    replace(snapshot, &condition_target, Replacement::new(wrapped))
}

/// `(checked expression, fallback)` when the conditional is a null-check select
pub(crate) fn coalesce_operands(conditional: &ConditionalExpr) -> Option<(Expr, Expr)> {
    let condition = conditional.condition()?.unwrap_parens();
    let Expr::Binary(binary) = condition else {
        return None;
    };
    let (lhs, rhs) = (binary.lhs()?, binary.rhs()?);
    let checked = if rhs.is_null_literal() {
        lhs
    } else if lhs.is_null_literal() {
        rhs
    } else {
        return None;
    };

    let (kept, fallback) = match binary.op_kind()? {
        SyntaxKind::BangEq => (conditional.when_true()?, conditional.when_false()?),
        SyntaxKind::EqEq => (conditional.when_false()?, conditional.when_true()?),
        _ => return None,
    };
    are_equivalent(checked.syntax(), kept.unwrap_parens().syntax()).then_some((checked, fallback))
}

fn use_coalesce(snapshot: &Snapshot, target: &NodeTarget) -> Result<Rewritten> {
    let conditional: ConditionalExpr = resolve(snapshot, target)?;
    let (checked, fallback) =
        coalesce_operands(&conditional).ok_or_else(|| precondition("not a null-check conditional"))?;
    let coalesce = factory::coalesce_expr(&operand(&checked), &loose_operand(&fallback));
    replace(snapshot, target, Replacement::new(coalesce))
}

/// `Some(true)` for `c ? true : false`, `Some(false)` for `c ? false : true`
pub(crate) fn boolean_select(conditional: &ConditionalExpr) -> Option<bool> {
    let when_true = conditional.when_true()?.unwrap_parens().literal_kind()?;
    let when_false = conditional.when_false()?.unwrap_parens().literal_kind()?;
    match (when_true, when_false) {
        (SyntaxKind::TrueKw, SyntaxKind::FalseKw) => Some(true),
        (SyntaxKind::FalseKw, SyntaxKind::TrueKw) => Some(false),
        _ => None,
    }
}

fn simplify_conditional(snapshot: &Snapshot, target: &NodeTarget) -> Result<Rewritten> {
    let conditional: ConditionalExpr = resolve(snapshot, target)?;
    let keep = boolean_select(&conditional).ok_or_else(|| precondition("branches are not opposite booleans"))?;
    let (condition, _, _) = conditional_parts(&conditional)?;
    let result = if keep {
        bare(condition.unwrap_parens().syntax())
    } else {
        negate(&condition)
    };
    replace(snapshot, target, Replacement::new(result))
}

/// Whether `stmt` is already `if (expr != null) ...` for the same expression
pub(crate) fn is_null_guard_for(stmt: &Stmt, expression: &str) -> bool {
    let Stmt::If(if_stmt) = stmt else {
        return false;
    };
    let Some(Expr::Binary(binary)) = if_stmt.condition().map(Expr::unwrap_parens) else {
        return false;
    };
    if binary.op_kind() != Some(SyntaxKind::BangEq) {
        return false;
    }
    let (Some(lhs), Some(rhs)) = (binary.lhs(), binary.rhs()) else {
        return false;
    };
    let checked = if rhs.is_null_literal() {
        lhs
    } else if lhs.is_null_literal() {
        rhs
    } else {
        return false;
    };
    refit_core::syntax::ast::significant_text(checked.syntax()) == expression
}

fn insert_null_guard(
    snapshot: &Snapshot,
    target: &NodeTarget,
    expression: &str,
    cx: &ApplyContext<'_>,
) -> Result<Rewritten> {
    let stmt: Stmt = resolve(snapshot, target)?;
    let node = stmt.syntax();
    let already_guarded = node
        .next_sibling()
        .and_then(Stmt::cast)
        .is_some_and(|next| is_null_guard_for(&next, expression));
    if already_guarded {
        return Err(precondition("statement is already followed by a null check"));
    }

    let checked = factory::parse_expr(expression).ok_or_else(|| precondition("expression does not parse"))?;
    let indent = indentation(node);
    let newline = cx.formatting.newline.as_str();
    let guard = factory::if_not_null(&checked, &indent, newline);

    let mut leading = Vec::new();
    let ends_line = trailing_trivia(node)
        .last()
        .is_some_and(|t| t.kind() == SyntaxKind::Newline);
    if !ends_line {
        leading.push(factory::newline(newline));
    }
    if cx.formatting.blank_line_before_null_check {
        leading.push(factory::newline(newline));
    }
    if !indent.is_empty() {
        leading.push(factory::whitespace(&indent));
    }
    let guard = set_leading_trivia(&guard, &leading);
    let guard = set_trailing_trivia(&guard, &[factory::newline(newline)]);

    replace_with_sequence(
        snapshot,
        target,
        vec![
            Replacement::new(node.green().into_owned())
                .keep_trivia()
                .unformatted(),
            Replacement::new(guard).keep_trivia(),
        ],
    )
}

/// Source text of the default value of `ty`, if it has a usable one
pub(crate) fn default_value(ty: &TypeDescriptor) -> Option<String> {
    if ty.is_error_type() || ty.is_void_like() {
        return None;
    }
    let value = if ty.is_reference_type() {
        "null".to_string()
    } else if ty.is_bool() {
        "false".to_string()
    } else if ty.is_numeric() {
        "0".to_string()
    } else {
        format!("default({})", ty.name)
    };
    Some(value)
}

/// Default value for a method's return type, or `None` when no return should be added
pub(crate) fn default_return_value(method: &MethodDecl, semantics: Semantics<'_>) -> Result<Option<String>> {
    let Some(ty) = semantics.type_of(method.syntax())? else {
        return Ok(None);
    };
    if ty.implements_enumerable() {
        return Ok(None);
    }
    Ok(default_value(&ty))
}

fn add_default_return(snapshot: &Snapshot, target: &NodeTarget, cx: &ApplyContext<'_>) -> Result<Rewritten> {
    let method: MethodDecl = resolve(snapshot, target)?;
    let body = method.body().ok_or_else(|| precondition("method has no block body"))?;
    let value = default_return_value(&method, cx.semantics)?
        .ok_or_else(|| precondition("return type has no default value"))?;
    let value = factory::parse_expr(&value).ok_or_else(|| precondition("default value does not parse"))?;
    let r_brace = body.r_brace().ok_or_else(|| precondition("block is not closed"))?;

    let newline = cx.formatting.newline.as_str();
    let brace_indent = r_brace
        .prev_token()
        .filter(|t| t.kind() == SyntaxKind::Whitespace)
        .map(|t| t.text().to_string())
        .unwrap_or_default();
    let indent = match body.statements().last() {
        Some(last) => indentation(last.syntax()),
        None => format!("{brace_indent}{}", cx.formatting.indent_unit),
    };

    let mut leading = Vec::new();
    let after_newline = r_brace
        .prev_token()
        .and_then(|t| {
            if t.kind() == SyntaxKind::Whitespace {
                t.prev_token()
            } else {
                Some(t)
            }
        })
        .is_some_and(|t| t.kind() == SyntaxKind::Newline);
    if !after_newline {
        leading.push(factory::newline(newline));
    }
    leading.push(factory::whitespace(&indent));

    let stmt = factory::return_stmt(&value);
    let stmt = set_leading_trivia(&stmt, &leading);
    let stmt = set_trailing_trivia(&stmt, &[factory::newline(newline)]);

    // insert before the whitespace that indents the closing brace
    let brace_index = r_brace.index();
    let index = match r_brace.prev_token() {
        Some(t) if t.kind() == SyntaxKind::Whitespace && t.parent().as_ref() == Some(body.syntax()) => {
            t.index()
        }
        _ => brace_index,
    };
    let block = body.syntax().green().insert_child(index, NodeOrToken::Node(stmt));
    let body_target = NodeTarget::new(snapshot, body.syntax());
    replace(snapshot, &body_target, Replacement::new(block).keep_trivia())
}

/// `if (c) A else B` where `B` is not another `if`
pub(crate) struct IfElse {
    pub(crate) if_stmt: IfStmt,
    pub(crate) condition: Expr,
    pub(crate) then_branch: Stmt,
    pub(crate) else_branch: Stmt,
}

pub(crate) fn if_else_parts(if_stmt: &IfStmt) -> Option<IfElse> {
    let condition = if_stmt.condition()?;
    let then_branch = if_stmt.then_branch()?;
    let else_branch = if_stmt.else_clause()?.statement()?;
    if matches!(else_branch, Stmt::If(_)) {
        return None;
    }
    Some(IfElse {
        if_stmt: if_stmt.clone(),
        condition,
        then_branch,
        else_branch,
    })
}

fn resolve_if_else(snapshot: &Snapshot, target: &NodeTarget) -> Result<IfElse> {
    let if_stmt: IfStmt = resolve(snapshot, target)?;
    if_else_parts(&if_stmt).ok_or_else(|| precondition("not an if-else statement"))
}

fn swap_if_else(snapshot: &Snapshot, target: &NodeTarget) -> Result<Rewritten> {
    let parts = resolve_if_else(snapshot, target)?;
    let if_node = parts.if_stmt.syntax();
    let else_clause = parts
        .if_stmt
        .else_clause()
        .ok_or_else(|| precondition("not an if-else statement"))?;

    let condition = with_trivia_from(&negate(&parts.condition), parts.condition.syntax());
    let new_then = with_trivia_from(&bare(parts.else_branch.syntax()), parts.then_branch.syntax());
    let new_else = with_trivia_from(&bare(parts.then_branch.syntax()), parts.else_branch.syntax());

    let else_green = else_clause
        .syntax()
        .green()
        .replace_child(parts.else_branch.syntax().index(), NodeOrToken::Node(new_else));
    let rebuilt = if_node
        .green()
        .replace_child(parts.condition.syntax().index(), NodeOrToken::Node(condition))
        .replace_child(parts.then_branch.syntax().index(), NodeOrToken::Node(new_then))
        .replace_child(else_clause.syntax().index(), NodeOrToken::Node(else_green));

    replace(snapshot, target, Replacement::new(rebuilt).keep_trivia())
}

/// The statement a branch reduces to: itself, or the only statement of a block
pub(crate) fn single_statement(stmt: &Stmt) -> Option<Stmt> {
    match stmt {
        Stmt::Block(block) => {
            let mut statements = block.statements();
            let first = statements.next()?;
            statements.next().is_none().then_some(first)
        }
        other => Some(other.clone()),
    }
}

fn returned(stmt: &Stmt) -> Option<Expr> {
    match single_statement(stmt)? {
        Stmt::Return(ret) => ret.expr(),
        _ => None,
    }
}

fn assigned(stmt: &Stmt) -> Option<AssignExpr> {
    match single_statement(stmt)? {
        Stmt::Expr(expr_stmt) => match expr_stmt.expr()? {
            Expr::Assign(assign) => Some(assign),
            _ => None,
        },
        _ => None,
    }
}

/// Shape of an if-else that collapses into one conditional expression
pub(crate) enum ConditionalShape {
    Return(Expr, Expr),
    Assign(Expr, Expr, Expr),
}

pub(crate) fn conditional_shape(parts: &IfElse) -> Option<ConditionalShape> {
    if let (Some(a), Some(b)) = (returned(&parts.then_branch), returned(&parts.else_branch)) {
        return Some(ConditionalShape::Return(a, b));
    }
    let (a, b) = (assigned(&parts.then_branch)?, assigned(&parts.else_branch)?);
    let (lhs_a, lhs_b) = (a.lhs()?, b.lhs()?);
    if !are_equivalent(lhs_a.syntax(), lhs_b.syntax()) {
        return None;
    }
    Some(ConditionalShape::Assign(lhs_a, a.rhs()?, b.rhs()?))
}

fn if_else_to_conditional(snapshot: &Snapshot, target: &NodeTarget) -> Result<Rewritten> {
    let parts = resolve_if_else(snapshot, target)?;
    let shape = conditional_shape(&parts).ok_or_else(|| precondition("branches do not select a value"))?;
    let condition = loose_operand(&parts.condition);

    let stmt = match shape {
        ConditionalShape::Return(a, b) => {
            let select = factory::conditional_expr(&condition, &loose_operand(&a), &loose_operand(&b));
            factory::return_stmt(&select)
        }
        ConditionalShape::Assign(lhs, a, b) => {
            let select = factory::conditional_expr(&condition, &loose_operand(&a), &loose_operand(&b));
            factory::expr_stmt(&factory::assign_expr(&bare(lhs.syntax()), &select))
        }
    };
    replace(snapshot, target, Replacement::new(stmt))
}

/// `Some(true)` when the branches return `true`/`false`, `Some(false)` when reversed
pub(crate) fn boolean_returns(parts: &IfElse) -> Option<bool> {
    let a = returned(&parts.then_branch)?.unwrap_parens().literal_kind()?;
    let b = returned(&parts.else_branch)?.unwrap_parens().literal_kind()?;
    match (a, b) {
        (SyntaxKind::TrueKw, SyntaxKind::FalseKw) => Some(true),
        (SyntaxKind::FalseKw, SyntaxKind::TrueKw) => Some(false),
        _ => None,
    }
}

fn if_else_to_return(snapshot: &Snapshot, target: &NodeTarget) -> Result<Rewritten> {
    let parts = resolve_if_else(snapshot, target)?;
    let keep = boolean_returns(&parts).ok_or_else(|| precondition("branches do not return booleans"))?;
    let condition = &parts.condition;
    let value = if keep {
        bare(condition.clone().unwrap_parens().syntax())
    } else {
        negate(condition)
    };
    replace(snapshot, target, Replacement::new(factory::return_stmt(&value)))
}

/// Declared type of the local an initializer belongs to
pub(crate) fn declared_type_of_initializer(expr: &Expr, semantics: Semantics<'_>) -> Result<Option<TypeDescriptor>> {
    let Some(decl) = expr.syntax().ancestors().find_map(LocalDeclStmt::cast) else {
        return Ok(None);
    };
    match decl.type_ref() {
        Some(type_ref) => semantics.type_of(type_ref.syntax()),
        None => Ok(None),
    }
}

fn add_cast(snapshot: &Snapshot, target: &NodeTarget, type_name: &str, cx: &ApplyContext<'_>) -> Result<Rewritten> {
    let expr: Expr = resolve(snapshot, target)?;
    let declared = declared_type_of_initializer(&expr, cx.semantics)?
        .ok_or_else(|| precondition("initializer has no declared type"))?;
    if !cx.semantics.is_explicitly_convertible(expr.syntax(), &declared)? {
        return Err(precondition("no explicit conversion exists"));
    }
    let type_ref = factory::parse_type(type_name).ok_or_else(|| precondition("type does not parse"))?;
    let cast = factory::cast_expr(&type_ref, &operand(&expr));
    replace(snapshot, target, Replacement::new(cast))
}

fn call_method(
    snapshot: &Snapshot,
    target: &NodeTarget,
    method: ConversionMethod,
    cx: &ApplyContext<'_>,
) -> Result<Rewritten> {
    let expr: Expr = resolve(snapshot, target)?;
    let resolved = cx.semantics.type_of(expr.syntax())?;
    if resolved.is_none_or(|ty| ty.is_error_type()) {
        return Err(precondition("expression has no type"));
    }
    if method.needs_linq() && cx.semantics.lookup_well_known_type("System.Linq.Enumerable")?.is_none() {
        return Err(precondition("System.Linq.Enumerable is not available"));
    }
    let call = factory::method_call(&operand(&expr), method.name(), &[]);
    replace(snapshot, target, Replacement::new(call))
}

#[cfg(test)]
mod tests {
    use super::*;
    use refit_core::{CancellationToken, DeclarationOracle, FormattingOptions};

    fn apply(source: &str, recipe: impl Fn(&Snapshot) -> Recipe) -> Result<String> {
        let snapshot = Snapshot::parse(source);
        let oracle = DeclarationOracle::new(&snapshot);
        let cancel = CancellationToken::new();
        let formatting = FormattingOptions::default();
        let cx = ApplyContext {
            semantics: Semantics::new(&oracle, &cancel),
            formatting: &formatting,
        };
        let recipe = recipe(&snapshot);
        recipe
            .apply(&snapshot, &cx)
            .map(|rewritten| rewritten.snapshot.text().to_string())
    }

    fn target_of(snapshot: &Snapshot, kind: SyntaxKind) -> NodeTarget {
        let node = snapshot
            .root()
            .descendants()
            .find(|n| n.kind() == kind)
            .unwrap();
        NodeTarget::new(snapshot, &node)
    }

    fn negated(source: &str) -> String {
        let root = refit_core::syntax::parse(&format!("{source};")).syntax();
        let expr = root.descendants().find_map(Expr::cast).unwrap();
        SyntaxNode::new_root(negate(&expr)).text().to_string()
    }

    #[test]
    fn test_negate() {
        assert_eq!(negated("!x"), "x");
        assert_eq!(negated("!(a && b)"), "a && b");
        assert_eq!(negated("a == b"), "a != b");
        assert_eq!(negated("(a != null)"), "a == null");
        assert_eq!(negated("a && b"), "!(a && b)");
        assert_eq!(negated("Ready()"), "!Ready()");
        assert_eq!(negated("true"), "false");
    }

    #[test]
    fn test_use_coalesce_both_polarities() {
        let out = apply("r = x != null ? x : y;", |s| Recipe::UseCoalesce {
            target: target_of(s, SyntaxKind::ConditionalExpr),
        });
        assert_eq!(out.unwrap(), "r = x ?? y;");

        let out = apply("r = null == x ? a ? b : c : x;", |s| Recipe::UseCoalesce {
            target: target_of(s, SyntaxKind::ConditionalExpr),
        });
        assert_eq!(out.unwrap(), "r = x ?? (a ? b : c);");
    }

    #[test]
    fn test_use_coalesce_sees_through_parenthesized_branch() {
        let out = apply("return (x != null) ? (x) : y;", |s| Recipe::UseCoalesce {
            target: target_of(s, SyntaxKind::ConditionalExpr),
        });
        assert_eq!(out.unwrap(), "return x ?? y;");
    }

    #[test]
    fn test_use_coalesce_rechecks_shape() {
        let err = apply("r = x != null ? z : y;", |s| Recipe::UseCoalesce {
            target: target_of(s, SyntaxKind::ConditionalExpr),
        })
        .unwrap_err();
        assert!(matches!(err, RefitError::PreconditionFailed { .. }));
    }

    #[test]
    fn test_simplify_conditional() {
        let keep = apply("r = (a == b) ? true : false;", |s| Recipe::SimplifyConditional {
            target: target_of(s, SyntaxKind::ConditionalExpr),
        });
        assert_eq!(keep.unwrap(), "r = a == b;");

        let flip = apply("r = Ready() ? false : true;", |s| Recipe::SimplifyConditional {
            target: target_of(s, SyntaxKind::ConditionalExpr),
        });
        assert_eq!(flip.unwrap(), "r = !Ready();");
    }

    #[test]
    fn test_parenthesize_condition_keeps_spacing() {
        let out = apply("r = a == b ? c : d;", |s| Recipe::ParenthesizeCondition {
            target: target_of(s, SyntaxKind::ConditionalExpr),
        });
        assert_eq!(out.unwrap(), "r = (a == b) ? c : d;");
    }

    #[test]
    fn test_parenthesize_condition_of_incomplete_conditional() {
        let out = apply("r = a ? : ;", |s| Recipe::ParenthesizeCondition {
            target: target_of(s, SyntaxKind::ConditionalExpr),
        });
        assert_eq!(out.unwrap(), "r = (a) ? : ;");
    }

    #[test]
    fn test_swap_if_else() {
        let source = "void M()\n{\n    if (ok)\n    {\n        A();\n    }\n    else\n    {\n        B();\n    }\n}\n";
        let out = apply(source, |s| Recipe::SwapIfElse {
            target: target_of(s, SyntaxKind::IfStmt),
        });
        let expected = "void M()\n{\n    if (!ok)\n    {\n        B();\n    }\n    else\n    {\n        A();\n    }\n}\n";
        assert_eq!(out.unwrap(), expected);
    }

    #[test]
    fn test_if_else_to_conditional() {
        let source = "void M()\n{\n    if (ok)\n        x = 1;\n    else\n        x = 2;\n}\n";
        let out = apply(source, |s| Recipe::IfElseToConditional {
            target: target_of(s, SyntaxKind::IfStmt),
        });
        assert_eq!(out.unwrap(), "void M()\n{\n    x = ok ? 1 : 2;\n}\n");

        let source = "int M()\n{\n    if (ok) { return 1; } else { return 2; }\n}\n";
        let out = apply(source, |s| Recipe::IfElseToConditional {
            target: target_of(s, SyntaxKind::IfStmt),
        });
        assert_eq!(out.unwrap(), "int M()\n{\n    return ok ? 1 : 2;\n}\n");
    }

    #[test]
    fn test_if_else_to_return() {
        let source = "bool M()\n{\n    if (a == b)\n        return false;\n    else\n        return true;\n}\n";
        let out = apply(source, |s| Recipe::IfElseToReturn {
            target: target_of(s, SyntaxKind::IfStmt),
        });
        assert_eq!(out.unwrap(), "bool M()\n{\n    return a != b;\n}\n");
    }

    #[test]
    fn test_add_default_return() {
        let source = "class C\n{\n    string Name()\n    {\n        Log();\n    }\n    void Log() { }\n}\n";
        let out = apply(source, |s| Recipe::AddDefaultReturn {
            target: target_of(s, SyntaxKind::MethodDecl),
        });
        let expected = "class C\n{\n    string Name()\n    {\n        Log();\n        return null;\n    }\n    void Log() { }\n}\n";
        assert_eq!(out.unwrap(), expected);
    }

    #[test]
    fn test_default_values() {
        assert_eq!(default_value(&TypeDescriptor::reference("string")).as_deref(), Some("null"));
        assert_eq!(default_value(&TypeDescriptor::value("bool")).as_deref(), Some("false"));
        assert_eq!(default_value(&TypeDescriptor::value("double")).as_deref(), Some("0"));
        assert_eq!(default_value(&TypeDescriptor::value("char")).as_deref(), Some("default(char)"));
        assert_eq!(default_value(&TypeDescriptor::error("Missing")), None);
        assert_eq!(default_value(&TypeDescriptor::void()), None);
    }

    #[test]
    fn test_add_cast_rechecks_conversion() {
        let source = "void M(object o)\n{\n    int n = o;\n    string s = 5;\n}\n";
        let out = apply(source, |s| {
            let init = s
                .root()
                .descendants()
                .find(|n| n.kind() == SyntaxKind::NameExpr)
                .unwrap();
            Recipe::AddCast {
                target: NodeTarget::new(s, &init),
                type_name: "int".to_string(),
            }
        });
        assert_eq!(out.unwrap(), "void M(object o)\n{\n    int n = (int)o;\n    string s = 5;\n}\n");

        let err = apply(source, |s| Recipe::AddCast {
            target: target_of(s, SyntaxKind::LiteralExpr),
            type_name: "string".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, RefitError::PreconditionFailed { .. }));
    }

    #[test]
    fn test_stale_recipe_is_rejected() {
        let stale = Snapshot::parse("r = x != null ? x : y;");
        let target = target_of(&stale, SyntaxKind::ConditionalExpr);
        let err = apply("r = x != null ? x : y;", |_| Recipe::UseCoalesce {
            target: target.clone(),
        })
        .unwrap_err();
        assert!(matches!(err, RefitError::StaleTarget { .. }));
    }
}
