//! Green-tree construction helpers for rewrite recipes
//!
//! Composite builders take trivia-free operands and produce trivia-free
//! results; whitespace they introduce is attached as trailing trivia of the
//! preceding token, the same way the parser attaches it. Small fragments that
//! are easiest to describe as text (`default(T)`, a type name) go through the
//! parser via [`parse_expr`] and [`parse_type`].

use rowan::{GreenNode, GreenNodeData, GreenToken, NodeOrToken};

use super::trivia::{set_trailing_trivia, without_trivia};
use super::{GreenElement, SyntaxKind, SyntaxNode, parse};

pub fn token(kind: SyntaxKind, text: &str) -> GreenToken {
    GreenToken::new(kind.into(), text)
}

pub fn whitespace(text: &str) -> GreenToken {
    token(SyntaxKind::Whitespace, text)
}

pub fn newline(text: &str) -> GreenToken {
    token(SyntaxKind::Newline, text)
}

pub fn node(kind: SyntaxKind, children: Vec<GreenElement>) -> GreenNode {
    GreenNode::new(kind.into(), children)
}

fn tok(kind: SyntaxKind, text: &str) -> GreenElement {
    NodeOrToken::Token(token(kind, text))
}

fn space() -> GreenElement {
    NodeOrToken::Token(whitespace(" "))
}

fn child(green: &GreenNodeData) -> GreenElement {
    NodeOrToken::Node(green.to_owned())
}

fn spaced(green: &GreenNodeData) -> GreenElement {
    NodeOrToken::Node(set_trailing_trivia(green, &[whitespace(" ")]))
}

/// Parse a standalone expression, rejecting text with syntax errors
pub fn parse_expr(text: &str) -> Option<GreenNode> {
    let parsed = parse(&format!("{text};"));
    if !parsed.errors().is_empty() {
        return None;
    }
    let root = parsed.syntax();
    let stmt = root.children().find(|n| n.kind() == SyntaxKind::ExprStmt)?;
    let expr = stmt.children().find(|n| n.kind().is_expression())?;
    Some(without_trivia(&expr.green()))
}

/// Parse a standalone type reference (`int`, `List<string>`, `Foo[]`)
pub fn parse_type(text: &str) -> Option<GreenNode> {
    let parsed = parse(&format!("{text} __t;"));
    if !parsed.errors().is_empty() {
        return None;
    }
    let root: SyntaxNode = parsed.syntax();
    let decl = root.children().find(|n| n.kind() == SyntaxKind::LocalDeclStmt)?;
    let type_ref = decl.children().find(|n| n.kind() == SyntaxKind::TypeRef)?;
    Some(without_trivia(&type_ref.green()))
}

pub fn name_expr(name: &str) -> GreenNode {
    node(SyntaxKind::NameExpr, vec![tok(SyntaxKind::Ident, name)])
}

/// `expr;`
pub fn expr_stmt(expr: &GreenNodeData) -> GreenNode {
    node(
        SyntaxKind::ExprStmt,
        vec![child(expr), tok(SyntaxKind::Semicolon, ";")],
    )
}

/// `return expr;`
pub fn return_stmt(expr: &GreenNodeData) -> GreenNode {
    node(
        SyntaxKind::ReturnStmt,
        vec![
            tok(SyntaxKind::ReturnKw, "return"),
            space(),
            child(expr),
            tok(SyntaxKind::Semicolon, ";"),
        ],
    )
}

/// `(expr)`
pub fn paren_expr(expr: &GreenNodeData) -> GreenNode {
    node(
        SyntaxKind::ParenExpr,
        vec![
            tok(SyntaxKind::LParen, "("),
            child(expr),
            tok(SyntaxKind::RParen, ")"),
        ],
    )
}

/// `lhs <op> rhs`
pub fn binary_expr(lhs: &GreenNodeData, op: SyntaxKind, op_text: &str, rhs: &GreenNodeData) -> GreenNode {
    node(
        SyntaxKind::BinaryExpr,
        vec![spaced(lhs), tok(op, op_text), space(), child(rhs)],
    )
}

/// `lhs = rhs`
pub fn assign_expr(lhs: &GreenNodeData, rhs: &GreenNodeData) -> GreenNode {
    node(
        SyntaxKind::AssignExpr,
        vec![spaced(lhs), tok(SyntaxKind::Eq, "="), space(), child(rhs)],
    )
}

/// `lhs ?? rhs`
pub fn coalesce_expr(lhs: &GreenNodeData, rhs: &GreenNodeData) -> GreenNode {
    binary_expr(lhs, SyntaxKind::QuestionQuestion, "??", rhs)
}

/// `!operand`
pub fn not_expr(operand: &GreenNodeData) -> GreenNode {
    node(
        SyntaxKind::PrefixExpr,
        vec![tok(SyntaxKind::Bang, "!"), child(operand)],
    )
}

/// `cond ? when_true : when_false`
pub fn conditional_expr(
    condition: &GreenNodeData,
    when_true: &GreenNodeData,
    when_false: &GreenNodeData,
) -> GreenNode {
    node(
        SyntaxKind::ConditionalExpr,
        vec![
            spaced(condition),
            tok(SyntaxKind::Question, "?"),
            space(),
            spaced(when_true),
            tok(SyntaxKind::Colon, ":"),
            space(),
            child(when_false),
        ],
    )
}

/// `(Type)expr`
pub fn cast_expr(type_ref: &GreenNodeData, expr: &GreenNodeData) -> GreenNode {
    node(
        SyntaxKind::CastExpr,
        vec![
            tok(SyntaxKind::LParen, "("),
            child(type_ref),
            tok(SyntaxKind::RParen, ")"),
            child(expr),
        ],
    )
}

fn arg_list(args: &[&GreenNodeData]) -> GreenNode {
    let mut children = vec![tok(SyntaxKind::LParen, "(")];
    for (index, arg) in args.iter().enumerate() {
        if index > 0 {
            children.push(tok(SyntaxKind::Comma, ","));
            children.push(space());
        }
        children.push(child(arg));
    }
    children.push(tok(SyntaxKind::RParen, ")"));
    node(SyntaxKind::ArgList, children)
}

/// `receiver.Method(args)`
pub fn method_call(receiver: &GreenNodeData, method: &str, args: &[&GreenNodeData]) -> GreenNode {
    let member = node(
        SyntaxKind::MemberExpr,
        vec![
            child(receiver),
            tok(SyntaxKind::Dot, "."),
            tok(SyntaxKind::Ident, method),
        ],
    );
    node(
        SyntaxKind::CallExpr,
        vec![NodeOrToken::Node(member), NodeOrToken::Node(arg_list(args))],
    )
}

/// Null guard block without outer trivia:
///
/// ```text
/// if (expr != null)
/// {indent}{
/// {indent}}
/// ```
pub fn if_not_null(expr: &GreenNodeData, indent: &str, newline_text: &str) -> GreenNode {
    let null = node(SyntaxKind::LiteralExpr, vec![tok(SyntaxKind::NullKw, "null")]);
    let condition = binary_expr(expr, SyntaxKind::BangEq, "!=", &null);

    let mut block = Vec::new();
    if !indent.is_empty() {
        block.push(NodeOrToken::Token(whitespace(indent)));
    }
    block.push(tok(SyntaxKind::LBrace, "{"));
    block.push(NodeOrToken::Token(newline(newline_text)));
    if !indent.is_empty() {
        block.push(NodeOrToken::Token(whitespace(indent)));
    }
    block.push(tok(SyntaxKind::RBrace, "}"));

    node(
        SyntaxKind::IfStmt,
        vec![
            tok(SyntaxKind::IfKw, "if"),
            space(),
            tok(SyntaxKind::LParen, "("),
            NodeOrToken::Node(condition),
            tok(SyntaxKind::RParen, ")"),
            NodeOrToken::Token(newline(newline_text)),
            NodeOrToken::Node(node(SyntaxKind::Block, block)),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(green: GreenNode) -> String {
        SyntaxNode::new_root(green).text().to_string()
    }

    #[test]
    fn test_parse_expr_strips_trivia() {
        let green = parse_expr("  default(int) ").unwrap();
        assert_eq!(text(green), "default(int)");
        assert!(parse_expr("a +").is_none());
    }

    #[test]
    fn test_parse_type() {
        let green = parse_type("List<string>").unwrap();
        assert_eq!(green.kind(), rowan::SyntaxKind::from(SyntaxKind::TypeRef));
        assert_eq!(text(green), "List<string>");
    }

    #[test]
    fn test_composites() {
        let x = name_expr("x");
        let y = name_expr("y");
        assert_eq!(text(coalesce_expr(&x, &y)), "x ?? y");
        assert_eq!(text(not_expr(&paren_expr(&x))), "!(x)");
        assert_eq!(text(conditional_expr(&x, &y, &x)), "x ? y : x");
        assert_eq!(text(return_stmt(&x)), "return x;");
        assert_eq!(text(expr_stmt(&assign_expr(&x, &y))), "x = y;");
        assert_eq!(text(method_call(&x, "ToString", &[])), "x.ToString()");
        let ty = parse_type("int").unwrap();
        assert_eq!(text(cast_expr(&ty, &y)), "(int)y");
    }

    #[test]
    fn test_if_not_null_layout() {
        let guard = if_not_null(&name_expr("s"), "    ", "\n");
        assert_eq!(text(guard), "if (s != null)\n    {\n    }");
    }
}
