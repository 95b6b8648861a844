//! Structural equivalence of syntax subtrees
//!
//! Two subtrees are equivalent when they have the same node shape and the same
//! significant tokens; trivia is ignored.

use rowan::NodeOrToken;

use super::{SyntaxKind, SyntaxNode};

#[derive(Debug, PartialEq, Eq)]
enum Shape {
    Node(SyntaxKind),
    Token(SyntaxKind, String),
}

fn shape(node: &SyntaxNode) -> impl Iterator<Item = Shape> + use<> {
    node.descendants_with_tokens().filter_map(|element| match element {
        NodeOrToken::Node(n) => Some(Shape::Node(n.kind())),
        NodeOrToken::Token(t) if t.kind().is_trivia() => None,
        NodeOrToken::Token(t) => Some(Shape::Token(t.kind(), t.text().to_string())),
    })
}

/// Whether `left` and `right` are the same code modulo trivia
pub fn are_equivalent(left: &SyntaxNode, right: &SyntaxNode) -> bool {
    shape(left).eq(shape(right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn exprs(source: &str) -> Vec<SyntaxNode> {
        parse(source)
            .syntax()
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::ExprStmt)
            .filter_map(|n| n.first_child())
            .collect()
    }

    #[test]
    fn test_trivia_is_ignored() {
        let nodes = exprs("a.B(c);\na . B( /* x */ c );");
        assert!(are_equivalent(&nodes[0], &nodes[1]));
    }

    #[test]
    fn test_different_names_differ() {
        let nodes = exprs("a.B(c);\na.B(d);");
        assert!(!are_equivalent(&nodes[0], &nodes[1]));
    }

    #[test]
    fn test_parentheses_matter() {
        let nodes = exprs("x;\n(x);");
        assert!(!are_equivalent(&nodes[0], &nodes[1]));
    }
}
