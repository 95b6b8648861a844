//! Text span to node resolution

use rowan::{TextRange, TokenAtOffset};

use crate::syntax::{SyntaxNode, SyntaxToken};

/// Innermost node covering `span`
///
/// A zero-width span on the boundary between two tokens resolves through the
/// token that starts there. Spans reaching past the end of the tree yield
/// `None`.
pub fn find_node(root: &SyntaxNode, span: TextRange) -> Option<SyntaxNode> {
    if !root.text_range().contains_range(span) {
        return None;
    }

    if span.is_empty() {
        let token = token_at(root, span)?;
        return token.parent();
    }

    match root.covering_element(span) {
        rowan::NodeOrToken::Node(node) => Some(node),
        rowan::NodeOrToken::Token(token) => token.parent(),
    }
}

fn token_at(root: &SyntaxNode, span: TextRange) -> Option<SyntaxToken> {
    match root.token_at_offset(span.start()) {
        TokenAtOffset::None => None,
        TokenAtOffset::Single(token) => Some(token),
        TokenAtOffset::Between(_, right) => Some(right),
    }
}

/// Nearest statement that is `find_node`'s result or one of its ancestors
pub fn resolve_statement(root: &SyntaxNode, span: TextRange) -> Option<SyntaxNode> {
    find_node(root, span)?
        .ancestors()
        .find(|node| node.kind().is_statement())
}
