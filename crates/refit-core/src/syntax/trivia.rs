//! Trivia handling for the REFIT CST
//!
//! Utilities for reading and transplanting trivia (whitespace, newlines,
//! comments, directives). The parser attaches a token's leading and trailing
//! trivia inside the innermost node owning that token, so a node's full span
//! is its `text_range()` and its span is [`node_span`].
//!
//! Green-level helpers ([`set_leading_trivia`], [`set_trailing_trivia`],
//! [`with_trivia_from`]) walk the leftmost or rightmost spine of a subtree and
//! rebuild only the nodes on that spine.

use rowan::{GreenNode, GreenNodeData, GreenToken, NodeOrToken, TextRange};

use super::{GreenElement, SyntaxKind, SyntaxNode, SyntaxToken};

/// A single trivia token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriviaToken {
    pub kind: SyntaxKind,
    pub text: String,
    pub range: TextRange,
}

impl TriviaToken {
    pub fn from_token(token: &SyntaxToken) -> Self {
        Self {
            kind: token.kind(),
            text: token.text().to_string(),
            range: token.text_range(),
        }
    }

    pub fn is_comment(&self) -> bool {
        self.kind.is_comment()
    }

    /// Whitespace or newline
    pub fn is_whitespace(&self) -> bool {
        matches!(self.kind, SyntaxKind::Whitespace | SyntaxKind::Newline)
    }

    pub fn is_newline(&self) -> bool {
        self.kind == SyntaxKind::Newline
    }

    pub fn is_directive(&self) -> bool {
        self.kind == SyntaxKind::Directive
    }
}

/// Trivia of a node split by position
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TriviaInfo {
    /// Before the node's first significant token
    pub leading: Vec<TriviaToken>,
    /// After the node's last significant token
    pub trailing: Vec<TriviaToken>,
    /// Between the first and last significant tokens
    pub internal: Vec<TriviaToken>,
}

impl TriviaInfo {
    pub fn of(node: &SyntaxNode) -> Self {
        let span = node_span(node);
        let mut info = TriviaInfo::default();
        for token in tokens(node).filter(|t| t.kind().is_trivia()) {
            let trivia = TriviaToken::from_token(&token);
            if trivia.range.end() <= span.start() && !span.is_empty() {
                info.leading.push(trivia);
            } else if trivia.range.start() >= span.end() {
                info.trailing.push(trivia);
            } else {
                info.internal.push(trivia);
            }
        }
        info
    }

    pub fn is_empty(&self) -> bool {
        self.leading.is_empty() && self.trailing.is_empty() && self.internal.is_empty()
    }

    pub fn has_comments(&self) -> bool {
        self.all().any(TriviaToken::is_comment)
    }

    pub fn has_directives(&self) -> bool {
        self.all().any(TriviaToken::is_directive)
    }

    fn all(&self) -> impl Iterator<Item = &TriviaToken> {
        self.leading
            .iter()
            .chain(self.internal.iter())
            .chain(self.trailing.iter())
    }
}

fn tokens(node: &SyntaxNode) -> impl Iterator<Item = SyntaxToken> + use<> {
    node.descendants_with_tokens().filter_map(|e| e.into_token())
}

/// Significant range of a node: first to last non-trivia token
///
/// A node with no significant token gets an empty range at its start.
pub fn node_span(node: &SyntaxNode) -> TextRange {
    let mut significant = tokens(node).filter(|t| !t.kind().is_trivia());
    let Some(first) = significant.next() else {
        return TextRange::empty(node.text_range().start());
    };
    let last = significant.last().unwrap_or_else(|| first.clone());
    TextRange::new(first.text_range().start(), last.text_range().end())
}

/// Trivia tokens before the node's first significant token
pub fn leading_trivia(node: &SyntaxNode) -> Vec<SyntaxToken> {
    tokens(node).take_while(|t| t.kind().is_trivia()).collect()
}

/// Trivia tokens after the node's last significant token
pub fn trailing_trivia(node: &SyntaxNode) -> Vec<SyntaxToken> {
    let all: Vec<SyntaxToken> = tokens(node).collect();
    if all.iter().all(|t| t.kind().is_trivia()) {
        return Vec::new();
    }
    let mut trailing: Vec<SyntaxToken> = all
        .into_iter()
        .rev()
        .take_while(|t| t.kind().is_trivia())
        .collect();
    trailing.reverse();
    trailing
}

/// Internal trivia strictly inside the node's span
pub fn trivia_in_span(node: &SyntaxNode) -> Vec<SyntaxToken> {
    let span = node_span(node);
    tokens(node)
        .filter(|t| t.kind().is_trivia() && span.contains_range(t.text_range()))
        .collect()
}

/// Whether every trivia token inside the node's span is whitespace or newline
pub fn span_trivia_is_whitespace(node: &SyntaxNode) -> bool {
    trivia_in_span(node)
        .iter()
        .all(|t| matches!(t.kind(), SyntaxKind::Whitespace | SyntaxKind::Newline))
}

/// Whether a directive token of `node` overlaps `range`
pub fn contains_directives(node: &SyntaxNode, range: TextRange) -> bool {
    tokens(node).any(|t| {
        t.kind() == SyntaxKind::Directive && t.text_range().intersect(range).is_some()
    })
}

/// Whitespace immediately before the node's first significant token on its line
pub fn indentation(node: &SyntaxNode) -> String {
    let leading = leading_trivia(node);
    let mut indent: Vec<&str> = leading
        .iter()
        .rev()
        .take_while(|t| t.kind() == SyntaxKind::Whitespace)
        .map(|t| t.text())
        .collect();
    indent.reverse();
    indent.concat()
}

/// Owned green copy of a red token
pub fn green_token(token: &SyntaxToken) -> GreenToken {
    token.green().to_owned()
}

/// Owned copies of a green node's children
pub fn green_children(node: &GreenNodeData) -> Vec<GreenElement> {
    node.children()
        .map(|child| match child {
            NodeOrToken::Node(n) => NodeOrToken::Node(n.to_owned()),
            NodeOrToken::Token(t) => NodeOrToken::Token(t.to_owned()),
        })
        .collect()
}

fn is_trivia_element(element: &GreenElement) -> bool {
    match element {
        NodeOrToken::Token(t) => SyntaxKind::from_raw(t.kind().0).is_some_and(SyntaxKind::is_trivia),
        NodeOrToken::Node(_) => false,
    }
}

fn has_significant_token(node: &GreenNodeData) -> bool {
    node.children().any(|child| match child {
        NodeOrToken::Token(t) => !SyntaxKind::from_raw(t.kind().0).is_some_and(SyntaxKind::is_trivia),
        NodeOrToken::Node(n) => has_significant_token(n),
    })
}

fn trivia_elements(trivia: &[GreenToken]) -> impl Iterator<Item = GreenElement> + '_ {
    trivia.iter().cloned().map(NodeOrToken::Token)
}

/// Replace the leading trivia of a green subtree
///
/// Existing trivia on the leftmost spine up to the first significant token is
/// removed and `trivia` is inserted directly before that token.
pub fn set_leading_trivia(node: &GreenNodeData, trivia: &[GreenToken]) -> GreenNode {
    let children = green_children(node);
    let first = children.iter().position(|c| !is_trivia_element(c));

    let mut rebuilt: Vec<GreenElement> = Vec::with_capacity(children.len() + trivia.len());
    match first {
        None => rebuilt.extend(trivia_elements(trivia)),
        Some(index) => {
            let mut rest = children.into_iter().skip(index);
            match rest.next() {
                Some(NodeOrToken::Node(child)) if has_significant_token(&child) => {
                    rebuilt.push(NodeOrToken::Node(set_leading_trivia(&child, trivia)));
                }
                Some(element) => {
                    rebuilt.extend(trivia_elements(trivia));
                    rebuilt.push(element);
                }
                None => rebuilt.extend(trivia_elements(trivia)),
            }
            rebuilt.extend(rest);
        }
    }
    GreenNode::new(node.kind(), rebuilt)
}

/// Replace the trailing trivia of a green subtree
pub fn set_trailing_trivia(node: &GreenNodeData, trivia: &[GreenToken]) -> GreenNode {
    let children = green_children(node);
    let last = children.iter().rposition(|c| !is_trivia_element(c));

    let mut rebuilt: Vec<GreenElement> = Vec::with_capacity(children.len() + trivia.len());
    match last {
        None => rebuilt.extend(trivia_elements(trivia)),
        Some(index) => {
            let mut kept = children;
            kept.truncate(index + 1);
            match kept.pop() {
                Some(NodeOrToken::Node(child)) if has_significant_token(&child) => {
                    rebuilt.extend(kept);
                    rebuilt.push(NodeOrToken::Node(set_trailing_trivia(&child, trivia)));
                }
                Some(element) => {
                    rebuilt.extend(kept);
                    rebuilt.push(element);
                    rebuilt.extend(trivia_elements(trivia));
                }
                None => rebuilt.extend(trivia_elements(trivia)),
            }
        }
    }
    GreenNode::new(node.kind(), rebuilt)
}

/// Copy `source`'s leading and trailing trivia onto `replacement`
pub fn with_trivia_from(replacement: &GreenNodeData, source: &SyntaxNode) -> GreenNode {
    let leading: Vec<GreenToken> = leading_trivia(source).iter().map(green_token).collect();
    let trailing: Vec<GreenToken> = trailing_trivia(source).iter().map(green_token).collect();
    let node = set_leading_trivia(replacement, &leading);
    set_trailing_trivia(&node, &trailing)
}

/// Strip outer trivia from both edges of a green subtree
pub fn without_trivia(node: &GreenNodeData) -> GreenNode {
    let node = set_leading_trivia(node, &[]);
    set_trailing_trivia(&node, &[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn first_of(source: &str, kind: SyntaxKind) -> SyntaxNode {
        parse(source)
            .syntax()
            .descendants()
            .find(|n| n.kind() == kind)
            .unwrap()
    }

    #[test]
    fn test_statement_owns_its_trivia() {
        let stmt = first_of("{\n    return Foo(); // done\n}", SyntaxKind::ReturnStmt);
        assert_eq!(stmt.text().to_string(), "    return Foo(); // done\n");

        let leading: String = leading_trivia(&stmt).iter().map(|t| t.text().to_string()).collect();
        let trailing: String = trailing_trivia(&stmt).iter().map(|t| t.text().to_string()).collect();
        assert_eq!(leading, "    ");
        assert_eq!(trailing, " // done\n");
        assert_eq!(indentation(&stmt), "    ");
    }

    #[test]
    fn test_span_excludes_outer_trivia() {
        let source = "  x = 1; // c\n";
        let stmt = first_of(source, SyntaxKind::ExprStmt);
        let span = node_span(&stmt);
        assert_eq!(&source[usize::from(span.start())..usize::from(span.end())], "x = 1;");
        assert_eq!(stmt.text_range(), TextRange::up_to((source.len() as u32).into()));
    }

    #[test]
    fn test_trivia_info_classifies_internal_comment() {
        let node = first_of("a ? b /*c*/ : d;", SyntaxKind::ConditionalExpr);
        let info = TriviaInfo::of(&node);
        assert!(info.has_comments());
        assert!(!span_trivia_is_whitespace(&node));
    }

    #[test]
    fn test_directives_are_leading() {
        let source = "{\n#if DEBUG\n    return;\n#endif\n}";
        let stmt = first_of(source, SyntaxKind::ReturnStmt);
        let info = TriviaInfo::of(&stmt);
        assert!(info.leading.iter().any(TriviaToken::is_directive));
        assert!(!info.trailing.iter().any(TriviaToken::is_directive));
    }

    #[test]
    fn test_with_trivia_from_transplants_both_edges() {
        let target = first_of("{\n    return  Foo() ;  // c\n}", SyntaxKind::ReturnStmt);
        let expr = first_of("Bar()", SyntaxKind::CallExpr);
        let green = with_trivia_from(&expr.green(), &target);
        assert_eq!(SyntaxNode::new_root(green).text().to_string(), "    Bar()  // c\n");
    }

    #[test]
    fn test_without_trivia() {
        let stmt = first_of("  return x; // c\n", SyntaxKind::ReturnStmt);
        let green = without_trivia(&stmt.green());
        assert_eq!(SyntaxNode::new_root(green).text().to_string(), "return x;");
    }
}
