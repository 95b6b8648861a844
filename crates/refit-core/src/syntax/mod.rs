//! Concrete Syntax Tree (CST) for the REFIT source language
//!
//! The tree is a lossless rowan green/red tree: every byte of the source,
//! including whitespace, comments and preprocessor directives, is stored in
//! exactly one token, so `parse(source).syntax().text() == source`.
//!
//! ## Trivia attachment
//!
//! - **Leading trivia**: everything since the previous token's trailing
//!   trivia. It is placed in the innermost node that owns the token.
//! - **Trailing trivia**: same-line whitespace and comments up to and
//!   including the first newline.
//! - Directives and doc comments are always leading.
//!
//! A node's *span* excludes its outer trivia; its *full span* includes it.

mod kind;
mod language;
mod lexer;
mod parser;

pub mod ast;
pub mod equivalence;
pub mod factory;
pub mod trivia;

#[cfg(test)]
mod tests;

pub use kind::{SyntaxKind, binary_precedence};
pub use language::RefitLanguage;
pub use lexer::{CstLexResult, CstSpan, CstToken, LexerError, lex_with_trivia};
pub use parser::{Parse, SyntaxError, parse};

pub use rowan::{GreenNode, GreenToken, NodeOrToken, TextRange, TextSize};

/// Red syntax node
pub type SyntaxNode = rowan::SyntaxNode<RefitLanguage>;
/// Red syntax token
pub type SyntaxToken = rowan::SyntaxToken<RefitLanguage>;
/// Either a node or a token
pub type SyntaxElement = rowan::SyntaxElement<RefitLanguage>;
/// Owned green element used when assembling replacement subtrees
pub type GreenElement = NodeOrToken<GreenNode, GreenToken>;
