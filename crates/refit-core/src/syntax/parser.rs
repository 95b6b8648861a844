//! Hierarchical parser for the REFIT source language
//!
//! Builds a lossless green tree from the trivia-preserving token stream.
//! Tokens are first grouped into lexemes carrying their leading and trailing
//! trivia; each lexeme is emitted into the innermost node open at the moment
//! it is consumed, so every trivia piece belongs to exactly one token.
//!
//! The grammar is a small C#-like subset. Anything the parser does not
//! understand is wrapped in an `Error` node so the tree stays lossless.

use std::fmt;

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder, TextRange, TextSize};

use super::lexer::{CstToken, lex_with_trivia};
use super::{SyntaxKind, SyntaxNode, binary_precedence};

/// A recoverable syntax error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {:?}", self.message, self.range)
    }
}

/// Result of parsing a source text
#[derive(Debug, Clone)]
pub struct Parse {
    green: GreenNode,
    errors: Vec<SyntaxError>,
}

impl Parse {
    /// A fresh red root over the parsed green tree
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    pub fn into_parts(self) -> (GreenNode, Vec<SyntaxError>) {
        (self.green, self.errors)
    }
}

/// Parse source text into a lossless tree
///
/// # Example
///
/// ```rust,ignore
/// use refit_core::syntax::parse;
///
/// let source = "void Run() { return Log(); }\n";
/// let parse = parse(source);
/// assert!(parse.errors().is_empty());
/// assert_eq!(parse.syntax().text().to_string(), source);
/// ```
pub fn parse(source: &str) -> Parse {
    let (tokens, lexer_errors) = lex_with_trivia(source);
    let (lexemes, eof_trivia) = group_trivia(tokens);

    let mut parser = Parser {
        lexemes,
        pos: 0,
        builder: GreenNodeBuilder::new(),
        errors: lexer_errors
            .into_iter()
            .map(|e| SyntaxError {
                message: e.message,
                range: text_range(e.span.start, e.span.end),
            })
            .collect(),
        source_len: source.len(),
    };
    parser.root(eof_trivia);

    Parse {
        green: parser.builder.finish(),
        errors: parser.errors,
    }
}

/// A significant token together with the trivia it owns
struct Lexeme {
    kind: SyntaxKind,
    text: String,
    start: usize,
    end: usize,
    leading: Vec<CstToken>,
    trailing: Vec<CstToken>,
}

/// Split the flat token stream into lexemes; returns trivia left before EOF
fn group_trivia(tokens: Vec<CstToken>) -> (Vec<Lexeme>, Vec<CstToken>) {
    let mut lexemes = Vec::new();
    let mut pending = Vec::new();
    let mut iter = tokens.into_iter().peekable();

    while let Some(token) = iter.next() {
        if token.kind.is_trivia() {
            pending.push(token);
            continue;
        }

        let mut trailing = Vec::new();
        while let Some(next) = iter.next_if(|t| {
            matches!(
                t.kind,
                SyntaxKind::Whitespace
                    | SyntaxKind::LineComment
                    | SyntaxKind::BlockComment
                    | SyntaxKind::Newline
            )
        }) {
            let ends_line = next.kind == SyntaxKind::Newline;
            trailing.push(next);
            if ends_line {
                break;
            }
        }

        lexemes.push(Lexeme {
            kind: token.kind,
            text: token.text,
            start: token.span.start,
            end: token.span.end,
            leading: std::mem::take(&mut pending),
            trailing,
        });
    }

    (lexemes, pending)
}

fn text_range(start: usize, end: usize) -> TextRange {
    TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32))
}

struct Parser {
    lexemes: Vec<Lexeme>,
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
    source_len: usize,
}

impl Parser {
    // ------------------------------------------------------------------
    // Token stream
    // ------------------------------------------------------------------

    fn kind_at(&self, index: usize) -> Option<SyntaxKind> {
        self.lexemes.get(index).map(|l| l.kind)
    }

    fn nth(&self, n: usize) -> Option<SyntaxKind> {
        self.kind_at(self.pos + n)
    }

    fn current(&self) -> Option<SyntaxKind> {
        self.nth(0)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == Some(kind)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.lexemes.len()
    }

    fn bump(&mut self) {
        let Some(lexeme) = self.lexemes.get(self.pos) else {
            return;
        };
        for trivia in &lexeme.leading {
            self.builder.token(trivia.kind.into(), &trivia.text);
        }
        self.builder.token(lexeme.kind.into(), &lexeme.text);
        for trivia in &lexeme.trailing {
            self.builder.token(trivia.kind.into(), &trivia.text);
        }
        self.pos += 1;
    }

    fn expect(&mut self, kind: SyntaxKind, what: &str) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            self.error(format!("Expected {what}"));
            false
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        let range = match self.lexemes.get(self.pos) {
            Some(lexeme) => text_range(lexeme.start, lexeme.end),
            None => text_range(self.source_len, self.source_len),
        };
        self.errors.push(SyntaxError {
            message: message.into(),
            range,
        });
    }

    fn start(&mut self, kind: SyntaxKind) {
        self.builder.start_node(kind.into());
    }

    fn start_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    fn finish(&mut self) {
        self.builder.finish_node();
    }

    fn checkpoint(&self) -> Checkpoint {
        self.builder.checkpoint()
    }

    /// Wrap one unexpected token in an `Error` node
    fn recover(&mut self) {
        self.error("Unexpected token");
        self.start(SyntaxKind::Error);
        self.bump();
        self.finish();
    }

    // ------------------------------------------------------------------
    // Lookahead
    // ------------------------------------------------------------------

    /// Index just past a type starting at `index`, if one is there
    fn scan_type(&self, index: usize) -> Option<usize> {
        let mut i = index;
        if self.kind_at(i) != Some(SyntaxKind::Ident) {
            return None;
        }
        i += 1;
        while self.kind_at(i) == Some(SyntaxKind::Dot)
            && self.kind_at(i + 1) == Some(SyntaxKind::Ident)
        {
            i += 2;
        }
        if self.kind_at(i) == Some(SyntaxKind::Lt) {
            i += 1;
            loop {
                i = self.scan_type(i)?;
                if self.kind_at(i) == Some(SyntaxKind::Comma) {
                    i += 1;
                    continue;
                }
                break;
            }
            if self.kind_at(i) != Some(SyntaxKind::Gt) {
                return None;
            }
            i += 1;
        }
        while self.kind_at(i) == Some(SyntaxKind::LBracket)
            && self.kind_at(i + 1) == Some(SyntaxKind::RBracket)
        {
            i += 2;
        }
        if self.kind_at(i) == Some(SyntaxKind::Question) {
            i += 1;
        }
        Some(i)
    }

    fn skip_modifiers(&self, mut index: usize) -> usize {
        while self.kind_at(index) == Some(SyntaxKind::ModifierKw) {
            index += 1;
        }
        index
    }

    fn at_class(&self) -> bool {
        self.kind_at(self.skip_modifiers(self.pos)) == Some(SyntaxKind::ClassKw)
    }

    fn at_method(&self) -> bool {
        let start = self.skip_modifiers(self.pos);
        self.scan_type(start).is_some_and(|i| {
            self.kind_at(i) == Some(SyntaxKind::Ident)
                && self.kind_at(i + 1) == Some(SyntaxKind::LParen)
        })
    }

    fn at_local_decl(&self) -> bool {
        self.scan_type(self.pos).is_some_and(|i| {
            self.kind_at(i) == Some(SyntaxKind::Ident)
                && matches!(
                    self.kind_at(i + 1),
                    Some(SyntaxKind::Eq | SyntaxKind::Semicolon | SyntaxKind::Comma)
                )
        })
    }

    fn at_cast(&self) -> bool {
        self.scan_type(self.pos + 1).is_some_and(|i| {
            self.kind_at(i) == Some(SyntaxKind::RParen)
                && matches!(
                    self.kind_at(i + 1),
                    Some(
                        SyntaxKind::Ident
                            | SyntaxKind::IntLiteral
                            | SyntaxKind::StringLiteral
                            | SyntaxKind::TrueKw
                            | SyntaxKind::FalseKw
                            | SyntaxKind::NullKw
                            | SyntaxKind::LParen
                    )
                )
        })
    }

    fn at_expr_start(&self) -> bool {
        matches!(
            self.current(),
            Some(
                SyntaxKind::Ident
                    | SyntaxKind::IntLiteral
                    | SyntaxKind::StringLiteral
                    | SyntaxKind::TrueKw
                    | SyntaxKind::FalseKw
                    | SyntaxKind::NullKw
                    | SyntaxKind::LParen
                    | SyntaxKind::Bang
                    | SyntaxKind::Minus
            )
        )
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn root(&mut self, eof_trivia: Vec<CstToken>) {
        self.start(SyntaxKind::Root);
        while !self.at_end() {
            let before = self.pos;
            self.item();
            if self.pos == before {
                self.recover();
            }
        }
        for trivia in &eof_trivia {
            self.builder.token(trivia.kind.into(), &trivia.text);
        }
        self.finish();
    }

    fn item(&mut self) {
        if self.at_class() {
            self.class_decl();
        } else if self.at_method() {
            self.method_decl();
        } else {
            self.statement();
        }
    }

    fn class_decl(&mut self) {
        self.start(SyntaxKind::ClassDecl);
        while self.at(SyntaxKind::ModifierKw) {
            self.bump();
        }
        self.expect(SyntaxKind::ClassKw, "'class'");
        self.expect(SyntaxKind::Ident, "class name");
        if self.expect(SyntaxKind::LBrace, "'{'") {
            while !self.at(SyntaxKind::RBrace) && !self.at_end() {
                let before = self.pos;
                self.item();
                if self.pos == before {
                    self.recover();
                }
            }
            self.expect(SyntaxKind::RBrace, "'}'");
        }
        self.finish();
    }

    fn method_decl(&mut self) {
        self.start(SyntaxKind::MethodDecl);
        while self.at(SyntaxKind::ModifierKw) {
            self.bump();
        }
        self.type_ref();
        self.expect(SyntaxKind::Ident, "method name");
        self.param_list();
        match self.current() {
            Some(SyntaxKind::LBrace) => self.block(),
            Some(SyntaxKind::FatArrow) => {
                self.start(SyntaxKind::ArrowBody);
                self.bump();
                self.expr();
                self.finish();
                self.expect(SyntaxKind::Semicolon, "';'");
            }
            Some(SyntaxKind::Semicolon) => self.bump(),
            _ => self.error("Expected method body"),
        }
        self.finish();
    }

    fn param_list(&mut self) {
        self.start(SyntaxKind::ParamList);
        self.expect(SyntaxKind::LParen, "'('");
        while !self.at(SyntaxKind::RParen) && !self.at_end() {
            self.start(SyntaxKind::Param);
            self.type_ref();
            let named = self.expect(SyntaxKind::Ident, "parameter name");
            self.finish();
            if !named || !self.at(SyntaxKind::Comma) {
                break;
            }
            self.bump();
        }
        self.expect(SyntaxKind::RParen, "')'");
        self.finish();
    }

    fn type_ref(&mut self) {
        self.start(SyntaxKind::TypeRef);
        self.expect(SyntaxKind::Ident, "type name");
        while self.at(SyntaxKind::Dot) && self.nth(1) == Some(SyntaxKind::Ident) {
            self.bump();
            self.bump();
        }
        if self.at(SyntaxKind::Lt) {
            self.start(SyntaxKind::TypeArgList);
            self.bump();
            loop {
                self.type_ref();
                if !self.at(SyntaxKind::Comma) {
                    break;
                }
                self.bump();
            }
            self.expect(SyntaxKind::Gt, "'>'");
            self.finish();
        }
        while self.at(SyntaxKind::LBracket) && self.nth(1) == Some(SyntaxKind::RBracket) {
            self.bump();
            self.bump();
        }
        if self.at(SyntaxKind::Question) {
            self.bump();
        }
        self.finish();
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn statement(&mut self) {
        match self.current() {
            Some(SyntaxKind::LBrace) => self.block(),
            Some(SyntaxKind::ReturnKw) => {
                self.start(SyntaxKind::ReturnStmt);
                self.bump();
                if !self.at(SyntaxKind::Semicolon) {
                    self.expr();
                }
                self.expect(SyntaxKind::Semicolon, "';'");
                self.finish();
            }
            Some(SyntaxKind::YieldKw) => self.yield_stmt(),
            Some(SyntaxKind::IfKw) => self.if_stmt(),
            Some(SyntaxKind::ThrowKw) => {
                self.start(SyntaxKind::ThrowStmt);
                self.bump();
                if !self.at(SyntaxKind::Semicolon) {
                    self.expr();
                }
                self.expect(SyntaxKind::Semicolon, "';'");
                self.finish();
            }
            Some(SyntaxKind::Semicolon) => {
                self.start(SyntaxKind::EmptyStmt);
                self.bump();
                self.finish();
            }
            _ if self.at_local_decl() => self.local_decl(),
            _ if self.at_expr_start() => {
                self.start(SyntaxKind::ExprStmt);
                self.expr();
                self.expect(SyntaxKind::Semicolon, "';'");
                self.finish();
            }
            _ => self.recover(),
        }
    }

    fn yield_stmt(&mut self) {
        match self.nth(1) {
            Some(SyntaxKind::ReturnKw) => {
                self.start(SyntaxKind::YieldReturnStmt);
                self.bump();
                self.bump();
                self.expr();
                self.expect(SyntaxKind::Semicolon, "';'");
                self.finish();
            }
            Some(SyntaxKind::BreakKw) => {
                self.start(SyntaxKind::YieldBreakStmt);
                self.bump();
                self.bump();
                self.expect(SyntaxKind::Semicolon, "';'");
                self.finish();
            }
            _ => self.recover(),
        }
    }

    fn block(&mut self) {
        self.start(SyntaxKind::Block);
        self.bump();
        while !self.at(SyntaxKind::RBrace) && !self.at_end() {
            let before = self.pos;
            self.statement();
            if self.pos == before {
                self.recover();
            }
        }
        self.expect(SyntaxKind::RBrace, "'}'");
        self.finish();
    }

    fn if_stmt(&mut self) {
        self.start(SyntaxKind::IfStmt);
        self.bump();
        self.expect(SyntaxKind::LParen, "'('");
        self.expr();
        self.expect(SyntaxKind::RParen, "')'");
        self.embedded_statement();
        if self.at(SyntaxKind::ElseKw) {
            self.start(SyntaxKind::ElseClause);
            self.bump();
            self.embedded_statement();
            self.finish();
        }
        self.finish();
    }

    fn embedded_statement(&mut self) {
        if self.at_end() || self.at(SyntaxKind::RBrace) {
            self.error("Expected statement");
        } else {
            self.statement();
        }
    }

    fn local_decl(&mut self) {
        self.start(SyntaxKind::LocalDeclStmt);
        self.type_ref();
        loop {
            self.start(SyntaxKind::VarDeclarator);
            self.expect(SyntaxKind::Ident, "variable name");
            if self.at(SyntaxKind::Eq) {
                self.bump();
                self.expr();
            }
            self.finish();
            if !self.at(SyntaxKind::Comma) {
                break;
            }
            self.bump();
        }
        self.expect(SyntaxKind::Semicolon, "';'");
        self.finish();
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn expr(&mut self) {
        let checkpoint = self.checkpoint();
        self.conditional();
        if self.at(SyntaxKind::Eq) {
            self.start_at(checkpoint, SyntaxKind::AssignExpr);
            self.bump();
            self.expr();
            self.finish();
        }
    }

    fn conditional(&mut self) {
        let checkpoint = self.checkpoint();
        self.coalesce();
        if self.at(SyntaxKind::Question) {
            self.start_at(checkpoint, SyntaxKind::ConditionalExpr);
            self.bump();
            self.expr();
            self.expect(SyntaxKind::Colon, "':'");
            self.expr();
            self.finish();
        }
    }

    fn coalesce(&mut self) {
        let checkpoint = self.checkpoint();
        self.binary(1);
        if self.at(SyntaxKind::QuestionQuestion) {
            self.start_at(checkpoint, SyntaxKind::BinaryExpr);
            self.bump();
            self.coalesce();
            self.finish();
        }
    }

    /// Precedence climbing over left-associative operators
    fn binary(&mut self, min_precedence: u8) {
        let checkpoint = self.checkpoint();
        self.unary();
        while let Some(precedence) = self.current().and_then(binary_precedence) {
            if precedence < min_precedence {
                break;
            }
            self.start_at(checkpoint, SyntaxKind::BinaryExpr);
            self.bump();
            self.binary(precedence + 1);
            self.finish();
        }
    }

    fn unary(&mut self) {
        match self.current() {
            Some(SyntaxKind::Bang | SyntaxKind::Minus) => {
                self.start(SyntaxKind::PrefixExpr);
                self.bump();
                self.unary();
                self.finish();
            }
            Some(SyntaxKind::LParen) if self.at_cast() => {
                self.start(SyntaxKind::CastExpr);
                self.bump();
                self.type_ref();
                self.expect(SyntaxKind::RParen, "')'");
                self.unary();
                self.finish();
            }
            _ => self.postfix(),
        }
    }

    fn postfix(&mut self) {
        let checkpoint = self.checkpoint();
        self.primary();
        loop {
            match self.current() {
                Some(SyntaxKind::Dot) => {
                    self.start_at(checkpoint, SyntaxKind::MemberExpr);
                    self.bump();
                    self.expect(SyntaxKind::Ident, "member name");
                    self.finish();
                }
                Some(SyntaxKind::LParen) => {
                    self.start_at(checkpoint, SyntaxKind::CallExpr);
                    self.arg_list();
                    self.finish();
                }
                _ => break,
            }
        }
    }

    fn arg_list(&mut self) {
        self.start(SyntaxKind::ArgList);
        self.bump();
        while !self.at(SyntaxKind::RParen) && !self.at_end() {
            let before = self.pos;
            self.expr();
            if self.pos == before || !self.at(SyntaxKind::Comma) {
                break;
            }
            self.bump();
        }
        self.expect(SyntaxKind::RParen, "')'");
        self.finish();
    }

    fn primary(&mut self) {
        match self.current() {
            Some(SyntaxKind::Ident) => {
                self.start(SyntaxKind::NameExpr);
                self.bump();
                self.finish();
            }
            Some(
                SyntaxKind::IntLiteral
                | SyntaxKind::StringLiteral
                | SyntaxKind::TrueKw
                | SyntaxKind::FalseKw
                | SyntaxKind::NullKw,
            ) => {
                self.start(SyntaxKind::LiteralExpr);
                self.bump();
                self.finish();
            }
            Some(SyntaxKind::LParen) => {
                self.start(SyntaxKind::ParenExpr);
                self.bump();
                self.expr();
                self.expect(SyntaxKind::RParen, "')'");
                self.finish();
            }
            Some(
                SyntaxKind::Semicolon
                | SyntaxKind::RParen
                | SyntaxKind::RBrace
                | SyntaxKind::Comma
                | SyntaxKind::Colon,
            )
            | None => self.error("Expected expression"),
            Some(_) => {
                self.error("Expected expression");
                self.start(SyntaxKind::Error);
                self.bump();
                self.finish();
            }
        }
    }
}
