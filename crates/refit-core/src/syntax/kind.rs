//! Syntax kinds for the REFIT concrete syntax tree
//!
//! The enumeration is closed: every token and node kind the lexer, parser and
//! syntax factory can produce is listed here. Discriminants are assigned
//! sequentially, which lets [`SyntaxKind::from_raw`] recover a kind from the
//! raw `u16` stored in rowan's green tree.

macro_rules! syntax_kinds {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        /// Every token and node kind in a REFIT syntax tree
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u16)]
        pub enum SyntaxKind {
            $($(#[$meta])* $name),*
        }

        impl SyntaxKind {
            const ALL: &'static [SyntaxKind] = &[$(SyntaxKind::$name),*];

            /// Recover a kind from its raw discriminant
            pub fn from_raw(raw: u16) -> Option<Self> {
                Self::ALL.get(raw as usize).copied()
            }
        }
    };
}

syntax_kinds! {
    // Trivia
    Whitespace,
    Newline,
    LineComment,
    BlockComment,
    /// A single `///` documentation comment line
    DocComment,
    /// A preprocessor directive line (`#if`, `#region`, ...)
    Directive,

    // Keywords
    ClassKw,
    ReturnKw,
    YieldKw,
    BreakKw,
    IfKw,
    ElseKw,
    ThrowKw,
    NullKw,
    TrueKw,
    FalseKw,
    /// `public`, `private`, `protected`, `internal`, `static`
    ModifierKw,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    Question,
    QuestionQuestion,
    Colon,
    Eq,
    EqEq,
    BangEq,
    Bang,
    Lt,
    Gt,
    LtEq,
    GtEq,
    AmpAmp,
    PipePipe,
    Plus,
    Minus,
    Star,
    Slash,
    FatArrow,

    // Literals & identifiers
    Ident,
    IntLiteral,
    StringLiteral,
    ErrorToken,

    // Declarations
    Root,
    ClassDecl,
    MethodDecl,
    ParamList,
    Param,
    ArrowBody,
    TypeRef,
    TypeArgList,

    // Statements
    Block,
    LocalDeclStmt,
    VarDeclarator,
    ExprStmt,
    ReturnStmt,
    YieldReturnStmt,
    YieldBreakStmt,
    IfStmt,
    ElseClause,
    ThrowStmt,
    EmptyStmt,

    // Expressions
    ConditionalExpr,
    BinaryExpr,
    PrefixExpr,
    ParenExpr,
    CastExpr,
    NameExpr,
    LiteralExpr,
    CallExpr,
    ArgList,
    MemberExpr,
    AssignExpr,

    /// Unparseable input wrapped so the tree stays lossless
    Error,
}

impl SyntaxKind {
    /// Whitespace, newlines, comments and directives
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            SyntaxKind::Whitespace
                | SyntaxKind::Newline
                | SyntaxKind::LineComment
                | SyntaxKind::BlockComment
                | SyntaxKind::DocComment
                | SyntaxKind::Directive
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(
            self,
            SyntaxKind::LineComment | SyntaxKind::BlockComment | SyntaxKind::DocComment
        )
    }

    pub fn is_keyword(self) -> bool {
        (SyntaxKind::ClassKw as u16..=SyntaxKind::ModifierKw as u16).contains(&(self as u16))
    }

    /// Leaf kinds (tokens), including trivia
    pub fn is_token(self) -> bool {
        (self as u16) < SyntaxKind::Root as u16
    }

    /// Statement-like nodes, the unit statement-scoped rewrites operate on
    pub fn is_statement(self) -> bool {
        matches!(
            self,
            SyntaxKind::Block
                | SyntaxKind::LocalDeclStmt
                | SyntaxKind::ExprStmt
                | SyntaxKind::ReturnStmt
                | SyntaxKind::YieldReturnStmt
                | SyntaxKind::YieldBreakStmt
                | SyntaxKind::IfStmt
                | SyntaxKind::ThrowStmt
                | SyntaxKind::EmptyStmt
        )
    }

    pub fn is_expression(self) -> bool {
        matches!(
            self,
            SyntaxKind::ConditionalExpr
                | SyntaxKind::BinaryExpr
                | SyntaxKind::PrefixExpr
                | SyntaxKind::ParenExpr
                | SyntaxKind::CastExpr
                | SyntaxKind::NameExpr
                | SyntaxKind::LiteralExpr
                | SyntaxKind::CallExpr
                | SyntaxKind::MemberExpr
                | SyntaxKind::AssignExpr
        )
    }

    /// Binary operator tokens
    pub fn is_binary_operator(self) -> bool {
        binary_precedence(self).is_some() || self == SyntaxKind::QuestionQuestion
    }

    /// Keyword kind for an identifier-like word
    pub fn from_keyword(word: &str) -> Option<SyntaxKind> {
        let kind = match word {
            "class" => SyntaxKind::ClassKw,
            "return" => SyntaxKind::ReturnKw,
            "yield" => SyntaxKind::YieldKw,
            "break" => SyntaxKind::BreakKw,
            "if" => SyntaxKind::IfKw,
            "else" => SyntaxKind::ElseKw,
            "throw" => SyntaxKind::ThrowKw,
            "null" => SyntaxKind::NullKw,
            "true" => SyntaxKind::TrueKw,
            "false" => SyntaxKind::FalseKw,
            "public" | "private" | "protected" | "internal" | "static" => SyntaxKind::ModifierKw,
            _ => return None,
        };
        Some(kind)
    }
}

/// Precedence of left-associative binary operators (higher binds tighter)
///
/// `??` is right-associative and handled separately by the parser.
pub fn binary_precedence(kind: SyntaxKind) -> Option<u8> {
    let precedence = match kind {
        SyntaxKind::PipePipe => 1,
        SyntaxKind::AmpAmp => 2,
        SyntaxKind::EqEq | SyntaxKind::BangEq => 3,
        SyntaxKind::Lt | SyntaxKind::Gt | SyntaxKind::LtEq | SyntaxKind::GtEq => 4,
        SyntaxKind::Plus | SyntaxKind::Minus => 5,
        SyntaxKind::Star | SyntaxKind::Slash => 6,
        _ => return None,
    };
    Some(precedence)
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        rowan::SyntaxKind(kind as u16)
    }
}
