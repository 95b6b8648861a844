//! Typed AST layer over the CST
//!
//! Thin, zero-cost wrappers around [`SyntaxNode`]. Accessors never fail hard:
//! a missing child (from error recovery) simply yields `None`.
//!
//! # Example
//!
//! ```rust,ignore
//! use refit_core::syntax::{parse, ast::{AstNode, ReturnStmt}};
//!
//! let root = parse("return Log();").syntax();
//! let ret = root.descendants().find_map(ReturnStmt::cast).unwrap();
//! assert_eq!(ret.expr().unwrap().syntax().kind(), SyntaxKind::CallExpr);
//! ```

use super::{SyntaxKind, SyntaxNode, SyntaxToken};

/// Helper trait for casting CST nodes to typed wrappers
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            syntax: SyntaxNode,
        }

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                Self::can_cast(node.kind()).then(|| Self { syntax: node })
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.syntax
            }
        }
    };
}

/// First direct child token of a kind
fn token_of_kind(parent: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    parent
        .children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}

fn child<N: AstNode>(parent: &SyntaxNode) -> Option<N> {
    parent.children().find_map(N::cast)
}

/// First expression child that starts after the first direct `kind` token
fn expr_after(parent: &SyntaxNode, kind: SyntaxKind) -> Option<Expr> {
    let token = token_of_kind(parent, kind)?;
    let offset = token.text_range().end();
    parent
        .children()
        .filter(|n| n.text_range().start() >= offset)
        .find_map(Expr::cast)
}

/// First expression child that ends before the first direct `kind` token
fn expr_before(parent: &SyntaxNode, kind: SyntaxKind) -> Option<Expr> {
    let token = token_of_kind(parent, kind)?;
    let offset = token.text_range().start();
    parent
        .children()
        .take_while(|n| n.text_range().end() <= offset)
        .find_map(Expr::cast)
}

/// Significant text of a node: tokens with all trivia removed, joined verbatim
pub fn significant_text(node: &SyntaxNode) -> String {
    node.descendants_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| !t.kind().is_trivia())
        .map(|t| t.text().to_string())
        .collect()
}

// ============================================================================
// Declarations
// ============================================================================

ast_node!(
    /// Document root
    Root,
    Root
);

ast_node!(ClassDecl, ClassDecl);

impl ClassDecl {
    pub fn name(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, SyntaxKind::Ident)
    }
}

ast_node!(
    /// `modifiers Type Name(params) body`
    MethodDecl,
    MethodDecl
);

impl MethodDecl {
    pub fn return_type(&self) -> Option<TypeRef> {
        child(&self.syntax)
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, SyntaxKind::Ident)
    }

    pub fn params(&self) -> impl Iterator<Item = Param> + use<> {
        self.syntax
            .children()
            .find(|n| n.kind() == SyntaxKind::ParamList)
            .into_iter()
            .flat_map(|list| list.children().filter_map(Param::cast))
    }

    /// Block body, when the method has one
    pub fn body(&self) -> Option<Block> {
        child(&self.syntax)
    }

    pub fn arrow_body(&self) -> Option<ArrowBody> {
        child(&self.syntax)
    }
}

ast_node!(Param, Param);

impl Param {
    pub fn type_ref(&self) -> Option<TypeRef> {
        child(&self.syntax)
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, SyntaxKind::Ident)
    }
}

ast_node!(ArrowBody, ArrowBody);

impl ArrowBody {
    pub fn expr(&self) -> Option<Expr> {
        child(&self.syntax)
    }
}

ast_node!(TypeRef, TypeRef);

impl TypeRef {
    /// Type as written, without trivia (`List<int>`, `string[]`, `Foo.Bar?`)
    pub fn text(&self) -> String {
        significant_text(&self.syntax)
    }
}

// ============================================================================
// Statements
// ============================================================================

ast_node!(Block, Block);

impl Block {
    pub fn statements(&self) -> impl Iterator<Item = Stmt> + use<> {
        self.syntax.children().filter_map(Stmt::cast)
    }

    pub fn r_brace(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, SyntaxKind::RBrace)
    }
}

ast_node!(LocalDeclStmt, LocalDeclStmt);

impl LocalDeclStmt {
    pub fn type_ref(&self) -> Option<TypeRef> {
        child(&self.syntax)
    }

    pub fn declarators(&self) -> impl Iterator<Item = VarDeclarator> + use<> {
        self.syntax.children().filter_map(VarDeclarator::cast)
    }
}

ast_node!(VarDeclarator, VarDeclarator);

impl VarDeclarator {
    pub fn name(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, SyntaxKind::Ident)
    }

    pub fn initializer(&self) -> Option<Expr> {
        expr_after(&self.syntax, SyntaxKind::Eq)
    }
}

ast_node!(ExprStmt, ExprStmt);

impl ExprStmt {
    pub fn expr(&self) -> Option<Expr> {
        child(&self.syntax)
    }
}

ast_node!(ReturnStmt, ReturnStmt);

impl ReturnStmt {
    pub fn return_kw(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, SyntaxKind::ReturnKw)
    }

    pub fn expr(&self) -> Option<Expr> {
        child(&self.syntax)
    }
}

ast_node!(YieldReturnStmt, YieldReturnStmt);

impl YieldReturnStmt {
    pub fn yield_kw(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, SyntaxKind::YieldKw)
    }

    pub fn return_kw(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, SyntaxKind::ReturnKw)
    }

    pub fn expr(&self) -> Option<Expr> {
        child(&self.syntax)
    }
}

ast_node!(
    /// `if (condition) statement [else statement]`
    IfStmt,
    IfStmt
);

impl IfStmt {
    pub fn condition(&self) -> Option<Expr> {
        expr_after(&self.syntax, SyntaxKind::LParen)
    }

    pub fn then_branch(&self) -> Option<Stmt> {
        let paren = token_of_kind(&self.syntax, SyntaxKind::RParen)?;
        let offset = paren.text_range().end();
        self.syntax
            .children()
            .filter(|n| n.text_range().start() >= offset)
            .find_map(Stmt::cast)
    }

    pub fn else_clause(&self) -> Option<ElseClause> {
        child(&self.syntax)
    }

    /// Whether this `if` is the `else if` of an enclosing chain
    pub fn is_else_if(&self) -> bool {
        self.syntax
            .parent()
            .is_some_and(|p| p.kind() == SyntaxKind::ElseClause)
    }
}

ast_node!(ElseClause, ElseClause);

impl ElseClause {
    pub fn statement(&self) -> Option<Stmt> {
        self.syntax.children().find_map(Stmt::cast)
    }
}

ast_node!(ThrowStmt, ThrowStmt);

/// Any statement node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Stmt {
    Block(Block),
    LocalDecl(LocalDeclStmt),
    Expr(ExprStmt),
    Return(ReturnStmt),
    YieldReturn(YieldReturnStmt),
    If(IfStmt),
    Throw(ThrowStmt),
    /// `yield break;`, `;`
    Other(SyntaxNode),
}

impl AstNode for Stmt {
    fn can_cast(kind: SyntaxKind) -> bool {
        kind.is_statement()
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        let stmt = match node.kind() {
            SyntaxKind::Block => Stmt::Block(Block { syntax: node }),
            SyntaxKind::LocalDeclStmt => Stmt::LocalDecl(LocalDeclStmt { syntax: node }),
            SyntaxKind::ExprStmt => Stmt::Expr(ExprStmt { syntax: node }),
            SyntaxKind::ReturnStmt => Stmt::Return(ReturnStmt { syntax: node }),
            SyntaxKind::YieldReturnStmt => Stmt::YieldReturn(YieldReturnStmt { syntax: node }),
            SyntaxKind::IfStmt => Stmt::If(IfStmt { syntax: node }),
            SyntaxKind::ThrowStmt => Stmt::Throw(ThrowStmt { syntax: node }),
            kind if kind.is_statement() => Stmt::Other(node),
            _ => return None,
        };
        Some(stmt)
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Stmt::Block(it) => it.syntax(),
            Stmt::LocalDecl(it) => it.syntax(),
            Stmt::Expr(it) => it.syntax(),
            Stmt::Return(it) => it.syntax(),
            Stmt::YieldReturn(it) => it.syntax(),
            Stmt::If(it) => it.syntax(),
            Stmt::Throw(it) => it.syntax(),
            Stmt::Other(node) => node,
        }
    }
}

impl Stmt {
    /// Whether control cannot fall through the end of this statement
    pub fn is_terminator(&self) -> bool {
        match self {
            Stmt::Return(_) | Stmt::Throw(_) => true,
            Stmt::Other(node) => node.kind() == SyntaxKind::YieldBreakStmt,
            _ => false,
        }
    }
}

// ============================================================================
// Expressions
// ============================================================================

ast_node!(
    /// `condition ? when_true : when_false`
    ConditionalExpr,
    ConditionalExpr
);

impl ConditionalExpr {
    pub fn condition(&self) -> Option<Expr> {
        expr_before(&self.syntax, SyntaxKind::Question)
    }

    pub fn when_true(&self) -> Option<Expr> {
        expr_after(&self.syntax, SyntaxKind::Question)
    }

    pub fn when_false(&self) -> Option<Expr> {
        expr_after(&self.syntax, SyntaxKind::Colon)
    }

    pub fn question_token(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, SyntaxKind::Question)
    }

    pub fn colon_token(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, SyntaxKind::Colon)
    }
}

ast_node!(BinaryExpr, BinaryExpr);

impl BinaryExpr {
    pub fn op(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind().is_binary_operator())
    }

    pub fn op_kind(&self) -> Option<SyntaxKind> {
        self.op().map(|t| t.kind())
    }

    pub fn lhs(&self) -> Option<Expr> {
        let op = self.op()?;
        let offset = op.text_range().start();
        self.syntax
            .children()
            .take_while(|n| n.text_range().end() <= offset)
            .find_map(Expr::cast)
    }

    pub fn rhs(&self) -> Option<Expr> {
        let op = self.op()?;
        let offset = op.text_range().end();
        self.syntax
            .children()
            .filter(|n| n.text_range().start() >= offset)
            .find_map(Expr::cast)
    }
}

ast_node!(PrefixExpr, PrefixExpr);

impl PrefixExpr {
    pub fn op_kind(&self) -> Option<SyntaxKind> {
        self.syntax
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| !t.kind().is_trivia())
            .map(|t| t.kind())
    }

    pub fn operand(&self) -> Option<Expr> {
        child(&self.syntax)
    }
}

ast_node!(ParenExpr, ParenExpr);

impl ParenExpr {
    pub fn inner(&self) -> Option<Expr> {
        child(&self.syntax)
    }
}

ast_node!(CastExpr, CastExpr);

impl CastExpr {
    pub fn type_ref(&self) -> Option<TypeRef> {
        child(&self.syntax)
    }

    pub fn expr(&self) -> Option<Expr> {
        expr_after(&self.syntax, SyntaxKind::RParen)
    }
}

ast_node!(NameExpr, NameExpr);

impl NameExpr {
    pub fn ident(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, SyntaxKind::Ident)
    }

    pub fn name(&self) -> Option<String> {
        self.ident().map(|t| t.text().to_string())
    }
}

ast_node!(LiteralExpr, LiteralExpr);

impl LiteralExpr {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| !t.kind().is_trivia())
    }

    pub fn literal_kind(&self) -> Option<SyntaxKind> {
        self.token().map(|t| t.kind())
    }
}

ast_node!(CallExpr, CallExpr);

impl CallExpr {
    pub fn callee(&self) -> Option<Expr> {
        child(&self.syntax)
    }

    pub fn args(&self) -> impl Iterator<Item = Expr> + use<> {
        self.syntax
            .children()
            .find(|n| n.kind() == SyntaxKind::ArgList)
            .into_iter()
            .flat_map(|list| list.children().filter_map(Expr::cast))
    }

    /// Simple name of the invoked method (`Foo` in `a.Foo(x)` and `Foo(x)`)
    pub fn method_name(&self) -> Option<String> {
        match self.callee()? {
            Expr::Name(name) => name.name(),
            Expr::Member(member) => member.name().map(|t| t.text().to_string()),
            _ => None,
        }
    }
}

ast_node!(MemberExpr, MemberExpr);

impl MemberExpr {
    pub fn receiver(&self) -> Option<Expr> {
        child(&self.syntax)
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        let dot = token_of_kind(&self.syntax, SyntaxKind::Dot)?;
        dot.siblings_with_tokens(rowan::Direction::Next)
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == SyntaxKind::Ident)
    }
}

ast_node!(AssignExpr, AssignExpr);

impl AssignExpr {
    pub fn lhs(&self) -> Option<Expr> {
        expr_before(&self.syntax, SyntaxKind::Eq)
    }

    pub fn rhs(&self) -> Option<Expr> {
        expr_after(&self.syntax, SyntaxKind::Eq)
    }
}

/// Any expression node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Conditional(ConditionalExpr),
    Binary(BinaryExpr),
    Prefix(PrefixExpr),
    Paren(ParenExpr),
    Cast(CastExpr),
    Name(NameExpr),
    Literal(LiteralExpr),
    Call(CallExpr),
    Member(MemberExpr),
    Assign(AssignExpr),
}

impl AstNode for Expr {
    fn can_cast(kind: SyntaxKind) -> bool {
        kind.is_expression()
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        let expr = match node.kind() {
            SyntaxKind::ConditionalExpr => Expr::Conditional(ConditionalExpr { syntax: node }),
            SyntaxKind::BinaryExpr => Expr::Binary(BinaryExpr { syntax: node }),
            SyntaxKind::PrefixExpr => Expr::Prefix(PrefixExpr { syntax: node }),
            SyntaxKind::ParenExpr => Expr::Paren(ParenExpr { syntax: node }),
            SyntaxKind::CastExpr => Expr::Cast(CastExpr { syntax: node }),
            SyntaxKind::NameExpr => Expr::Name(NameExpr { syntax: node }),
            SyntaxKind::LiteralExpr => Expr::Literal(LiteralExpr { syntax: node }),
            SyntaxKind::CallExpr => Expr::Call(CallExpr { syntax: node }),
            SyntaxKind::MemberExpr => Expr::Member(MemberExpr { syntax: node }),
            SyntaxKind::AssignExpr => Expr::Assign(AssignExpr { syntax: node }),
            _ => return None,
        };
        Some(expr)
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Expr::Conditional(it) => it.syntax(),
            Expr::Binary(it) => it.syntax(),
            Expr::Prefix(it) => it.syntax(),
            Expr::Paren(it) => it.syntax(),
            Expr::Cast(it) => it.syntax(),
            Expr::Name(it) => it.syntax(),
            Expr::Literal(it) => it.syntax(),
            Expr::Call(it) => it.syntax(),
            Expr::Member(it) => it.syntax(),
            Expr::Assign(it) => it.syntax(),
        }
    }
}

impl Expr {
    /// Strip any number of enclosing parentheses
    pub fn unwrap_parens(self) -> Expr {
        let mut expr = self;
        while let Expr::Paren(paren) = &expr {
            match paren.inner() {
                Some(inner) => expr = inner,
                None => break,
            }
        }
        expr
    }

    /// Literal keyword kind (`TrueKw`, `NullKw`, ...) when this is a literal
    pub fn literal_kind(&self) -> Option<SyntaxKind> {
        match self {
            Expr::Literal(lit) => lit.literal_kind(),
            _ => None,
        }
    }

    pub fn is_null_literal(&self) -> bool {
        self.literal_kind() == Some(SyntaxKind::NullKw)
    }
}
