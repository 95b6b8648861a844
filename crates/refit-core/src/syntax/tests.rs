//! Parser tests: lossless round-trips, tree shape, trivia ownership

use std::fmt::Write;

use rowan::NodeOrToken;

use super::ast::{self, AstNode};
use super::*;

fn dump(node: &SyntaxNode) -> String {
    fn go(element: SyntaxElement, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        match element {
            NodeOrToken::Node(node) => {
                let _ = writeln!(out, "{indent}{:?}", node.kind());
                for child in node.children_with_tokens() {
                    go(child, depth + 1, out);
                }
            }
            NodeOrToken::Token(token) => {
                let _ = writeln!(out, "{indent}{:?} {:?}", token.kind(), token.text());
            }
        }
    }

    let mut out = String::new();
    go(NodeOrToken::Node(node.clone()), 0, &mut out);
    out.trim_end().to_string()
}

fn assert_lossless(source: &str) {
    let parsed = parse(source);
    assert_eq!(parsed.syntax().text().to_string(), source, "round-trip failed");
}

#[test]
fn test_round_trip_valid_sources() {
    assert_lossless("");
    assert_lossless("   \n\n");
    assert_lossless(
        "public class Program\n{\n    /// <summary>\n    /// Runs.\n    /// </summary>\n    public void Run(int a, string b)\n    {\n        return Log(a); // trailing\n    }\n}\n",
    );
    assert_lossless("IEnumerable<int> Items()\n{\n#if DEBUG\n    yield return 1;\n#endif\n    yield break;\n}\r\n");
    assert_lossless("int F() => a ?? b;");
    assert_lossless("object o = (string)x;\nvar y = c ? true : false;");
}

#[test]
fn test_round_trip_invalid_sources() {
    for source in ["@@ return x;", "if (", "class {", "x = ;;", "return \"open", "} } )", "a.b.(c"] {
        let parsed = parse(source);
        assert_eq!(parsed.syntax().text().to_string(), source);
        assert!(!parsed.errors().is_empty(), "expected errors for {source:?}");
    }
}

#[test]
fn test_return_statement_shape() {
    let root = parse("return x;\n").syntax();
    insta::assert_snapshot!(dump(&root), @r#"
    Root
      ReturnStmt
        ReturnKw "return"
        Whitespace " "
        NameExpr
          Ident "x"
        Semicolon ";"
        Newline "\n"
    "#);
}

#[test]
fn test_assignment_with_trailing_comment_shape() {
    let root = parse("x = a ?? b; // c\n").syntax();
    insta::assert_snapshot!(dump(&root), @r#"
    Root
      ExprStmt
        AssignExpr
          NameExpr
            Ident "x"
            Whitespace " "
          Eq "="
          Whitespace " "
          BinaryExpr
            NameExpr
              Ident "a"
              Whitespace " "
            QuestionQuestion "??"
            Whitespace " "
            NameExpr
              Ident "b"
        Semicolon ";"
        Whitespace " "
        LineComment "// c"
        Newline "\n"
    "#);
}

#[test]
fn test_method_declaration() {
    let root = parse("public static string Name(int id) { return id.ToString(); }").syntax();
    let method = root.descendants().find_map(ast::MethodDecl::cast).unwrap();
    assert_eq!(method.return_type().unwrap().text(), "string");
    assert_eq!(method.name().unwrap().text(), "Name");
    assert_eq!(method.params().count(), 1);
    let body = method.body().unwrap();
    assert_eq!(body.statements().count(), 1);
}

#[test]
fn test_local_declaration_versus_expression() {
    let root = parse("List<int> xs = Make();\nx = 1;\nFoo(x);").syntax();
    let kinds: Vec<SyntaxKind> = root.children().map(|n| n.kind()).collect();
    assert_eq!(
        kinds,
        vec![SyntaxKind::LocalDeclStmt, SyntaxKind::ExprStmt, SyntaxKind::ExprStmt]
    );

    let decl = root.children().find_map(ast::LocalDeclStmt::cast).unwrap();
    assert_eq!(decl.type_ref().unwrap().text(), "List<int>");
    let declarator = decl.declarators().next().unwrap();
    assert_eq!(declarator.name().unwrap().text(), "xs");
    assert!(matches!(declarator.initializer(), Some(ast::Expr::Call(_))));
}

#[test]
fn test_cast_detection() {
    let root = parse("a = (int)x;\nb = (a) + c;").syntax();
    let casts = root.descendants().filter(|n| n.kind() == SyntaxKind::CastExpr).count();
    let parens = root.descendants().filter(|n| n.kind() == SyntaxKind::ParenExpr).count();
    assert_eq!(casts, 1);
    assert_eq!(parens, 1);
}

#[test]
fn test_operator_precedence() {
    let root = parse("r = a || b && c == d + e * f;").syntax();
    let top = root
        .descendants()
        .find_map(ast::AssignExpr::cast)
        .and_then(|a| a.rhs())
        .unwrap();
    let ast::Expr::Binary(or) = top else {
        panic!("expected binary expression");
    };
    assert_eq!(or.op_kind(), Some(SyntaxKind::PipePipe));
    let ast::Expr::Binary(and) = or.rhs().unwrap() else {
        panic!("expected && on the right");
    };
    assert_eq!(and.op_kind(), Some(SyntaxKind::AmpAmp));
}

#[test]
fn test_conditional_accessors() {
    let root = parse("v = x != null ? x : y;").syntax();
    let cond = root.descendants().find_map(ast::ConditionalExpr::cast).unwrap();
    assert_eq!(ast::significant_text(cond.condition().unwrap().syntax()), "x!=null");
    assert_eq!(ast::significant_text(cond.when_true().unwrap().syntax()), "x");
    assert_eq!(ast::significant_text(cond.when_false().unwrap().syntax()), "y");
}

#[test]
fn test_if_else_chain() {
    let root = parse("if (a) return 1; else if (b) return 2; else return 3;").syntax();
    let ifs: Vec<ast::IfStmt> = root.descendants().filter_map(ast::IfStmt::cast).collect();
    assert_eq!(ifs.len(), 2);
    assert!(!ifs[0].is_else_if());
    assert!(ifs[1].is_else_if());
    assert!(matches!(ifs[0].then_branch(), Some(ast::Stmt::Return(_))));
    assert!(matches!(
        ifs[0].else_clause().and_then(|e| e.statement()),
        Some(ast::Stmt::If(_))
    ));
}

#[test]
fn test_yield_statements() {
    let root = parse("yield return Log();\nyield break;").syntax();
    let kinds: Vec<SyntaxKind> = root.children().map(|n| n.kind()).collect();
    assert_eq!(kinds, vec![SyntaxKind::YieldReturnStmt, SyntaxKind::YieldBreakStmt]);
    let stmt = root.children().find_map(ast::YieldReturnStmt::cast).unwrap();
    assert!(stmt.yield_kw().is_some());
    assert!(matches!(stmt.expr(), Some(ast::Expr::Call(_))));
}

#[test]
fn test_leading_trivia_lives_in_innermost_owner() {
    let root = parse("{\n    // note\n    Log();\n}").syntax();
    let stmt = root.descendants().find(|n| n.kind() == SyntaxKind::ExprStmt).unwrap();
    let name = stmt.descendants().find(|n| n.kind() == SyntaxKind::NameExpr).unwrap();
    assert!(name.text().to_string().starts_with("    // note\n    Log"));
}
