//! Declaration-driven type oracle
//!
//! Resolves types from what the document itself declares: method return
//! types, parameters, locals (including `var` inference from initializers),
//! class names, and a fixed set of well-known framework types. Anything else
//! resolves to an error type. Also reports `CS0161` for non-void block-bodied
//! methods whose end is reachable.

use std::collections::{HashMap, HashSet};

use rowan::TextRange;

use super::{CompilerDiagnostic, TypeDescriptor, TypeKind, TypeOracle};
use crate::snapshot::Snapshot;
use crate::syntax::SyntaxKind;
use crate::syntax::SyntaxNode;
use crate::syntax::ast::{
    self, AstNode, ClassDecl, Expr, LocalDeclStmt, MethodDecl, Param, Stmt, TypeRef, VarDeclarator,
};

/// Compiler id for "not all code paths return a value"
pub const NOT_ALL_PATHS_RETURN: &str = "CS0161";

const COLLECTION_TYPES: &[&str] = &[
    "List",
    "IList",
    "ICollection",
    "IEnumerable",
    "IReadOnlyList",
    "IReadOnlyCollection",
    "HashSet",
    "Queue",
    "Stack",
];

const FRAMEWORK_REFERENCE_TYPES: &[&str] = &[
    "Exception",
    "StringBuilder",
    "Task",
    "Type",
    "Uri",
];

type Symbols = HashMap<String, TypeDescriptor>;

struct Scope {
    range: TextRange,
    symbols: Symbols,
}

/// [`TypeOracle`] over one snapshot's declarations
pub struct DeclarationOracle {
    classes: HashSet<String>,
    methods: HashMap<String, TypeDescriptor>,
    scopes: Vec<Scope>,
    globals: Symbols,
    diagnostics: Vec<CompilerDiagnostic>,
}

impl DeclarationOracle {
    pub fn new(snapshot: &Snapshot) -> Self {
        Self::from_root(&snapshot.root())
    }

    pub fn from_root(root: &SyntaxNode) -> Self {
        let mut oracle = Self {
            classes: root
                .descendants()
                .filter_map(ClassDecl::cast)
                .filter_map(|c| c.name())
                .map(|t| t.text().to_string())
                .collect(),
            methods: HashMap::new(),
            scopes: Vec::new(),
            globals: HashMap::new(),
            diagnostics: Vec::new(),
        };

        let methods: Vec<MethodDecl> = root.descendants().filter_map(MethodDecl::cast).collect();
        for method in &methods {
            let return_type = oracle.declared_type(method.return_type());
            if let Some(name) = method.name() {
                oracle
                    .methods
                    .entry(name.text().to_string())
                    .or_insert(return_type);
            }
        }

        for method in &methods {
            let mut symbols = Symbols::new();
            for param in method.params() {
                if let Some(name) = param.name() {
                    let ty = oracle.declared_type(param.type_ref());
                    symbols.insert(name.text().to_string(), ty);
                }
            }
            for decl in method.syntax().descendants().filter_map(LocalDeclStmt::cast) {
                oracle.declare_locals(&decl, &mut symbols);
            }
            oracle.scopes.push(Scope {
                range: method.syntax().text_range(),
                symbols,
            });

            if let Some(diagnostic) = oracle.check_return_paths(method) {
                oracle.diagnostics.push(diagnostic);
            }
        }

        let mut globals = Symbols::new();
        for decl in root.descendants().filter_map(LocalDeclStmt::cast) {
            let in_method = decl
                .syntax()
                .ancestors()
                .any(|n| n.kind() == SyntaxKind::MethodDecl);
            if !in_method {
                oracle.declare_locals(&decl, &mut globals);
            }
        }
        oracle.globals = globals;

        oracle
    }

    fn declared_type(&self, type_ref: Option<TypeRef>) -> TypeDescriptor {
        match type_ref {
            Some(type_ref) => self.resolve_type_name(&type_ref.text()),
            None => TypeDescriptor::error("?"),
        }
    }

    fn declare_locals(&self, decl: &LocalDeclStmt, symbols: &mut Symbols) {
        let declared = decl.type_ref().map(|t| t.text());
        for declarator in decl.declarators() {
            let Some(name) = declarator.name() else {
                continue;
            };
            let ty = match declared.as_deref() {
                Some("var") => declarator
                    .initializer()
                    .and_then(|init| self.expr_type(&init, Some(symbols)))
                    .unwrap_or_else(|| TypeDescriptor::error("var")),
                Some(text) => self.resolve_type_name(text),
                None => TypeDescriptor::error("?"),
            };
            symbols.insert(name.text().to_string(), ty);
        }
    }

    /// Resolve a type as written
    pub fn resolve_type_name(&self, text: &str) -> TypeDescriptor {
        let text = text.trim();

        if let Some(element) = text.strip_suffix("[]") {
            if self.resolve_type_name(element).is_error_type() {
                return TypeDescriptor::error(text);
            }
            let mut array = TypeDescriptor::reference(text).with_interface("IEnumerable");
            array.is_array = true;
            return array;
        }

        if let Some(inner) = text.strip_suffix('?') {
            let inner = self.resolve_type_name(inner);
            return match inner.kind {
                TypeKind::Value => TypeDescriptor::value(text),
                _ => inner,
            };
        }

        if let Some((base, args)) = split_generic(text) {
            if args.iter().any(|arg| self.resolve_type_name(arg).is_error_type()) {
                return TypeDescriptor::error(text);
            }
            if COLLECTION_TYPES.contains(&base) {
                let mut ty = TypeDescriptor::reference(text).with_interface("IEnumerable");
                ty.constructed_from = Some(format!("{base}<T>"));
                return ty;
            }
            if base == "Dictionary" || self.classes.contains(base) {
                return TypeDescriptor::reference(text);
            }
            return TypeDescriptor::error(text);
        }

        match text {
            "void" => TypeDescriptor::void(),
            "string" | "object" | "dynamic" => TypeDescriptor::reference(text),
            "bool" | "char" | "int" | "long" | "short" | "byte" | "uint" | "ulong" | "ushort"
            | "sbyte" | "float" | "double" | "decimal" => TypeDescriptor::value(text),
            "IEnumerable" => TypeDescriptor::reference(text).with_interface("IEnumerable"),
            _ if FRAMEWORK_REFERENCE_TYPES.contains(&text) => TypeDescriptor::reference(text),
            _ if self.classes.contains(text) => TypeDescriptor::reference(text),
            _ => TypeDescriptor::error(text),
        }
    }

    fn scope_for(&self, range: TextRange) -> Option<&Symbols> {
        self.scopes
            .iter()
            .filter(|s| s.range.contains_range(range))
            .max_by_key(|s| s.range.start())
            .map(|s| &s.symbols)
    }

    fn lookup_name(&self, name: &str, scope: Option<&Symbols>) -> Option<TypeDescriptor> {
        scope
            .and_then(|symbols| symbols.get(name))
            .or_else(|| self.globals.get(name))
            .cloned()
    }

    fn expr_type(&self, expr: &Expr, scope: Option<&Symbols>) -> Option<TypeDescriptor> {
        match expr {
            Expr::Name(name) => self.lookup_name(&name.name()?, scope),
            Expr::Literal(literal) => match literal.literal_kind()? {
                SyntaxKind::IntLiteral => Some(TypeDescriptor::value("int")),
                SyntaxKind::StringLiteral => Some(TypeDescriptor::reference("string")),
                SyntaxKind::TrueKw | SyntaxKind::FalseKw => Some(TypeDescriptor::value("bool")),
                _ => None,
            },
            Expr::Call(call) => self.call_type(call, scope),
            Expr::Member(_) => None,
            Expr::Cast(cast) => Some(self.declared_type(cast.type_ref())),
            Expr::Paren(paren) => self.expr_type(&paren.inner()?, scope),
            Expr::Binary(binary) => match binary.op_kind()? {
                SyntaxKind::EqEq
                | SyntaxKind::BangEq
                | SyntaxKind::Lt
                | SyntaxKind::Gt
                | SyntaxKind::LtEq
                | SyntaxKind::GtEq
                | SyntaxKind::AmpAmp
                | SyntaxKind::PipePipe => Some(TypeDescriptor::value("bool")),
                SyntaxKind::QuestionQuestion => binary
                    .lhs()
                    .and_then(|lhs| self.expr_type(&lhs, scope))
                    .or_else(|| binary.rhs().and_then(|rhs| self.expr_type(&rhs, scope))),
                SyntaxKind::Plus => {
                    let lhs = binary.lhs().and_then(|lhs| self.expr_type(&lhs, scope));
                    let rhs = binary.rhs().and_then(|rhs| self.expr_type(&rhs, scope));
                    if lhs.as_ref().is_some_and(TypeDescriptor::is_string)
                        || rhs.as_ref().is_some_and(TypeDescriptor::is_string)
                    {
                        Some(TypeDescriptor::reference("string"))
                    } else {
                        lhs
                    }
                }
                _ => binary.lhs().and_then(|lhs| self.expr_type(&lhs, scope)),
            },
            Expr::Prefix(prefix) => match prefix.op_kind()? {
                SyntaxKind::Bang => Some(TypeDescriptor::value("bool")),
                _ => self.expr_type(&prefix.operand()?, scope),
            },
            Expr::Conditional(conditional) => conditional
                .when_true()
                .and_then(|e| self.expr_type(&e, scope))
                .or_else(|| conditional.when_false().and_then(|e| self.expr_type(&e, scope))),
            Expr::Assign(assign) => self.expr_type(&assign.lhs()?, scope),
        }
    }

    fn call_type(&self, call: &ast::CallExpr, scope: Option<&Symbols>) -> Option<TypeDescriptor> {
        match call.callee()? {
            Expr::Name(name) => {
                let name = name.name()?;
                if name == "default" {
                    let arg = call.args().next()?;
                    return Some(self.resolve_type_name(&ast::significant_text(arg.syntax())));
                }
                self.methods.get(&name).cloned()
            }
            Expr::Member(member) => {
                let method = member.name()?.text().to_string();
                let receiver = member.receiver().and_then(|r| self.expr_type(&r, scope));
                match method.as_str() {
                    "ToString" => Some(TypeDescriptor::reference("string")),
                    "ToList" => {
                        let element = element_type(receiver.as_ref()?);
                        Some(self.resolve_type_name(&format!("List<{element}>")))
                    }
                    "ToArray" => {
                        let element = element_type(receiver.as_ref()?);
                        Some(self.resolve_type_name(&format!("{element}[]")))
                    }
                    _ => self.methods.get(&method).cloned(),
                }
            }
            _ => None,
        }
    }

    fn check_return_paths(&self, method: &MethodDecl) -> Option<CompilerDiagnostic> {
        let return_type = self.declared_type(method.return_type());
        if return_type.is_void_like() {
            return None;
        }
        let body = method.body()?;
        let is_iterator = body.syntax().descendants().any(|n| {
            matches!(
                n.kind(),
                SyntaxKind::YieldReturnStmt | SyntaxKind::YieldBreakStmt
            )
        });
        if is_iterator || body.statements().any(|s| always_exits(&s)) {
            return None;
        }

        let name = method.name()?;
        Some(CompilerDiagnostic {
            id: NOT_ALL_PATHS_RETURN.to_string(),
            message: format!("'{}': not all code paths return a value", name.text()),
            range: name.text_range(),
        })
    }
}

/// Whether control never reaches the end of `stmt`
fn always_exits(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Return(_) | Stmt::Throw(_) => true,
        Stmt::Block(block) => block.statements().any(|s| always_exits(&s)),
        Stmt::If(if_stmt) => {
            let then_exits = if_stmt.then_branch().is_some_and(|s| always_exits(&s));
            let else_exits = if_stmt
                .else_clause()
                .and_then(|e| e.statement())
                .is_some_and(|s| always_exits(&s));
            then_exits && else_exits
        }
        _ => false,
    }
}

/// `("List", ["int"])` for `List<int>`
fn split_generic(text: &str) -> Option<(&str, Vec<&str>)> {
    let open = text.find('<')?;
    let inner = text.strip_suffix('>')?.get(open + 1..)?;
    let base = &text[..open];

    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (index, ch) in inner.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                args.push(inner[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }
    args.push(inner[start..].trim());
    Some((base, args))
}

fn element_type(collection: &TypeDescriptor) -> String {
    if let Some(element) = collection.name.strip_suffix("[]") {
        return element.to_string();
    }
    match split_generic(&collection.name) {
        Some((_, args)) if args.len() == 1 => args[0].to_string(),
        _ => "object".to_string(),
    }
}

fn is_interface_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next() == Some('I') && chars.next().is_some_and(char::is_uppercase)
}

impl TypeOracle for DeclarationOracle {
    fn type_of(&self, node: &SyntaxNode) -> Option<TypeDescriptor> {
        let scope = self.scope_for(node.text_range());
        match node.kind() {
            kind if kind.is_expression() => self.expr_type(&Expr::cast(node.clone())?, scope),
            SyntaxKind::TypeRef => Some(self.resolve_type_name(&TypeRef::cast(node.clone())?.text())),
            SyntaxKind::VarDeclarator => {
                let declarator = VarDeclarator::cast(node.clone())?;
                self.lookup_name(declarator.name()?.text(), scope)
            }
            SyntaxKind::MethodDecl => Some(self.declared_type(MethodDecl::cast(node.clone())?.return_type())),
            SyntaxKind::Param => Some(self.declared_type(Param::cast(node.clone())?.type_ref())),
            SyntaxKind::LocalDeclStmt => Some(self.declared_type(LocalDeclStmt::cast(node.clone())?.type_ref())),
            _ => None,
        }
    }

    fn is_explicitly_convertible(&self, expr: &SyntaxNode, target: &TypeDescriptor) -> bool {
        let Some(source) = self.type_of(expr) else {
            return false;
        };
        if source.is_error_type()
            || target.is_error_type()
            || source.is_void_like()
            || target.is_void_like()
        {
            return false;
        }
        if source.name == target.name {
            return true;
        }
        if source.is_numeric() && target.is_numeric() {
            return true;
        }
        if source.name == "object" || target.name == "object" {
            return true;
        }
        if source.is_string() || target.is_string() {
            return false;
        }
        source.is_reference_type()
            && target.is_reference_type()
            && (is_interface_name(&source.name) || is_interface_name(&target.name))
    }

    fn lookup_well_known_type(&self, name: &str) -> Option<TypeDescriptor> {
        let descriptor = match name {
            "System.String" => TypeDescriptor::reference("string"),
            "System.Object" => TypeDescriptor::reference("object"),
            "System.Boolean" => TypeDescriptor::value("bool"),
            "System.Int32" => TypeDescriptor::value("int"),
            "System.Linq.Enumerable" => TypeDescriptor::reference("Enumerable"),
            "System.Collections.Generic.List`1" => {
                let mut list = TypeDescriptor::reference("List<T>").with_interface("IEnumerable");
                list.constructed_from = Some("List<T>".to_string());
                list
            }
            "System.Collections.Generic.IEnumerable`1" => {
                TypeDescriptor::reference("IEnumerable<T>").with_interface("IEnumerable")
            }
            _ => return None,
        };
        Some(descriptor)
    }

    fn compiler_diagnostics(&self, range: TextRange) -> Vec<CompilerDiagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.range.intersect(range).is_some())
            .cloned()
            .collect()
    }
}
