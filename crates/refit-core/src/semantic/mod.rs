//! Semantic-query surface used by analyzers, providers and rewrites
//!
//! [`TypeOracle`] is the seam to whatever semantic model the host has. The
//! engine wraps it in [`Semantics`], which checks the cancellation token
//! before every query.

mod declared;

pub use declared::{DeclarationOracle, NOT_ALL_PATHS_RETURN};

use std::sync::Arc;

use rowan::TextRange;
use serde::Serialize;

use crate::cancel::CancellationToken;
use crate::snapshot::Snapshot;
use crate::syntax::SyntaxNode;
use crate::Result;

/// Classification of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Void,
    Reference,
    Value,
    /// Unresolvable type
    Error,
}

/// A resolved type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeDescriptor {
    /// Display name as written (`string`, `List<int>`, `Foo[]`)
    pub name: String,
    pub kind: TypeKind,
    /// Interfaces the type implements, by simple name
    pub interfaces: Vec<String>,
    pub is_array: bool,
    /// Generic definition for constructed types (`List<T>` for `List<int>`)
    pub constructed_from: Option<String>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            interfaces: Vec::new(),
            is_array: false,
            constructed_from: None,
        }
    }

    pub fn void() -> Self {
        Self::new("void", TypeKind::Void)
    }

    pub fn error(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Error)
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Reference)
    }

    pub fn value(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Value)
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn is_void_like(&self) -> bool {
        self.kind == TypeKind::Void
    }

    pub fn is_reference_type(&self) -> bool {
        self.kind == TypeKind::Reference
    }

    pub fn is_error_type(&self) -> bool {
        self.kind == TypeKind::Error
    }

    pub fn implements_enumerable(&self) -> bool {
        self.is_array
            || self.name == "IEnumerable"
            || self.name.starts_with("IEnumerable<")
            || self.interfaces.iter().any(|i| i == "IEnumerable")
    }

    pub fn is_string(&self) -> bool {
        self.name == "string"
    }

    pub fn is_bool(&self) -> bool {
        self.name == "bool"
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self.name.as_str(),
            "int" | "long" | "short" | "byte" | "uint" | "ulong" | "ushort" | "sbyte"
                | "float" | "double" | "decimal"
        )
    }
}

/// A diagnostic produced by the compiler front end rather than an analyzer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilerDiagnostic {
    pub id: String,
    pub message: String,
    #[serde(skip)]
    pub range: TextRange,
}

/// Query surface over a semantic model
///
/// One oracle answers for exactly one snapshot; nodes passed in must come from
/// that snapshot's tree.
pub trait TypeOracle: Send + Sync {
    /// Static type of an expression, declaration or type reference
    fn type_of(&self, node: &SyntaxNode) -> Option<TypeDescriptor>;

    /// Whether an explicit conversion from `expr`'s type to `target` exists
    fn is_explicitly_convertible(&self, expr: &SyntaxNode, target: &TypeDescriptor) -> bool;

    /// Well-known type by metadata name (`System.String`, `System.Linq.Enumerable`)
    fn lookup_well_known_type(&self, name: &str) -> Option<TypeDescriptor>;

    /// Compiler diagnostics intersecting `range`
    fn compiler_diagnostics(&self, range: TextRange) -> Vec<CompilerDiagnostic> {
        let _ = range;
        Vec::new()
    }
}

/// Builds the oracle for a snapshot
pub type OracleProvider = Arc<dyn Fn(&Snapshot) -> Arc<dyn TypeOracle> + Send + Sync>;

/// Default provider: derive types from declarations in the tree
pub fn declaration_oracle_provider() -> OracleProvider {
    Arc::new(|snapshot: &Snapshot| Arc::new(DeclarationOracle::new(snapshot)) as Arc<dyn TypeOracle>)
}

/// Cancellation-aware accessor handed to callbacks
#[derive(Clone, Copy)]
pub struct Semantics<'a> {
    oracle: &'a dyn TypeOracle,
    cancel: &'a CancellationToken,
}

impl<'a> Semantics<'a> {
    pub fn new(oracle: &'a dyn TypeOracle, cancel: &'a CancellationToken) -> Self {
        Self { oracle, cancel }
    }

    pub fn cancellation(&self) -> &'a CancellationToken {
        self.cancel
    }

    pub fn oracle(&self) -> &'a dyn TypeOracle {
        self.oracle
    }

    pub fn type_of(&self, node: &SyntaxNode) -> Result<Option<TypeDescriptor>> {
        self.cancel.check()?;
        Ok(self.oracle.type_of(node))
    }

    pub fn is_explicitly_convertible(&self, expr: &SyntaxNode, target: &TypeDescriptor) -> Result<bool> {
        self.cancel.check()?;
        Ok(self.oracle.is_explicitly_convertible(expr, target))
    }

    pub fn lookup_well_known_type(&self, name: &str) -> Result<Option<TypeDescriptor>> {
        self.cancel.check()?;
        Ok(self.oracle.lookup_well_known_type(name))
    }

    pub fn compiler_diagnostics(&self, range: TextRange) -> Result<Vec<CompilerDiagnostic>> {
        self.cancel.check()?;
        Ok(self.oracle.compiler_diagnostics(range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl TypeOracle for Fixed {
        fn type_of(&self, _node: &SyntaxNode) -> Option<TypeDescriptor> {
            Some(TypeDescriptor::void())
        }

        fn is_explicitly_convertible(&self, _expr: &SyntaxNode, _target: &TypeDescriptor) -> bool {
            false
        }

        fn lookup_well_known_type(&self, _name: &str) -> Option<TypeDescriptor> {
            None
        }
    }

    #[test]
    fn test_descriptor_predicates() {
        assert!(TypeDescriptor::void().is_void_like());
        assert!(TypeDescriptor::reference("string").is_reference_type());
        assert!(TypeDescriptor::error("Missing").is_error_type());
        assert!(
            TypeDescriptor::reference("List<int>")
                .with_interface("IEnumerable")
                .implements_enumerable()
        );
        assert!(TypeDescriptor::reference("IEnumerable<int>").implements_enumerable());
        assert!(!TypeDescriptor::value("int").implements_enumerable());
        assert!(TypeDescriptor::value("double").is_numeric());
    }

    #[test]
    fn test_semantics_checks_cancellation() {
        let cancel = CancellationToken::new();
        let semantics = Semantics::new(&Fixed, &cancel);
        let node = crate::syntax::parse("x;").syntax();
        assert!(semantics.type_of(&node).unwrap().is_some());

        cancel.cancel();
        assert!(semantics.type_of(&node).unwrap_err().is_cancelled());
        assert!(semantics.lookup_well_known_type("System.String").is_err());
    }
}
