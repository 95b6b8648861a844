//! REFIT Core
//!
//! Analysis and rewrite engine for a C#-like language. This crate provides
//! the lossless syntax tree, the type oracle seam, per-node diagnostic
//! dispatch, candidate-action registration and the trivia-preserving rewrite
//! engine that rule crates build on.

pub mod actions;
pub mod cancel;
pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod resolve;
pub mod result;
pub mod rewrite;
pub mod semantic;
pub mod session;
pub mod snapshot;
pub mod syntax;

// Re-export commonly used types
pub use actions::{
    ActionKind, ActionRegistry, ActionRequest, ActionSet, ApplyContext, CodeAction, CodeFixProvider,
    EquivalenceKey, FixContext, RefactoringContext, RefactoringProvider, Rewrite,
};
pub use cancel::CancellationToken;
pub use config::{
    AnalysisConfig, ConfigLoader, Enablement, FormattingOptions, Newline, RefitConfig, RuleSeverity,
};
pub use diagnostics::{Diagnostic, DiagnosticDescriptor, Location, Severity};
pub use dispatch::{
    AnalysisContext, AnalysisOptions, Analyzer, AnalyzerRegistry, NodeContext, Reporter,
};
pub use error::{ErrorKind, RefitError};
pub use resolve::{find_node, resolve_statement};
pub use result::{Result, ResultExt};
pub use rewrite::{Replacement, Rewritten, replace, replace_text, replace_with_sequence};
pub use semantic::{
    CompilerDiagnostic, DeclarationOracle, OracleProvider, Semantics, TypeDescriptor, TypeKind,
    TypeOracle,
};
pub use session::{Applied, Session};
pub use snapshot::{LineIndex, NodePath, NodeTarget, Snapshot, SnapshotId, TextTarget};

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("refit=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
