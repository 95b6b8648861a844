//! Minimal host session: one document, one current snapshot

use std::sync::Arc;

use rowan::{GreenNode, TextRange};
use tracing::{debug, info};

use crate::actions::{ActionRegistry, ActionRequest, ApplyContext, CodeAction};
use crate::cancel::CancellationToken;
use crate::config::{Enablement, FormattingOptions, RefitConfig};
use crate::diagnostics::Diagnostic;
use crate::dispatch::{AnalysisOptions, AnalyzerRegistry};
use crate::semantic::{OracleProvider, Semantics, TypeOracle, declaration_oracle_provider};
use crate::snapshot::{Snapshot, SnapshotId};
use crate::Result;

/// Result of installing a new snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub from: SnapshotId,
    pub to: SnapshotId,
    pub needs_formatting: Vec<TextRange>,
}

/// Owns the current snapshot of one document
///
/// Mutation takes `&mut self`, so rewrites on one session never interleave.
pub struct Session {
    current: Snapshot,
    oracle: Arc<dyn TypeOracle>,
    oracle_provider: OracleProvider,
    enablement: Arc<Enablement>,
    formatting: FormattingOptions,
}

impl Session {
    /// Session over `text` with the declaration oracle and the global enablement
    pub fn new(text: &str) -> Self {
        let provider = declaration_oracle_provider();
        let current = Snapshot::parse(text);
        let oracle = provider(&current);
        Self {
            current,
            oracle,
            oracle_provider: provider,
            enablement: Enablement::global(),
            formatting: FormattingOptions::default(),
        }
    }

    /// Session configured from a loaded config file
    pub fn with_config(text: &str, config: &RefitConfig) -> Self {
        Self::new(text)
            .with_enablement(Arc::new(Enablement::from_config(config)))
            .with_formatting(config.formatting.clone())
    }

    pub fn with_enablement(mut self, enablement: Arc<Enablement>) -> Self {
        self.enablement = enablement;
        self
    }

    pub fn with_formatting(mut self, formatting: FormattingOptions) -> Self {
        self.formatting = formatting;
        self
    }

    pub fn with_oracle_provider(mut self, provider: OracleProvider) -> Self {
        self.oracle = provider(&self.current);
        self.oracle_provider = provider;
        self
    }

    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    pub fn source_text(&self) -> &str {
        self.current.text()
    }

    pub fn oracle(&self) -> &dyn TypeOracle {
        self.oracle.as_ref()
    }

    pub fn enablement(&self) -> &Arc<Enablement> {
        &self.enablement
    }

    pub fn formatting(&self) -> &FormattingOptions {
        &self.formatting
    }

    /// Install an edited tree as the current snapshot
    pub fn with_new_tree(&mut self, green: GreenNode) -> Applied {
        self.install(Snapshot::from_green(green), Vec::new())
    }

    /// Install reparsed text as the current snapshot
    pub fn with_new_text(&mut self, text: &str) -> Applied {
        self.install(Snapshot::parse(text), Vec::new())
    }

    fn install(&mut self, snapshot: Snapshot, needs_formatting: Vec<TextRange>) -> Applied {
        let from = self.current.id();
        let to = snapshot.id();
        self.oracle = (self.oracle_provider)(&snapshot);
        self.current = snapshot;
        debug!("Session moved {} -> {}", from, to);
        Applied {
            from,
            to,
            needs_formatting,
        }
    }

    /// Run every registered analyzer over the current snapshot
    pub fn analyze(
        &self,
        registry: &AnalyzerRegistry,
        options: &AnalysisOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<Diagnostic>> {
        registry.analyze(
            &self.current,
            self.oracle.as_ref(),
            &self.enablement,
            options,
            cancel,
        )
    }

    /// Request for candidate actions at `span` of the current snapshot
    pub fn request<'a>(
        &'a self,
        span: TextRange,
        diagnostics: &'a [Diagnostic],
        cancel: &'a CancellationToken,
    ) -> ActionRequest<'a> {
        ActionRequest {
            snapshot: &self.current,
            span,
            diagnostics,
            oracle: self.oracle.as_ref(),
            enablement: &self.enablement,
            formatting: &self.formatting,
            cancel,
        }
    }

    /// Fixes and refactorings at `span`, fixes first
    pub fn actions_at(
        &self,
        registry: &ActionRegistry,
        span: TextRange,
        diagnostics: &[Diagnostic],
        cancel: &CancellationToken,
    ) -> Result<Vec<CodeAction>> {
        let request = self.request(span, diagnostics, cancel);
        let mut actions = registry.collect_fixes(&request)?;
        actions.extend(registry.collect_refactorings(&request)?);
        Ok(actions)
    }

    /// Execute `action` against the current snapshot
    ///
    /// Fails with `StaleTarget` when the action was computed for another
    /// snapshot; the session is left unchanged on any error.
    pub fn apply(&mut self, action: &CodeAction, cancel: &CancellationToken) -> Result<Applied> {
        cancel.check()?;
        let rewritten = {
            let cx = ApplyContext {
                semantics: Semantics::new(self.oracle.as_ref(), cancel),
                formatting: &self.formatting,
            };
            action.rewrite().apply(&self.current, &cx)?
        };
        cancel.check()?;
        info!("Applied '{}'", action.title());
        Ok(self.install(rewritten.snapshot, rewritten.needs_formatting))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{EquivalenceKey, Rewrite};
    use crate::rewrite::{Replacement, Rewritten, replace};
    use crate::snapshot::NodeTarget;
    use crate::syntax::{SyntaxKind, factory};

    #[derive(Debug)]
    struct RenameFirstStatement {
        target: NodeTarget,
    }

    impl Rewrite for RenameFirstStatement {
        fn apply(&self, snapshot: &Snapshot, _cx: &ApplyContext<'_>) -> Result<Rewritten> {
            let stmt = factory::expr_stmt(&factory::name_expr("renamed"));
            replace(snapshot, &self.target, Replacement::new(stmt))
        }
    }

    fn action(session: &Session) -> CodeAction {
        let snapshot = session.current();
        let stmt = snapshot
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::ExprStmt)
            .unwrap();
        CodeAction::fix(
            "Rename",
            EquivalenceKey::new("rename"),
            RenameFirstStatement {
                target: NodeTarget::new(snapshot, &stmt),
            },
        )
    }

    #[test]
    fn test_apply_moves_to_new_snapshot() {
        let mut session = Session::new("a; b;");
        let before = session.current().id();
        let action = action(&session);

        let applied = session.apply(&action, &CancellationToken::new()).unwrap();
        assert_eq!(applied.from, before);
        assert_eq!(applied.to, session.current().id());
        assert_eq!(session.source_text(), "renamed; b;");

        let err = session.apply(&action, &CancellationToken::new()).unwrap_err();
        assert!(matches!(err, crate::RefitError::StaleTarget { .. }));
        assert_eq!(session.source_text(), "renamed; b;");
    }

    #[test]
    fn test_cancelled_apply_leaves_session_untouched() {
        let mut session = Session::new("a;");
        let action = action(&session);
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(session.apply(&action, &cancel).unwrap_err().is_cancelled());
        assert_eq!(session.source_text(), "a;");
    }

    #[test]
    fn test_with_new_text() {
        let mut session = Session::new("a;");
        let applied = session.with_new_text("b;");
        assert_ne!(applied.from, applied.to);
        assert_eq!(session.source_text(), "b;");
    }
}
