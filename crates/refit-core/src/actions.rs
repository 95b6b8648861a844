//! Candidate actions, providers and deduplication
//!
//! Providers never edit anything while computing candidates. They register
//! [`CodeAction`]s whose [`Rewrite`] value captures only the target identity
//! and the data needed to run later against whichever snapshot is current.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use indexmap::IndexMap;
use rowan::TextRange;
use tracing::{debug, error, warn};

use crate::cancel::CancellationToken;
use crate::config::{Enablement, FormattingOptions};
use crate::diagnostics::Diagnostic;
use crate::dispatch::panic_message;
use crate::error::ErrorKind;
use crate::rewrite::Rewritten;
use crate::semantic::{Semantics, TypeOracle};
use crate::snapshot::Snapshot;
use crate::syntax::SyntaxNode;
use crate::{RefitError, Result};

/// Everything a rewrite may consult when it runs
pub struct ApplyContext<'a> {
    pub semantics: Semantics<'a>,
    pub formatting: &'a FormattingOptions,
}

/// A deferred tree transformation
///
/// `apply` must re-validate its target against `snapshot` and fail with
/// `StaleTarget` or `PreconditionFailed` rather than guess.
pub trait Rewrite: Send + Sync + fmt::Debug {
    fn apply(&self, snapshot: &Snapshot, cx: &ApplyContext<'_>) -> Result<Rewritten>;
}

/// String that merges candidate actions describing the same fix
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EquivalenceKey(String);

impl EquivalenceKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// `<diagnostic id>.<provider id>`
    pub fn for_fix(diagnostic_id: &str, provider_id: &str) -> Self {
        Self(format!("{diagnostic_id}.{provider_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EquivalenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Fix,
    Refactoring,
}

/// An offered, not yet applied transformation
#[derive(Clone)]
pub struct CodeAction {
    title: String,
    equivalence_key: EquivalenceKey,
    kind: ActionKind,
    rewrite: Arc<dyn Rewrite>,
}

impl CodeAction {
    pub fn new(
        title: impl Into<String>,
        equivalence_key: EquivalenceKey,
        kind: ActionKind,
        rewrite: Arc<dyn Rewrite>,
    ) -> Self {
        Self {
            title: title.into(),
            equivalence_key,
            kind,
            rewrite,
        }
    }

    pub fn fix(title: impl Into<String>, key: EquivalenceKey, rewrite: impl Rewrite + 'static) -> Self {
        Self::new(title, key, ActionKind::Fix, Arc::new(rewrite))
    }

    pub fn refactoring(title: impl Into<String>, key: EquivalenceKey, rewrite: impl Rewrite + 'static) -> Self {
        Self::new(title, key, ActionKind::Refactoring, Arc::new(rewrite))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn equivalence_key(&self) -> &EquivalenceKey {
        &self.equivalence_key
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn rewrite(&self) -> &dyn Rewrite {
        self.rewrite.as_ref()
    }
}

impl fmt::Debug for CodeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeAction")
            .field("title", &self.title)
            .field("equivalence_key", &self.equivalence_key)
            .field("kind", &self.kind)
            .field("rewrite", &self.rewrite)
            .finish()
    }
}

/// Ordered actions keyed by equivalence key; the first registration wins
#[derive(Debug, Clone, Default)]
pub struct ActionSet {
    actions: IndexMap<EquivalenceKey, CodeAction>,
}

impl ActionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when an action with the same key is already present
    pub fn register(&mut self, action: CodeAction) -> bool {
        if self.actions.contains_key(action.equivalence_key()) {
            debug!(
                "Dropping duplicate action '{}' ({})",
                action.title(),
                action.equivalence_key()
            );
            return false;
        }
        self.actions.insert(action.equivalence_key().clone(), action);
        true
    }

    /// Merge `other` into `self`, keeping existing entries
    pub fn merge(&mut self, other: ActionSet) {
        for action in other.actions.into_values() {
            self.register(action);
        }
    }

    pub fn get(&self, key: &EquivalenceKey) -> Option<&CodeAction> {
        self.actions.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CodeAction> {
        self.actions.values()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn into_vec(self) -> Vec<CodeAction> {
        self.actions.into_values().collect()
    }
}

/// Inputs of one candidate computation
pub struct ActionRequest<'a> {
    pub snapshot: &'a Snapshot,
    pub span: TextRange,
    /// Analyzer diagnostics of `snapshot`; compiler diagnostics are added from the oracle
    pub diagnostics: &'a [Diagnostic],
    pub oracle: &'a dyn TypeOracle,
    pub enablement: &'a Enablement,
    pub formatting: &'a FormattingOptions,
    pub cancel: &'a CancellationToken,
}

impl<'a> ActionRequest<'a> {
    fn semantics(&self) -> Semantics<'a> {
        Semantics::new(self.oracle, self.cancel)
    }
}

/// Read-only bundle handed to a code fix provider
pub struct FixContext<'a> {
    snapshot: &'a Snapshot,
    root: SyntaxNode,
    span: TextRange,
    diagnostics: Vec<&'a Diagnostic>,
    semantics: Semantics<'a>,
    enablement: &'a Enablement,
    formatting: &'a FormattingOptions,
}

impl<'a> FixContext<'a> {
    pub fn snapshot(&self) -> &'a Snapshot {
        self.snapshot
    }

    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    pub fn span(&self) -> TextRange {
        self.span
    }

    /// Diagnostics routed to this provider, in report order
    pub fn diagnostics(&self) -> &[&'a Diagnostic] {
        &self.diagnostics
    }

    pub fn semantics(&self) -> Semantics<'a> {
        self.semantics
    }

    pub fn enablement(&self) -> &'a Enablement {
        self.enablement
    }

    pub fn formatting(&self) -> &'a FormattingOptions {
        self.formatting
    }

    pub fn cancellation(&self) -> &'a CancellationToken {
        self.semantics.cancellation()
    }
}

/// Read-only bundle handed to a refactoring provider
pub struct RefactoringContext<'a> {
    snapshot: &'a Snapshot,
    root: SyntaxNode,
    span: TextRange,
    semantics: Semantics<'a>,
    enablement: &'a Enablement,
    formatting: &'a FormattingOptions,
}

impl<'a> RefactoringContext<'a> {
    pub fn snapshot(&self) -> &'a Snapshot {
        self.snapshot
    }

    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    pub fn span(&self) -> TextRange {
        self.span
    }

    pub fn semantics(&self) -> Semantics<'a> {
        self.semantics
    }

    pub fn enablement(&self) -> &'a Enablement {
        self.enablement
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        self.enablement.is_enabled(id)
    }

    pub fn formatting(&self) -> &'a FormattingOptions {
        self.formatting
    }

    pub fn cancellation(&self) -> &'a CancellationToken {
        self.semantics.cancellation()
    }
}

/// Offers fixes for diagnostics it declares fixable
pub trait CodeFixProvider: Send + Sync {
    fn id(&self) -> &'static str;

    fn fixable_diagnostic_ids(&self) -> &'static [&'static str];

    fn register_code_fixes(&self, cx: &FixContext<'_>, actions: &mut ActionSet) -> Result<()>;
}

/// Offers span-triggered refactorings
pub trait RefactoringProvider: Send + Sync {
    fn id(&self) -> &'static str;

    /// Ids gating this provider; it runs when any of them is enabled
    fn refactoring_ids(&self) -> &'static [&'static str];

    fn compute_refactorings(&self, cx: &RefactoringContext<'_>, actions: &mut ActionSet) -> Result<()>;
}

/// Registered fix and refactoring providers
#[derive(Default)]
pub struct ActionRegistry {
    fixes: Vec<Box<dyn CodeFixProvider>>,
    refactorings: Vec<Box<dyn RefactoringProvider>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_fix_provider(&mut self, provider: impl CodeFixProvider + 'static) {
        self.fixes.push(Box::new(provider));
    }

    pub fn add_refactoring_provider(&mut self, provider: impl RefactoringProvider + 'static) {
        self.refactorings.push(Box::new(provider));
    }

    pub fn fix_providers(&self) -> impl Iterator<Item = &dyn CodeFixProvider> {
        self.fixes.iter().map(|p| p.as_ref())
    }

    pub fn refactoring_providers(&self) -> impl Iterator<Item = &dyn RefactoringProvider> {
        self.refactorings.iter().map(|p| p.as_ref())
    }

    /// Fixes for the enabled diagnostics intersecting `request.span`
    pub fn collect_fixes(&self, request: &ActionRequest<'_>) -> Result<Vec<CodeAction>> {
        request.cancel.check()?;
        let semantics = request.semantics();

        let compiler: Vec<Diagnostic> = semantics
            .compiler_diagnostics(request.span)?
            .iter()
            .map(|d| Diagnostic::from_compiler(request.snapshot.id(), d))
            .collect();

        let candidates: Vec<&Diagnostic> = request
            .diagnostics
            .iter()
            .chain(compiler.iter())
            .filter(|d| d.location.snapshot == request.snapshot.id())
            .filter(|d| d.range().intersect(request.span).is_some())
            .filter(|d| request.enablement.is_enabled(&d.id))
            .collect();
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let root = request.snapshot.root();
        let mut actions = ActionSet::new();
        for provider in &self.fixes {
            request.cancel.check()?;
            let routed: Vec<&Diagnostic> = candidates
                .iter()
                .copied()
                .filter(|d| provider.fixable_diagnostic_ids().iter().any(|id| *id == d.id))
                .collect();
            if routed.is_empty() {
                continue;
            }

            let cx = FixContext {
                snapshot: request.snapshot,
                root: root.clone(),
                span: request.span,
                diagnostics: routed,
                semantics,
                enablement: request.enablement,
                formatting: request.formatting,
            };
            let mut local = ActionSet::new();
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                provider.register_code_fixes(&cx, &mut local)
            }));
            if accept(provider.id(), outcome)? {
                actions.merge(local);
            }
        }
        Ok(actions.into_vec())
    }

    /// Refactorings applicable at `request.span`
    pub fn collect_refactorings(&self, request: &ActionRequest<'_>) -> Result<Vec<CodeAction>> {
        request.cancel.check()?;
        let semantics = request.semantics();
        let root = request.snapshot.root();

        let mut actions = ActionSet::new();
        for provider in &self.refactorings {
            request.cancel.check()?;
            if !request.enablement.is_any_enabled(provider.refactoring_ids()) {
                debug!("Refactoring provider '{}' is disabled", provider.id());
                continue;
            }

            let cx = RefactoringContext {
                snapshot: request.snapshot,
                root: root.clone(),
                span: request.span,
                semantics,
                enablement: request.enablement,
                formatting: request.formatting,
            };
            let mut local = ActionSet::new();
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                provider.compute_refactorings(&cx, &mut local)
            }));
            if accept(provider.id(), outcome)? {
                actions.merge(local);
            }
        }
        Ok(actions.into_vec())
    }
}

/// Whether a provider's output should be kept; cancellation propagates
fn accept(provider: &str, outcome: std::thread::Result<Result<()>>) -> Result<bool> {
    match outcome {
        Ok(Ok(())) => Ok(true),
        Ok(Err(RefitError::Cancelled)) => Err(RefitError::Cancelled),
        Ok(Err(err)) => {
            match err.kind() {
                ErrorKind::UnexpectedKind => error!("Provider '{}' contract violation: {}", provider, err),
                ErrorKind::PreconditionFailed => debug!("Provider '{}' skipped: {}", provider, err),
                _ => warn!("Provider '{}' failed: {}", provider, err),
            }
            Ok(false)
        }
        Err(payload) => {
            error!(
                "Provider '{}' panicked: {}",
                provider,
                panic_message(payload.as_ref())
            );
            Ok(false)
        }
    }
}
