//! Per-node-kind diagnostic dispatch
//!
//! Analyzers register callbacks for node kinds during
//! [`Analyzer::initialize`]. [`AnalyzerRegistry::analyze`] walks the tree once
//! in pre-order and invokes, for every node, the callbacks registered for its
//! kind in registration order. Callbacks only read; they report through a
//! [`Reporter`] whose output is kept only when the callback succeeds.
//!
//! With `parallel` set, nodes are distributed over the rayon pool. Each worker
//! builds its own red root over the shared green tree and re-finds nodes by
//! [`NodePath`], so output order is identical to the sequential walk.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use rayon::prelude::*;
use rowan::TextRange;
use tracing::{debug, error, warn};

use crate::cancel::CancellationToken;
use crate::config::{AnalysisConfig, Enablement};
use crate::diagnostics::{Diagnostic, DiagnosticDescriptor, Location};
use crate::semantic::{Semantics, TypeOracle};
use crate::snapshot::{NodePath, Snapshot};
use crate::syntax::trivia::leading_trivia;
use crate::syntax::{SyntaxKind, SyntaxNode};
use crate::{RefitError, Result};

/// Callback invoked for every node of a registered kind
pub type NodeCallback = Arc<dyn Fn(&NodeContext<'_>, &mut Reporter<'_>) -> Result<()> + Send + Sync>;

/// A source of diagnostics
pub trait Analyzer: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Every descriptor this analyzer may report
    fn supported_diagnostics(&self) -> Vec<DiagnosticDescriptor>;

    /// Register node callbacks
    fn initialize(&self, context: &mut AnalysisContext);
}

/// Registration surface handed to [`Analyzer::initialize`]
pub struct AnalysisContext {
    registrations: Vec<(Vec<SyntaxKind>, NodeCallback)>,
}

impl AnalysisContext {
    fn new() -> Self {
        Self {
            registrations: Vec::new(),
        }
    }

    /// Invoke `callback` for every node whose kind is in `kinds`
    pub fn register<F>(&mut self, kinds: &[SyntaxKind], callback: F)
    where
        F: Fn(&NodeContext<'_>, &mut Reporter<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.registrations.push((kinds.to_vec(), Arc::new(callback)));
    }
}

/// Read-only view of the node being analyzed
pub struct NodeContext<'a> {
    node: &'a SyntaxNode,
    snapshot: &'a Snapshot,
    semantics: Semantics<'a>,
}

impl<'a> NodeContext<'a> {
    pub fn node(&self) -> &'a SyntaxNode {
        self.node
    }

    pub fn snapshot(&self) -> &'a Snapshot {
        self.snapshot
    }

    pub fn semantics(&self) -> Semantics<'a> {
        self.semantics
    }

    pub fn cancellation(&self) -> &'a CancellationToken {
        self.semantics.cancellation()
    }
}

/// Collects the output of one callback invocation
pub struct Reporter<'a> {
    analyzer: &'a AnalyzerEntry,
    enablement: &'a Enablement,
    snapshot: &'a Snapshot,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Reporter<'a> {
    /// Report `descriptor` at `range`; `args` fill the message placeholders
    pub fn report(&mut self, descriptor: &DiagnosticDescriptor, range: TextRange, args: Vec<String>) {
        self.report_with_locations(descriptor, range, args, Vec::new());
    }

    pub fn report_with_locations(
        &mut self,
        descriptor: &DiagnosticDescriptor,
        range: TextRange,
        args: Vec<String>,
        additional: Vec<TextRange>,
    ) {
        if !self.analyzer.descriptors.iter().any(|d| d.id == descriptor.id) {
            warn!(
                "Analyzer '{}' reported undeclared diagnostic '{}'; dropped",
                self.analyzer.name, descriptor.id
            );
            return;
        }
        let Some(severity) = self.enablement.severity_for(descriptor) else {
            return;
        };

        let snapshot = self.snapshot.id();
        self.diagnostics.push(Diagnostic {
            id: descriptor.id.to_string(),
            severity,
            message: descriptor.format_message(&args),
            args,
            location: Location { snapshot, range },
            additional_locations: additional
                .into_iter()
                .map(|range| Location { snapshot, range })
                .collect(),
        });
    }
}

/// Dispatch settings for one pass
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    pub parallel: bool,
    pub skip_generated: bool,
    /// Nodes lying entirely inside one of these ranges are not visited
    pub excluded_ranges: Vec<TextRange>,
}

impl AnalysisOptions {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            parallel: config.parallel,
            skip_generated: config.skip_generated,
            excluded_ranges: Vec::new(),
        }
    }

    fn is_excluded(&self, range: TextRange) -> bool {
        self.excluded_ranges.iter().any(|r| r.contains_range(range))
    }
}

struct AnalyzerEntry {
    name: &'static str,
    descriptors: Vec<DiagnosticDescriptor>,
}

struct Registration {
    analyzer: usize,
    callback: NodeCallback,
}

/// Registered analyzers and their per-kind callbacks
#[derive(Default)]
pub struct AnalyzerRegistry {
    analyzers: Vec<AnalyzerEntry>,
    callbacks: HashMap<SyntaxKind, Vec<Registration>>,
}

impl AnalyzerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize `analyzer` and record its callbacks
    pub fn add<A: Analyzer + ?Sized>(&mut self, analyzer: &A) {
        let index = self.analyzers.len();
        self.analyzers.push(AnalyzerEntry {
            name: analyzer.name(),
            descriptors: analyzer.supported_diagnostics(),
        });

        let mut context = AnalysisContext::new();
        analyzer.initialize(&mut context);
        for (kinds, callback) in context.registrations {
            for kind in kinds {
                self.callbacks.entry(kind).or_default().push(Registration {
                    analyzer: index,
                    callback: callback.clone(),
                });
            }
        }
        debug!("Registered analyzer '{}'", analyzer.name());
    }

    /// Every descriptor of every registered analyzer
    pub fn descriptors(&self) -> impl Iterator<Item = &DiagnosticDescriptor> {
        self.analyzers.iter().flat_map(|a| a.descriptors.iter())
    }

    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }

    /// Run every enabled analyzer over `snapshot`
    pub fn analyze(
        &self,
        snapshot: &Snapshot,
        oracle: &dyn TypeOracle,
        enablement: &Enablement,
        options: &AnalysisOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<Diagnostic>> {
        cancel.check()?;

        let root = snapshot.root();
        if options.skip_generated && is_generated(&root) {
            debug!("Skipping generated document {}", snapshot.id());
            return Ok(Vec::new());
        }

        let active: Vec<bool> = self
            .analyzers
            .iter()
            .map(|a| a.descriptors.iter().any(|d| enablement.is_diagnostic_enabled(d)))
            .collect();
        if !active.iter().any(|on| *on) {
            return Ok(Vec::new());
        }

        let pass = Pass {
            registry: self,
            active: &active,
            snapshot,
            oracle,
            enablement,
            cancel,
        };

        let mut targets = Vec::new();
        for node in root.descendants() {
            cancel.check()?;
            if self.callbacks.contains_key(&node.kind()) && !options.is_excluded(node.text_range()) {
                targets.push(node);
            }
        }

        let per_node: Vec<Vec<Diagnostic>> = if options.parallel {
            let paths: Vec<NodePath> = targets.iter().map(NodePath::of).collect();
            paths
                .par_iter()
                .map_init(
                    || snapshot.root(),
                    |root, path| match path.resolve(root) {
                        Some(node) => pass.visit(&node),
                        None => Err(RefitError::internal_error(format!(
                            "path {path:?} did not resolve in worker tree"
                        ))),
                    },
                )
                .collect::<Result<_>>()?
        } else {
            targets
                .iter()
                .map(|node| pass.visit(node))
                .collect::<Result<_>>()?
        };

        let diagnostics: Vec<Diagnostic> = per_node.into_iter().flatten().collect();
        debug!(
            "Analyzed {} nodes in {}: {} diagnostics",
            targets.len(),
            snapshot.id(),
            diagnostics.len()
        );
        Ok(diagnostics)
    }
}

struct Pass<'a> {
    registry: &'a AnalyzerRegistry,
    active: &'a [bool],
    snapshot: &'a Snapshot,
    oracle: &'a dyn TypeOracle,
    enablement: &'a Enablement,
    cancel: &'a CancellationToken,
}

impl Pass<'_> {
    fn visit(&self, node: &SyntaxNode) -> Result<Vec<Diagnostic>> {
        self.cancel.check()?;
        let Some(registrations) = self.registry.callbacks.get(&node.kind()) else {
            return Ok(Vec::new());
        };

        let context = NodeContext {
            node,
            snapshot: self.snapshot,
            semantics: Semantics::new(self.oracle, self.cancel),
        };

        let mut output = Vec::new();
        for registration in registrations {
            if !self.active[registration.analyzer] {
                continue;
            }
            let analyzer = &self.registry.analyzers[registration.analyzer];
            let mut reporter = Reporter {
                analyzer,
                enablement: self.enablement,
                snapshot: self.snapshot,
                diagnostics: Vec::new(),
            };

            let outcome = catch_unwind(AssertUnwindSafe(|| {
                (registration.callback)(&context, &mut reporter)
            }));
            match outcome {
                Ok(Ok(())) => output.extend(reporter.diagnostics),
                Ok(Err(err)) if err.is_cancelled() => return Err(err),
                Ok(Err(err)) => {
                    error!(
                        "Analyzer '{}' failed on {:?}@{:?}: {}",
                        analyzer.name,
                        node.kind(),
                        node.text_range(),
                        err
                    );
                }
                Err(payload) => {
                    error!(
                        "Analyzer '{}' panicked on {:?}@{:?}: {}",
                        analyzer.name,
                        node.kind(),
                        node.text_range(),
                        panic_message(payload.as_ref())
                    );
                }
            }
        }
        Ok(output)
    }
}

/// Whether the document starts with an `<auto-generated>` comment
pub fn is_generated(root: &SyntaxNode) -> bool {
    let header: Vec<_> = match root.first_child() {
        Some(first) => leading_trivia(&first),
        None => root
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .collect(),
    };
    header.iter().any(|token| {
        token.kind().is_comment()
            && (token.text().contains("<auto-generated") || token.text().contains("<autogenerated"))
    })
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleSeverity;
    use crate::diagnostics::Severity;
    use crate::semantic::DeclarationOracle;
    use crate::syntax::ast::{AstNode, NameExpr};

    const NAME: DiagnosticDescriptor = DiagnosticDescriptor {
        id: "test/name",
        title: "Name",
        message_format: "Found '{0}'",
        category: "test",
        default_severity: Severity::Warning,
        enabled_by_default: true,
    };

    const UNDECLARED: DiagnosticDescriptor = DiagnosticDescriptor {
        id: "test/undeclared",
        ..NAME
    };

    struct Names;

    impl Analyzer for Names {
        fn name(&self) -> &'static str {
            "names"
        }

        fn supported_diagnostics(&self) -> Vec<DiagnosticDescriptor> {
            vec![NAME]
        }

        fn initialize(&self, context: &mut AnalysisContext) {
            context.register(&[SyntaxKind::NameExpr], |cx, reporter| {
                let name = NameExpr::cast(cx.node().clone())
                    .and_then(|n| n.name())
                    .unwrap_or_default();
                match name.as_str() {
                    "boom" => panic!("analyzer bug"),
                    "fail" => {
                        reporter.report(&NAME, cx.node().text_range(), vec![name.clone()]);
                        Err(RefitError::internal_error("failed after reporting"))
                    }
                    "rogue" => {
                        reporter.report(&UNDECLARED, cx.node().text_range(), vec![]);
                        Ok(())
                    }
                    _ => {
                        reporter.report(&NAME, cx.node().text_range(), vec![name]);
                        Ok(())
                    }
                }
            });
        }
    }

    struct Second;

    impl Analyzer for Second {
        fn name(&self) -> &'static str {
            "second"
        }

        fn supported_diagnostics(&self) -> Vec<DiagnosticDescriptor> {
            vec![UNDECLARED]
        }

        fn initialize(&self, context: &mut AnalysisContext) {
            context.register(&[SyntaxKind::NameExpr], |cx, reporter| {
                reporter.report(&UNDECLARED, cx.node().text_range(), vec!["second".into()]);
                Ok(())
            });
        }
    }

    fn run(source: &str, registry: &AnalyzerRegistry, enablement: &Enablement, parallel: bool) -> Vec<Diagnostic> {
        let snapshot = Snapshot::parse(source);
        let oracle = DeclarationOracle::new(&snapshot);
        let options = AnalysisOptions {
            parallel,
            skip_generated: true,
            excluded_ranges: Vec::new(),
        };
        registry
            .analyze(&snapshot, &oracle, enablement, &options, &CancellationToken::new())
            .unwrap()
    }

    fn registry() -> AnalyzerRegistry {
        let mut registry = AnalyzerRegistry::new();
        registry.add(&Names);
        registry
    }

    #[test]
    fn test_failures_are_isolated() {
        let found = run("a; boom; fail; rogue; b;", &registry(), &Enablement::all_enabled(), false);
        let messages: Vec<&str> = found.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["Found 'a'", "Found 'b'"]);
    }

    #[test]
    fn test_parallel_matches_sequential_order() {
        let source = "a; b; c; d; e; f; g; h; x = y ?? z;";
        let mut registry = registry();
        registry.add(&Second);
        let sequential = run(source, &registry, &Enablement::all_enabled(), false);
        let parallel = run(source, &registry, &Enablement::all_enabled(), true);
        assert_eq!(sequential, parallel);
        assert_eq!(sequential.len(), 22);
        assert_eq!(sequential[0].id, "test/name");
        assert_eq!(sequential[1].id, "test/undeclared");
    }

    #[test]
    fn test_severity_override_and_disable() {
        let enablement = Enablement::all_enabled().with_rule("test/name", RuleSeverity::Error);
        let found = run("a;", &registry(), &enablement, false);
        assert_eq!(found[0].severity, Severity::Error);

        let disabled = Enablement::all_enabled().with_rule("test/name", RuleSeverity::Off);
        assert!(run("a;", &registry(), &disabled, false).is_empty());
    }

    #[test]
    fn test_generated_documents_are_skipped() {
        let source = "// <auto-generated>\n// </auto-generated>\na;";
        assert!(run(source, &registry(), &Enablement::all_enabled(), false).is_empty());
    }

    #[test]
    fn test_excluded_ranges() {
        let snapshot = Snapshot::parse("a; b;");
        let oracle = DeclarationOracle::new(&snapshot);
        let options = AnalysisOptions {
            parallel: false,
            skip_generated: false,
            excluded_ranges: vec![TextRange::new(0.into(), 2.into())],
        };
        let found = registry()
            .analyze(&snapshot, &oracle, &Enablement::all_enabled(), &options, &CancellationToken::new())
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "Found 'b'");
    }

    #[test]
    fn test_cancellation() {
        let snapshot = Snapshot::parse("a;");
        let oracle = DeclarationOracle::new(&snapshot);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = registry().analyze(
            &snapshot,
            &oracle,
            &Enablement::all_enabled(),
            &AnalysisOptions::default(),
            &cancel,
        );
        assert!(matches!(result, Err(RefitError::Cancelled)));
    }
}
