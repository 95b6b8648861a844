//! Immutable document snapshots and stable node identities
//!
//! A [`Snapshot`] owns one green tree and the text derived from it. Deferred
//! rewrites never hold red nodes; they capture a [`NodeTarget`] (snapshot id,
//! child-index path, kind and range) and resolve it against whatever snapshot
//! they are applied to. Any mismatch is reported as `StaleTarget`.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rowan::{GreenNode, TextRange, TextSize};

use crate::syntax::{SyntaxError, SyntaxKind, SyntaxNode, parse};
use crate::{RefitError, Result};

static NEXT_SNAPSHOT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique snapshot identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnapshotId(u64);

impl SnapshotId {
    fn next() -> Self {
        SnapshotId(NEXT_SNAPSHOT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One immutable version of a document
#[derive(Debug, Clone)]
pub struct Snapshot {
    id: SnapshotId,
    green: GreenNode,
    text: Arc<str>,
    errors: Arc<[SyntaxError]>,
}

impl Snapshot {
    /// Parse source text into a fresh snapshot
    pub fn parse(text: &str) -> Self {
        let (green, errors) = parse(text).into_parts();
        Self {
            id: SnapshotId::next(),
            green,
            text: Arc::from(text),
            errors: errors.into(),
        }
    }

    /// Wrap an edited green tree; the text is derived from the tree
    pub fn from_green(green: GreenNode) -> Self {
        let text = SyntaxNode::new_root(green.clone()).text().to_string();
        Self {
            id: SnapshotId::next(),
            green,
            text: Arc::from(text),
            errors: Arc::from(Vec::new()),
        }
    }

    pub fn id(&self) -> SnapshotId {
        self.id
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Syntax errors found when the snapshot was parsed from text
    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    /// A fresh red root; red trees are per-thread views over the shared green tree
    pub fn root(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn len(&self) -> TextSize {
        self.green.text_len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_index(&self) -> LineIndex {
        LineIndex::new(&self.text)
    }
}

/// Child indices (over nodes and tokens) from the root to a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn of(node: &SyntaxNode) -> Self {
        let mut indices: Vec<usize> = node
            .ancestors()
            .take_while(|n| n.parent().is_some())
            .map(|n| n.index())
            .collect();
        indices.reverse();
        NodePath(indices)
    }

    pub fn resolve(&self, root: &SyntaxNode) -> Option<SyntaxNode> {
        let mut current = root.clone();
        for &index in &self.0 {
            current = current.children_with_tokens().nth(index)?.into_node()?;
        }
        Some(current)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

/// Stable identity of a node captured by a deferred rewrite
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeTarget {
    snapshot: SnapshotId,
    path: NodePath,
    kind: SyntaxKind,
    range: TextRange,
}

impl NodeTarget {
    /// Capture `node`, which must belong to `snapshot`
    pub fn new(snapshot: &Snapshot, node: &SyntaxNode) -> Self {
        Self {
            snapshot: snapshot.id(),
            path: NodePath::of(node),
            kind: node.kind(),
            range: node.text_range(),
        }
    }

    pub fn snapshot(&self) -> SnapshotId {
        self.snapshot
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn path(&self) -> &NodePath {
        &self.path
    }

    /// Re-find the node in `snapshot`
    pub fn resolve(&self, snapshot: &Snapshot) -> Result<SyntaxNode> {
        self.resolve_in(snapshot, &snapshot.root())
    }

    /// Like [`resolve`](Self::resolve) but reusing an existing red root of `snapshot`
    pub fn resolve_in(&self, snapshot: &Snapshot, root: &SyntaxNode) -> Result<SyntaxNode> {
        if snapshot.id() != self.snapshot {
            return Err(RefitError::stale_target(format!(
                "target captured against snapshot {} but current snapshot is {}",
                self.snapshot,
                snapshot.id()
            )));
        }
        let node = self.path.resolve(root).ok_or_else(|| {
            RefitError::stale_target(format!("path {:?} no longer resolves", self.path))
        })?;
        if node.kind() != self.kind || node.text_range() != self.range {
            return Err(RefitError::stale_target(format!(
                "expected {:?}@{:?}, found {:?}@{:?}",
                self.kind,
                self.range,
                node.kind(),
                node.text_range()
            )));
        }
        Ok(node)
    }
}

/// Raw text range captured by a text-level rewrite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextTarget {
    snapshot: SnapshotId,
    range: TextRange,
}

impl TextTarget {
    pub fn new(snapshot: &Snapshot, range: TextRange) -> Self {
        Self {
            snapshot: snapshot.id(),
            range,
        }
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn resolve(&self, snapshot: &Snapshot) -> Result<TextRange> {
        if snapshot.id() != self.snapshot {
            return Err(RefitError::stale_target(format!(
                "text target captured against snapshot {} but current snapshot is {}",
                self.snapshot,
                snapshot.id()
            )));
        }
        if self.range.end() > snapshot.len() {
            return Err(RefitError::stale_target(format!(
                "range {:?} is outside the document",
                self.range
            )));
        }
        Ok(self.range)
    }
}

/// Zero-based line/column lookup over a text
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
    len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(TextSize::from((offset + 1) as u32));
            }
        }
        Self {
            line_starts,
            len: TextSize::from(text.len() as u32),
        }
    }

    /// `(line, column)` of a byte offset, both zero-based
    pub fn line_col(&self, offset: TextSize) -> (u32, u32) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        };
        let column = offset - self.line_starts[line];
        (line as u32, column.into())
    }

    /// Byte offset of a zero-based line/column, if it lies inside the text
    pub fn offset(&self, line: u32, column: u32) -> Option<TextSize> {
        let start = *self.line_starts.get(line as usize)?;
        let offset = start + TextSize::from(column);
        let line_end = self
            .line_starts
            .get(line as usize + 1)
            .copied()
            .unwrap_or(self.len);
        (offset <= line_end).then_some(offset)
    }
}
