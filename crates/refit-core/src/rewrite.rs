//! Trivia-preserving tree rewrites
//!
//! All edits go through [`replace_with_sequence`]: the target (captured as a
//! [`NodeTarget`]) is resolved against the snapshot, the replacements receive
//! the target's outer trivia, and only the green nodes on the path from the
//! target's parent to the root are rebuilt. Every other subtree of the new
//! tree is the same `Arc` as in the old one.
//!
//! Inserted nodes are reported in [`Rewritten::needs_formatting`] unless the
//! replacement opts out with [`Replacement::unformatted`].

use rowan::{GreenNode, GreenToken, NodeOrToken, TextRange, TextSize};
use tracing::debug;

use crate::snapshot::{NodeTarget, Snapshot, TextTarget};
use crate::syntax::trivia::{green_token, leading_trivia, set_leading_trivia, set_trailing_trivia, trailing_trivia};
use crate::{RefitError, Result};

/// One node to splice in place of a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    green: GreenNode,
    reformat: bool,
    keep_trivia: bool,
}

impl Replacement {
    pub fn new(green: GreenNode) -> Self {
        Self {
            green,
            reformat: true,
            keep_trivia: false,
        }
    }

    /// Leave the replacement out of `Rewritten::needs_formatting`
    ///
    /// For nodes carried over verbatim from the old tree.
    pub fn unformatted(mut self) -> Self {
        self.reformat = false;
        self
    }

    /// Keep the replacement's own trivia instead of receiving the target's
    pub fn keep_trivia(mut self) -> Self {
        self.keep_trivia = true;
        self
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }
}

impl From<GreenNode> for Replacement {
    fn from(green: GreenNode) -> Self {
        Replacement::new(green)
    }
}

/// Output of a rewrite
#[derive(Debug, Clone)]
pub struct Rewritten {
    pub snapshot: Snapshot,
    /// Ranges in the new snapshot a formatter should normalize
    pub needs_formatting: Vec<TextRange>,
}

/// Replace the target node with a single node
pub fn replace(snapshot: &Snapshot, target: &NodeTarget, replacement: Replacement) -> Result<Rewritten> {
    replace_with_sequence(snapshot, target, vec![replacement])
}

/// Replace the target node with one or more sibling nodes
///
/// The first replacement receives the target's leading trivia and the last
/// one its trailing trivia, unless marked with [`Replacement::keep_trivia`].
pub fn replace_with_sequence(
    snapshot: &Snapshot,
    target: &NodeTarget,
    replacements: Vec<Replacement>,
) -> Result<Rewritten> {
    if replacements.is_empty() {
        return Err(RefitError::rewrite_error("replacement sequence is empty"));
    }

    let root = snapshot.root();
    let node = target.resolve_in(snapshot, &root)?;

    let leading: Vec<GreenToken> = leading_trivia(&node).iter().map(green_token).collect();
    let trailing: Vec<GreenToken> = trailing_trivia(&node).iter().map(green_token).collect();

    let last = replacements.len() - 1;
    let mut offset = node.text_range().start();
    let mut needs_formatting = Vec::new();
    let mut greens = Vec::with_capacity(replacements.len());
    for (index, replacement) in replacements.into_iter().enumerate() {
        let mut green = replacement.green;
        if !replacement.keep_trivia {
            if index == 0 {
                green = set_leading_trivia(&green, &leading);
            }
            if index == last {
                green = set_trailing_trivia(&green, &trailing);
            }
        }
        let len: TextSize = green.text_len();
        if replacement.reformat {
            needs_formatting.push(TextRange::at(offset, len));
        }
        offset += len;
        greens.push(green);
    }

    let new_root = match node.parent() {
        Some(parent) => {
            let index = node.index();
            let spliced = parent
                .green()
                .splice_children(index..index + 1, greens.into_iter().map(NodeOrToken::Node));
            parent.replace_with(spliced)
        }
        None => {
            if greens.len() != 1 {
                return Err(RefitError::rewrite_error(
                    "the root can only be replaced by a single node",
                ));
            }
            greens.remove(0)
        }
    };

    let rewritten = Snapshot::from_green(new_root);
    debug!(
        "Rewrote {:?}@{:?} in {} -> {}",
        target.kind(),
        target.range(),
        snapshot.id(),
        rewritten.id()
    );
    Ok(Rewritten {
        snapshot: rewritten,
        needs_formatting,
    })
}

/// Replace a raw text range and reparse
pub fn replace_text(snapshot: &Snapshot, target: &TextTarget, text: &str) -> Result<Rewritten> {
    let range = target.resolve(snapshot)?;
    let source = snapshot.text();
    let start = usize::from(range.start());
    let end = usize::from(range.end());
    let (Some(before), Some(after)) = (source.get(..start), source.get(end..)) else {
        return Err(RefitError::stale_target(format!(
            "range {range:?} does not fall on character boundaries"
        )));
    };

    let edited = format!("{before}{text}{after}");
    let rewritten = Snapshot::parse(&edited);
    let inserted = TextRange::at(range.start(), TextSize::of(text));
    debug!(
        "Rewrote text {:?} in {} -> {}",
        range,
        snapshot.id(),
        rewritten.id()
    );
    Ok(Rewritten {
        snapshot: rewritten,
        needs_formatting: vec![inserted],
    })
}
