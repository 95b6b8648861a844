//! Collapse a three-line documentation summary onto one line

use std::sync::LazyLock;

use refit_core::syntax::{TextRange, TextSize};
use refit_core::{
    ActionSet, CodeAction, EquivalenceKey, RefactoringContext, RefactoringProvider, RefitError,
    Result, TextTarget,
};
use regex::Regex;

use crate::catalog::FORMAT_SUMMARY_ON_SINGLE_LINE;
use crate::recipe::Recipe;

// indent, then `<summary>` / one content line / `</summary>`
static MULTI_LINE_SUMMARY: LazyLock<std::result::Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^([ \t]*)///[ \t]*<summary>[ \t]*\r?\n[ \t]*///[ \t]*([^\r\n]+?)[ \t]*\r?\n[ \t]*///[ \t]*</summary>",
    )
});

pub struct FormatSummaryProvider;

impl RefactoringProvider for FormatSummaryProvider {
    fn id(&self) -> &'static str {
        "format-summary"
    }

    fn refactoring_ids(&self) -> &'static [&'static str] {
        &[FORMAT_SUMMARY_ON_SINGLE_LINE]
    }

    fn compute_refactorings(&self, cx: &RefactoringContext<'_>, actions: &mut ActionSet) -> Result<()> {
        let pattern = MULTI_LINE_SUMMARY
            .as_ref()
            .map_err(|e| RefitError::internal_error(e.to_string()))?;
        let text = cx.snapshot().text();

        for captures in pattern.captures_iter(text) {
            cx.cancellation().check()?;
            let (Some(whole), Some(indent), Some(content)) = (captures.get(0), captures.get(1), captures.get(2))
            else {
                continue;
            };
            let Some(range) = text_range(indent.end(), whole.end()) else {
                continue;
            };
            let Some(full) = text_range(whole.start(), whole.end()) else {
                continue;
            };
            if !full.contains_range(cx.span()) {
                continue;
            }
            if content.as_str().contains("<summary>") {
                continue;
            }

            actions.register(CodeAction::refactoring(
                "Format summary on a single line",
                EquivalenceKey::new(FORMAT_SUMMARY_ON_SINGLE_LINE),
                Recipe::ReplaceText {
                    target: TextTarget::new(cx.snapshot(), range),
                    text: format!("/// <summary>{}</summary>", content.as_str()),
                },
            ));
            break;
        }
        Ok(())
    }
}

fn text_range(start: usize, end: usize) -> Option<TextRange> {
    let start = TextSize::try_from(start).ok()?;
    let end = TextSize::try_from(end).ok()?;
    (start <= end).then(|| TextRange::new(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use refit_core::{ActionRegistry, CancellationToken, CodeAction, Session};

    const SOURCE: &str = "class C\n{\n    /// <summary>\n    /// Gets the name.  \n    /// </summary>\n    string Name() { return null; }\n}\n";

    fn actions_at(session: &Session, offset: usize) -> Vec<CodeAction> {
        let mut registry = ActionRegistry::new();
        registry.add_refactoring_provider(FormatSummaryProvider);
        let span = TextRange::empty((offset as u32).into());
        session
            .actions_at(&registry, span, &[], &CancellationToken::new())
            .unwrap()
    }

    #[test]
    fn test_collapses_summary() {
        let mut session = Session::new(SOURCE);
        let offset = SOURCE.find("Gets").unwrap();
        let actions = actions_at(&session, offset);
        assert_eq!(actions.len(), 1);

        session.apply(&actions[0], &CancellationToken::new()).unwrap();
        assert_eq!(
            session.source_text(),
            "class C\n{\n    /// <summary>Gets the name.</summary>\n    string Name() { return null; }\n}\n"
        );
    }

    #[test]
    fn test_not_offered_outside_summary() {
        let session = Session::new(SOURCE);
        let offset = SOURCE.find("string Name").unwrap();
        assert!(actions_at(&session, offset).is_empty());
    }

    #[test]
    fn test_single_line_summary_is_left_alone() {
        let source = "/// <summary>Done.</summary>\nvoid M() { }\n";
        let session = Session::new(source);
        assert!(actions_at(&session, 5).is_empty());
    }
}
