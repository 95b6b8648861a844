//! Output formatting and reporting

use std::path::{Path, PathBuf};

use colored::*;
use refit_core::{
    CodeAction, Diagnostic, DiagnosticDescriptor, Enablement, LineIndex, RefitError, Result,
    Severity,
};
use refit_rules::RefactoringInfo;
use serde_json::{Value, json};

use crate::OutputFormat;

/// Diagnostics of one checked file
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub diagnostics: Vec<Diagnostic>,
    line_index: LineIndex,
}

impl FileReport {
    pub fn new(path: PathBuf, text: &str, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            path,
            diagnostics,
            line_index: LineIndex::new(text),
        }
    }

    /// One-based start and end positions of a diagnostic
    fn positions(&self, diagnostic: &Diagnostic) -> ((u32, u32), (u32, u32)) {
        let one_based = |(line, column): (u32, u32)| (line + 1, column + 1);
        let range = diagnostic.range();
        (
            one_based(self.line_index.line_col(range.start())),
            one_based(self.line_index.line_col(range.end())),
        )
    }
}

/// Summary statistics for check results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub files_checked: usize,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
    pub hidden: usize,
}

impl CheckSummary {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let mut summary = Self {
            files_checked: reports.len(),
            ..Self::default()
        };
        for diagnostic in reports.iter().flat_map(|r| &r.diagnostics) {
            match diagnostic.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.info += 1,
                Severity::Hidden => summary.hidden += 1,
            }
        }
        summary
    }

    pub fn total_issues(&self) -> usize {
        self.errors + self.warnings + self.info + self.hidden
    }

    /// Warnings and errors fail a check run
    pub fn has_findings(&self) -> bool {
        self.errors + self.warnings > 0
    }
}

fn severity_label(severity: Severity) -> ColoredString {
    let text = severity.to_string();
    match severity {
        Severity::Error => text.red().bold(),
        Severity::Warning => text.yellow().bold(),
        Severity::Info => text.blue(),
        Severity::Hidden => text.dimmed(),
    }
}

fn to_json_string(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| RefitError::internal_error(format!("Failed to serialize output: {e}")))
}

/// Output formatter for different formats
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Format and print check results
    pub fn print_check(&self, reports: &[FileReport], summary: &CheckSummary) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                self.print_check_human(reports, summary);
                Ok(())
            }
            OutputFormat::Json => {
                println!("{}", to_json_string(&check_json(reports, summary))?);
                Ok(())
            }
        }
    }

    fn print_check_human(&self, reports: &[FileReport], summary: &CheckSummary) {
        for report in reports {
            for diagnostic in &report.diagnostics {
                let ((line, column), _) = report.positions(diagnostic);
                println!(
                    "{}:{}:{}: {} {} {}",
                    report.path.display(),
                    line,
                    column,
                    severity_label(diagnostic.severity),
                    diagnostic.message,
                    format!("[{}]", diagnostic.id).dimmed()
                );
            }
        }

        if summary.total_issues() == 0 {
            println!("{}", "No issues found".green());
        }

        println!("\n{}", "Summary:".bold());
        println!("  Files checked: {}", summary.files_checked);
        if summary.errors > 0 {
            println!("  Errors: {}", summary.errors.to_string().red());
        }
        if summary.warnings > 0 {
            println!("  Warnings: {}", summary.warnings.to_string().yellow());
        }
        if summary.info > 0 {
            println!("  Info: {}", summary.info.to_string().blue());
        }
        if summary.hidden > 0 {
            println!("  Hidden: {}", summary.hidden.to_string().dimmed());
        }
    }

    /// Print the candidate actions offered at one position
    pub fn print_actions(&self, file: &Path, actions: &[CodeAction]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if actions.is_empty() {
                    println!("No actions available in {}", file.display());
                    return Ok(());
                }
                for action in actions {
                    let kind = match action.kind() {
                        refit_core::ActionKind::Fix => "fix".green(),
                        refit_core::ActionKind::Refactoring => "refactoring".cyan(),
                    };
                    println!(
                        "{:<12} {}  {}",
                        kind,
                        action.title(),
                        action.equivalence_key().as_str().dimmed()
                    );
                }
            }
            OutputFormat::Json => {
                let items: Vec<Value> = actions.iter().map(action_json).collect();
                println!("{}", to_json_string(&Value::Array(items))?);
            }
        }
        Ok(())
    }

    /// Report which actions were written back to `file`
    pub fn print_applied(&self, file: &Path, titles: &[String]) {
        if titles.is_empty() {
            println!("No fixes applied to {}", file.display());
            return;
        }
        for title in titles {
            println!("  {} {}", "✓".green(), title);
        }
        println!(
            "Applied {} fix(es) to {}",
            titles.len().to_string().bold(),
            file.display()
        );
    }

    /// List rule descriptors and refactorings with their effective settings
    pub fn print_rules(
        &self,
        rules: &[DiagnosticDescriptor],
        refactorings: &[RefactoringInfo],
        enablement: &Enablement,
        detailed: bool,
    ) {
        println!("{}", "Rules:".bold());
        for rule in rules {
            let status = match enablement.severity_for(rule) {
                Some(severity) => severity_label(severity),
                None => "off".dimmed(),
            };
            if detailed {
                println!("\n  {}", rule.id);
                println!("    Title: {}", rule.title);
                println!("    Category: {}", rule.category);
                println!("    Severity: {status}");
            } else {
                println!("  {:<52} {}", rule.id, status);
            }
        }

        println!("\n{}", "Refactorings:".bold());
        for refactoring in refactorings {
            let status = if enablement.is_enabled(refactoring.id) {
                "enabled".green()
            } else {
                "disabled".dimmed()
            };
            if detailed {
                println!("\n  {}", refactoring.id);
                println!("    Title: {}", refactoring.title);
                println!("    Status: {status}");
            } else {
                println!("  {:<52} {}", refactoring.id, status);
            }
        }

        println!(
            "\nTotal: {} rules, {} refactorings",
            rules.len(),
            refactorings.len()
        );
    }
}

fn check_json(reports: &[FileReport], summary: &CheckSummary) -> Value {
    let files: Vec<Value> = reports
        .iter()
        .map(|report| {
            let diagnostics: Vec<Value> = report
                .diagnostics
                .iter()
                .map(|diagnostic| {
                    let ((line, column), (end_line, end_column)) = report.positions(diagnostic);
                    let range = diagnostic.range();
                    json!({
                        "id": diagnostic.id,
                        "severity": diagnostic.severity,
                        "message": diagnostic.message,
                        "start": u32::from(range.start()),
                        "end": u32::from(range.end()),
                        "line": line,
                        "column": column,
                        "endLine": end_line,
                        "endColumn": end_column,
                    })
                })
                .collect();
            json!({
                "path": report.path.display().to_string(),
                "diagnostics": diagnostics,
            })
        })
        .collect();

    json!({
        "files": files,
        "summary": {
            "filesChecked": summary.files_checked,
            "errors": summary.errors,
            "warnings": summary.warnings,
            "info": summary.info,
            "hidden": summary.hidden,
        }
    })
}

fn action_json(action: &CodeAction) -> Value {
    json!({
        "title": action.title(),
        "key": action.equivalence_key().as_str(),
        "kind": match action.kind() {
            refit_core::ActionKind::Fix => "fix",
            refit_core::ActionKind::Refactoring => "refactoring",
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use refit_core::{Location, Snapshot};
    use refit_core::syntax::TextRange;

    fn diagnostic(severity: Severity, start: u32, end: u32) -> Diagnostic {
        Diagnostic {
            id: "style/sample".to_string(),
            severity,
            message: "Sample".to_string(),
            args: Vec::new(),
            location: Location {
                snapshot: Snapshot::parse("").id(),
                range: TextRange::new(start.into(), end.into()),
            },
            additional_locations: Vec::new(),
        }
    }

    #[test]
    fn test_summary_counts_by_severity() {
        let reports = vec![
            FileReport::new(
                PathBuf::from("a.cs"),
                "x;",
                vec![diagnostic(Severity::Warning, 0, 1), diagnostic(Severity::Hidden, 0, 1)],
            ),
            FileReport::new(PathBuf::from("b.cs"), "", Vec::new()),
        ];
        let summary = CheckSummary::from_reports(&reports);
        assert_eq!(summary.files_checked, 2);
        assert_eq!(summary.warnings, 1);
        assert_eq!(summary.hidden, 1);
        assert!(summary.has_findings());

        let info_only = CheckSummary::from_reports(&[FileReport::new(
            PathBuf::from("c.cs"),
            "x;",
            vec![diagnostic(Severity::Info, 0, 1)],
        )]);
        assert!(!info_only.has_findings());
    }

    #[test]
    fn test_check_json_positions_are_one_based() {
        let reports = vec![FileReport::new(
            PathBuf::from("a.cs"),
            "a;\n  bc;\n",
            vec![diagnostic(Severity::Info, 5, 7)],
        )];
        let value = check_json(&reports, &CheckSummary::from_reports(&reports));
        let first = &value["files"][0]["diagnostics"][0];
        assert_eq!(first["line"], 2);
        assert_eq!(first["column"], 3);
        assert_eq!(first["endColumn"], 5);
        assert_eq!(first["severity"], "info");
        assert_eq!(value["summary"]["info"], 1);
    }
}
