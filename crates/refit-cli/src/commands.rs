//! CLI command implementations

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use refit_core::dispatch::is_generated;
use refit_core::syntax::{TextRange, TextSize};
use refit_core::{
    ActionKind, ActionRegistry, AnalysisOptions, AnalyzerRegistry, CancellationToken, CodeAction,
    ConfigLoader, Diagnostic, Enablement, RefitConfig, RefitError, Result, ResultExt, Semantics,
    Session, Severity,
};
use refit_rules::{REFACTORINGS, action_registry, analyzer_registry, descriptors};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::OutputFormat;
use crate::output::{CheckSummary, FileReport, OutputFormatter};

/// Extension of the source files picked up when walking directories
const SOURCE_EXTENSION: &str = "cs";

/// Where `actions` looks for candidate actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Offset(u32),
    /// One-based line and column
    LineColumn { line: u32, column: u32 },
}

/// Load the explicit config, or discover one next to the first input path
fn load_config(config_path: Option<&Path>, first_path: Option<&Path>) -> Result<RefitConfig> {
    if config_path.is_some() {
        return ConfigLoader::load(config_path, None);
    }

    let start_dir = match first_path {
        Some(path) if path.is_file() => match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        },
        Some(path) if path.is_dir() => path,
        _ => Path::new("."),
    };
    ConfigLoader::load(None, Some(start_dir))
}

/// Expand directories into the `*.cs` files below them
fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        let metadata = fs::metadata(path).map_err(|e| RefitError::io_error(path, e))?;
        if metadata.is_file() {
            files.push(path.clone());
            continue;
        }

        let walker = WalkDir::new(path)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let is_source = entry
                .path()
                .extension()
                .is_some_and(|ext| ext == SOURCE_EXTENSION);
            if entry.file_type().is_file() && is_source {
                files.push(entry.into_path());
            }
        }
    }
    files.sort();
    files.dedup();
    debug!("Discovered {} source files", files.len());
    Ok(files)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|name| name.starts_with('.'))
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| RefitError::io_error(path, e))
}

fn write_source(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).map_err(|e| RefitError::io_error(path, e))
}

/// Compiler diagnostics of the current snapshot that the enablement lets through
fn compiler_diagnostics(
    session: &Session,
    options: &AnalysisOptions,
    cancel: &CancellationToken,
) -> Result<Vec<Diagnostic>> {
    let snapshot = session.current();
    if options.skip_generated && is_generated(&snapshot.root()) {
        return Ok(Vec::new());
    }
    let semantics = Semantics::new(session.oracle(), cancel);
    let full = TextRange::up_to(snapshot.len());
    Ok(semantics
        .compiler_diagnostics(full)?
        .iter()
        .map(|d| Diagnostic::from_compiler(snapshot.id(), d))
        .filter(|d| session.enablement().is_enabled(&d.id))
        .collect())
}

/// Analyzer diagnostics followed by compiler diagnostics, ordered by position
fn all_diagnostics(
    session: &Session,
    registry: &AnalyzerRegistry,
    options: &AnalysisOptions,
    cancel: &CancellationToken,
) -> Result<Vec<Diagnostic>> {
    let mut diagnostics = session.analyze(registry, options, cancel)?;
    diagnostics.extend(compiler_diagnostics(session, options, cancel)?);
    diagnostics.sort_by_key(|d| d.range().start());
    Ok(diagnostics)
}

/// Check command implementation
///
/// Returns `false` when any warning or error was reported.
pub fn check_command(
    paths: Vec<PathBuf>,
    format: OutputFormat,
    show_hidden: bool,
    config_path: Option<PathBuf>,
) -> Result<bool> {
    debug!("Running check command on paths: {:?}", paths);

    let config = load_config(config_path.as_deref(), paths.first().map(PathBuf::as_path))?;
    let files = collect_files(&paths)?;
    let registry = analyzer_registry();
    let options = AnalysisOptions::from_config(&config.analysis);
    let cancel = CancellationToken::new();
    let start_time = Instant::now();

    let mut reports = Vec::with_capacity(files.len());
    for file in files {
        let text = read_source(&file)?;
        let session = Session::with_config(&text, &config);
        let Some(mut diagnostics) =
            all_diagnostics(&session, &registry, &options, &cancel).log_and_continue()
        else {
            warn!("Skipping {}: analysis failed", file.display());
            continue;
        };
        if !show_hidden {
            diagnostics.retain(|d| d.severity != Severity::Hidden);
        }
        debug!("{}: {} diagnostics", file.display(), diagnostics.len());
        reports.push(FileReport::new(file, &text, diagnostics));
    }

    let summary = CheckSummary::from_reports(&reports);
    info!(
        "Checked {} files in {:?}",
        summary.files_checked,
        start_time.elapsed()
    );

    OutputFormatter::new(format).print_check(&reports, &summary)?;
    Ok(!summary.has_findings())
}

fn resolve_position(file: &Path, text: &str, position: Position) -> Result<TextSize> {
    let len = TextSize::of(text);
    let offset = match position {
        Position::Offset(offset) => Some(TextSize::from(offset)).filter(|offset| *offset <= len),
        Position::LineColumn { line, column } => {
            let index = refit_core::LineIndex::new(text);
            line.checked_sub(1)
                .zip(column.checked_sub(1))
                .and_then(|(line, column)| index.offset(line, column))
        }
    };
    offset.ok_or_else(|| {
        RefitError::config_error(format!(
            "Position {:?} lies outside '{}'",
            position,
            file.display()
        ))
    })
}

/// Actions command implementation
pub fn actions_command(
    file: PathBuf,
    position: Position,
    apply: Option<String>,
    write: bool,
    format: OutputFormat,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path.as_deref(), Some(&file))?;
    let text = read_source(&file)?;
    let offset = resolve_position(&file, &text, position)?;
    let span = TextRange::empty(offset);

    let mut session = Session::with_config(&text, &config);
    let options = AnalysisOptions::from_config(&config.analysis);
    let cancel = CancellationToken::new();
    let diagnostics = session.analyze(&analyzer_registry(), &options, &cancel)?;
    let actions = session.actions_at(&action_registry(), span, &diagnostics, &cancel)?;
    debug!("{} actions at {:?}", actions.len(), span);

    let formatter = OutputFormatter::new(format);
    let Some(key) = apply else {
        return formatter.print_actions(&file, &actions);
    };

    let action = actions
        .iter()
        .find(|action| action.equivalence_key().as_str() == key)
        .ok_or_else(|| {
            RefitError::precondition_failed(format!(
                "No action with key '{}' at offset {} of '{}'",
                key,
                u32::from(offset),
                file.display()
            ))
        })?;
    let applied = session.apply(action, &cancel)?;
    debug!("Applied '{}': {} -> {}", action.title(), applied.from, applied.to);

    if write {
        write_source(&file, session.source_text())?;
        formatter.print_applied(&file, &[action.title().to_string()]);
    } else {
        print!("{}", session.source_text());
    }
    Ok(())
}

/// First fix offered for any of `candidates`, in diagnostic order
fn first_fix(
    session: &Session,
    registry: &ActionRegistry,
    candidates: &[Diagnostic],
    cancel: &CancellationToken,
) -> Result<Option<CodeAction>> {
    for diagnostic in candidates {
        let request = session.request(diagnostic.range(), std::slice::from_ref(diagnostic), cancel);
        let fix = registry
            .collect_fixes(&request)?
            .into_iter()
            .find(|action| action.kind() == ActionKind::Fix);
        if fix.is_some() {
            return Ok(fix);
        }
    }
    Ok(None)
}

/// Fix command implementation
///
/// After each applied fix the diagnostics are recomputed on the new snapshot,
/// until nothing fixable remains or `analysis.maxFixIterations` is reached.
pub fn fix_command(
    file: PathBuf,
    rules: Vec<String>,
    write: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path.as_deref(), Some(&file))?;
    let text = read_source(&file)?;
    let mut session = Session::with_config(&text, &config);
    let analyzers = analyzer_registry();
    let actions = action_registry();
    let options = AnalysisOptions::from_config(&config.analysis);
    let cancel = CancellationToken::new();
    let max_iterations = config.analysis.max_fix_iterations;

    let mut applied = Vec::new();
    let mut exhausted = true;
    for iteration in 0..max_iterations {
        let mut candidates = all_diagnostics(&session, &analyzers, &options, &cancel)?;
        if !rules.is_empty() {
            candidates.retain(|d| rules.contains(&d.id));
        }

        let Some(action) = first_fix(&session, &actions, &candidates, &cancel)? else {
            exhausted = false;
            break;
        };
        if session.apply(&action, &cancel).recoverable()?.is_none() {
            warn!("Fix '{}' was not applied", action.title());
            exhausted = false;
            break;
        }
        debug!("Iteration {}: applied '{}'", iteration, action.title());
        applied.push(action.title().to_string());
    }
    if exhausted && max_iterations > 0 {
        warn!(
            "Stopped after {} fix iterations; fixable diagnostics may remain",
            max_iterations
        );
    }

    let formatter = OutputFormatter::new(OutputFormat::Human);
    if write {
        if !applied.is_empty() {
            write_source(&file, session.source_text())?;
        }
        formatter.print_applied(&file, &applied);
    } else {
        print!("{}", session.source_text());
    }
    Ok(())
}

/// Rules command implementation
pub fn rules_command(detailed: bool, config_path: Option<PathBuf>) -> Result<()> {
    debug!("Listing available rules");
    let config = load_config(config_path.as_deref(), None)?;
    let enablement = Enablement::from_config(&config);
    OutputFormatter::new(OutputFormat::Human).print_rules(
        &descriptors(),
        REFACTORINGS,
        &enablement,
        detailed,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_files_walks_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        fs::create_dir_all(dir.path().join(".hidden")).unwrap();
        fs::write(dir.path().join("src/A.cs"), "class A { }").unwrap();
        fs::write(dir.path().join("src/nested/B.cs"), "class B { }").unwrap();
        fs::write(dir.path().join("src/notes.txt"), "not source").unwrap();
        fs::write(dir.path().join(".hidden/C.cs"), "class C { }").unwrap();

        let files = collect_files(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["A.cs", "B.cs"]);
    }

    #[test]
    fn test_collect_files_rejects_missing_path() {
        let dir = TempDir::new().unwrap();
        let err = collect_files(&[dir.path().join("missing.cs")]).unwrap_err();
        assert!(matches!(err, RefitError::IoError { .. }));
    }

    #[test]
    fn test_resolve_position() {
        let text = "a;\nbc;\n";
        let file = Path::new("t.cs");
        let at = |position| resolve_position(file, text, position).map(u32::from);
        assert_eq!(at(Position::Offset(4)).unwrap(), 4);
        assert_eq!(at(Position::LineColumn { line: 2, column: 2 }).unwrap(), 4);
        assert_eq!(at(Position::LineColumn { line: 1, column: 1 }).unwrap(), 0);
        assert!(at(Position::Offset(99)).is_err());
        assert!(at(Position::LineColumn { line: 0, column: 1 }).is_err());
        assert!(at(Position::LineColumn { line: 9, column: 1 }).is_err());
    }

    #[test]
    fn test_compiler_diagnostics_are_included() {
        let session = Session::new("int Count() { }");
        let options = AnalysisOptions::default();
        let diagnostics =
            all_diagnostics(&session, &analyzer_registry(), &options, &CancellationToken::new())
                .unwrap();
        let ids: Vec<&str> = diagnostics.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec![refit_core::semantic::NOT_ALL_PATHS_RETURN]);
    }
}
