//! Integration tests for the REFIT CLI
//!
//! These tests verify the CLI behavior end-to-end

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const RETURN_VOID_SOURCE: &str = "class Service
{
    void Run()
    {
        return Log();
    }

    void Log()
    {
    }
}
";

const CLEAN_SOURCE: &str = "class Service
{
    void Run()
    {
        Log();
    }

    void Log()
    {
    }
}
";

/// Helper function to create a test CLI command
#[allow(deprecated)]
fn cli() -> Command {
    let mut cmd = Command::cargo_bin("refit").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

/// Temporary project holding a single `Service.cs`
fn project(source: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("Service.cs");
    fs::write(&file, source).unwrap();
    (dir, file)
}

#[test]
fn test_help_command() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("actions"));
}

#[test]
fn test_version_command() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(VERSION));
}

#[test]
fn test_rules_lists_catalog() {
    cli()
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("redundancy/return-void-expression"))
        .stdout(predicate::str::contains("simplification/use-coalesce-expression"))
        .stdout(predicate::str::contains("check-expression-for-null"))
        .stdout(predicate::str::contains("format-summary-on-single-line"));
}

#[test]
fn test_rules_reflect_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("refit.json");
    fs::write(
        &config,
        r#"{ "refactorings": { "swap-statements-in-if-else": false } }"#,
    )
    .unwrap();

    cli()
        .args(["rules", "--detailed", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: disabled"));
}

#[test]
fn test_check_reports_return_void() {
    let (dir, _) = project(RETURN_VOID_SOURCE);
    cli()
        .arg("check")
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Service.cs:5:9: warning"))
        .stdout(predicate::str::contains(
            "Replace 'return' statement with expression statement",
        ))
        .stdout(predicate::str::contains("[redundancy/return-void-expression]"))
        .stdout(predicate::str::contains("return-void-expression-fade-out").not());
}

#[test]
fn test_check_clean_file() {
    let (_dir, file) = project(CLEAN_SOURCE);
    cli()
        .arg("check")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found"))
        .stdout(predicate::str::contains("Files checked: 1"));
}

#[test]
fn test_check_json_output() {
    let (_dir, file) = project(RETURN_VOID_SOURCE);
    let output = cli()
        .args(["check", "--format", "json", "--show-hidden"])
        .arg(&file)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let diagnostics = value["files"][0]["diagnostics"].as_array().unwrap();
    let ids: Vec<&str> = diagnostics
        .iter()
        .map(|d| d["id"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec![
            "redundancy/return-void-expression",
            "redundancy/return-void-expression-fade-out"
        ]
    );
    assert_eq!(diagnostics[0]["line"], 5);
    assert_eq!(diagnostics[0]["column"], 9);
    assert_eq!(value["summary"]["warnings"], 1);
    assert_eq!(value["summary"]["hidden"], 1);
}

#[test]
fn test_check_respects_discovered_config() {
    let (dir, _) = project(RETURN_VOID_SOURCE);
    fs::write(
        dir.path().join(".refitrc.json"),
        r#"{ "rules": { "redundancy/return-void-expression": "off" } }"#,
    )
    .unwrap();

    cli()
        .arg("check")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found"));
}

#[test]
fn test_check_missing_path_fails() {
    let dir = TempDir::new().unwrap();
    cli()
        .arg("check")
        .arg(dir.path().join("missing.cs"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("missing.cs"));
}

#[test]
fn test_actions_lists_fix_at_position() {
    let (_dir, file) = project(RETURN_VOID_SOURCE);
    cli()
        .arg("actions")
        .arg(&file)
        .args(["--line", "5", "--column", "9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Remove 'return'"))
        .stdout(predicate::str::contains(
            "redundancy/return-void-expression.replace-return",
        ));
}

#[test]
fn test_actions_requires_position() {
    let (_dir, file) = project(RETURN_VOID_SOURCE);
    cli().arg("actions").arg(&file).assert().failure();
}

#[test]
fn test_actions_apply_prints_result() {
    let (_dir, file) = project(RETURN_VOID_SOURCE);
    cli()
        .arg("actions")
        .arg(&file)
        .args(["--line", "5", "--column", "9"])
        .args(["--apply", "redundancy/return-void-expression.replace-return"])
        .assert()
        .success()
        .stdout(predicate::str::contains("        Log();\n"))
        .stdout(predicate::str::contains("return").not());

    // without --write the file is untouched
    assert_eq!(fs::read_to_string(&file).unwrap(), RETURN_VOID_SOURCE);
}

#[test]
fn test_actions_apply_unknown_key_fails() {
    let (_dir, file) = project(RETURN_VOID_SOURCE);
    cli()
        .arg("actions")
        .arg(&file)
        .args(["--offset", "0", "--apply", "no-such-key"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no-such-key"));
}

#[test]
fn test_fix_write_rewrites_file() {
    let (_dir, file) = project(RETURN_VOID_SOURCE);
    cli()
        .arg("fix")
        .arg(&file)
        .arg("--write")
        .assert()
        .success()
        .stdout(predicate::str::contains("Remove 'return'"));

    assert_eq!(fs::read_to_string(&file).unwrap(), CLEAN_SOURCE);
}

#[test]
fn test_fix_rule_filter_skips_other_rules() {
    let (_dir, file) = project(RETURN_VOID_SOURCE);
    cli()
        .arg("fix")
        .arg(&file)
        .args(["--rule", "simplification/use-coalesce-expression"])
        .assert()
        .success()
        .stdout(predicate::str::diff(RETURN_VOID_SOURCE));
}

#[test]
fn test_fix_adds_default_return() {
    let (_dir, file) = project("class C\n{\n    string Name()\n    {\n    }\n}\n");
    cli()
        .arg("fix")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("        return null;\n    }"));
}
