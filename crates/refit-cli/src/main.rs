//! REFIT CLI
//!
//! Command-line interface for the REFIT analyzers, code fixes and refactorings

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use refit_core::init_tracing;
use std::path::PathBuf;
use tracing::error;

use crate::commands::Position;

#[derive(Parser)]
#[command(name = "refit")]
#[command(about = "REFIT: diagnostics, code fixes and refactorings for C#-like sources")]
#[command(version = refit_core::VERSION)]
#[command(
    long_about = "REFIT analyzes C#-like source files, reports diagnostics and offers\n\
code fixes and refactorings that rewrite the syntax tree without losing comments or layout.\n\
\n\
Examples:\n  \
refit check src/                          # Report diagnostics for every .cs file\n  \
refit actions Foo.cs --line 12 --column 9  # List actions at a position\n  \
refit fix Foo.cs --write                  # Apply every available fix\n  \
refit rules --detailed                    # List rules and refactorings"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        help = "Path to configuration file (.refitrc.json/.refitrc.toml/refit.yaml)"
    )]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Number of threads to use for parallel analysis
    #[arg(
        short = 'j',
        long,
        global = true,
        help = "Number of threads (default: number of CPU cores)"
    )]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Report diagnostics for files or directories
    #[command(alias = "lint")]
    Check {
        /// Files or directories to analyze
        #[arg(help = "Files or directories to process (default: current directory)")]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(
            short,
            long,
            default_value = "human",
            help = "Output format for diagnostics"
        )]
        format: OutputFormat,

        /// Include hidden diagnostics such as fade-out markers
        #[arg(long)]
        show_hidden: bool,
    },

    /// List or apply the code fixes and refactorings offered at a position
    Actions {
        /// Source file
        file: PathBuf,

        /// Byte offset into the file
        #[arg(long, required_unless_present = "line", conflicts_with = "line")]
        offset: Option<u32>,

        /// One-based line number
        #[arg(long, requires = "column")]
        line: Option<u32>,

        /// One-based column number
        #[arg(long, requires = "line")]
        column: Option<u32>,

        /// Apply the action with this equivalence key
        #[arg(long, value_name = "KEY")]
        apply: Option<String>,

        /// Write the result back to the file instead of printing it
        #[arg(long, requires = "apply")]
        write: bool,

        /// Output format for the action listing
        #[arg(short, long, default_value = "human")]
        format: OutputFormat,
    },

    /// Apply code fixes until no fixable diagnostic remains
    Fix {
        /// Source file
        file: PathBuf,

        /// Only fix diagnostics with this id (can be used multiple times)
        #[arg(long = "rule", value_name = "ID")]
        rules: Vec<String>,

        /// Write fixes to the file instead of printing the result
        #[arg(long)]
        write: bool,
    },

    /// List built-in rules and refactorings
    Rules {
        /// Show titles, categories and effective settings
        #[arg(short, long)]
        detailed: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output with colors
    Human,
    /// JSON output for machine processing
    Json,
}

fn main() {
    let cli = Cli::parse();

    if !cli.no_color && std::env::var("NO_COLOR").is_err() {
        colored::control::set_override(true);
    } else {
        colored::control::set_override(false);
    }

    // RUST_LOG from the environment wins over -v
    if std::env::var("RUST_LOG").is_err() {
        let log_level = match cli.verbose {
            0 => "refit=error",
            1 => "refit=warn",
            2 => "refit=info",
            3 => "refit=debug",
            _ => "refit=trace",
        };
        unsafe {
            std::env::set_var("RUST_LOG", log_level);
        }
    }
    init_tracing();

    if let Some(threads) = cli.threads
        && let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
    {
        error!("Failed to set thread pool size: {}", e);
        std::process::exit(2);
    }

    match run_command(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("refit failed: {:#}", e);
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    }
}

/// Runs the selected command; `Ok(false)` means findings were reported
fn run_command(cli: Cli) -> Result<bool> {
    match cli.command {
        Some(Commands::Check {
            paths,
            format,
            show_hidden,
        }) => {
            let paths = if paths.is_empty() {
                vec![PathBuf::from(".")]
            } else {
                paths
            };
            Ok(commands::check_command(paths, format, show_hidden, cli.config)?)
        }

        Some(Commands::Actions {
            file,
            offset,
            line,
            column,
            apply,
            write,
            format,
        }) => {
            let position = match (offset, line, column) {
                (Some(offset), _, _) => Position::Offset(offset),
                (None, Some(line), Some(column)) => Position::LineColumn { line, column },
                _ => Position::Offset(0),
            };
            commands::actions_command(file.clone(), position, apply, write, format, cli.config)
                .with_context(|| format!("Failed to compute actions for '{}'", file.display()))?;
            Ok(true)
        }

        Some(Commands::Fix { file, rules, write }) => {
            commands::fix_command(file.clone(), rules, write, cli.config)
                .with_context(|| format!("Failed to fix '{}'", file.display()))?;
            Ok(true)
        }

        Some(Commands::Rules { detailed }) => {
            commands::rules_command(detailed, cli.config)?;
            Ok(true)
        }

        None => {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            Ok(true)
        }
    }
}
