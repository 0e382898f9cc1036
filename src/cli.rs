//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// lintkeeper - incremental lint runner with a cross-pass result cache
///
/// Lints a project once, or keeps watching it and re-lints only the files
/// that changed while still reporting on every file.
///
/// Examples:
///   lintkeeper
///   lintkeeper --root ./my-project --format compact
///   lintkeeper src/lib.rs src/main.rs --fail-on-error
///   lintkeeper --watch --output-report reports/lint.json --report-format json
///   lintkeeper --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Files to lint (relative to --root). Defaults to every matching file.
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Project root directory
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    pub root: PathBuf,

    /// Path to configuration file
    ///
    /// If not specified, looks for .lintkeeper.toml in the project root
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Formatter for console output (stylish, compact, json, markdown)
    #[arg(short, long, value_name = "NAME", env = "LINTKEEPER_FORMAT")]
    pub format: Option<String>,

    /// Also write the full report to this file
    ///
    /// Relative paths are resolved against --output-dir.
    #[arg(short, long, value_name = "FILE")]
    pub output_report: Option<PathBuf>,

    /// Formatter for the written report (defaults to --format)
    #[arg(long, value_name = "NAME", requires = "output_report")]
    pub report_format: Option<String>,

    /// Directory relative report paths are resolved against
    ///
    /// Defaults to the project root.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Keep running and re-lint changed files
    #[arg(short, long)]
    pub watch: bool,

    /// Polling interval for --watch in milliseconds
    #[arg(long, value_name = "MS", requires = "watch")]
    pub interval_ms: Option<u64>,

    /// Report errors only
    #[arg(short, long)]
    pub quiet: bool,

    /// Do not report error-severity messages
    #[arg(long)]
    pub no_emit_error: bool,

    /// Do not report warning-severity messages
    #[arg(long)]
    pub no_emit_warning: bool,

    /// Exit with code 2 when errors are reported
    #[arg(long)]
    pub fail_on_error: bool,

    /// Exit with code 2 when warnings are reported
    #[arg(long)]
    pub fail_on_warning: bool,

    /// Only list the files that would be linted
    #[arg(long, conflicts_with = "watch")]
    pub dry_run: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub silent: bool,

    /// Generate a default .lintkeeper.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if !self.root.is_dir() {
            return Err(format!(
                "Project root is not a directory: {}",
                self.root.display()
            ));
        }

        if self.verbose && self.silent {
            return Err("Cannot use both --verbose and --silent".to_string());
        }

        if self.no_emit_error && self.no_emit_warning {
            return Err("Cannot use both --no-emit-error and --no-emit-warning".to_string());
        }

        if let Some(interval) = self.interval_ms {
            if interval == 0 {
                return Err("Watch interval must be at least 1 ms".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.silent {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
