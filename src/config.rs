//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.lintkeeper.toml` files.

use crate::report::FormatterSpec;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = ".lintkeeper.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Reporting settings.
    #[serde(default)]
    pub lint: LintOptions,

    /// File discovery settings.
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Line rule settings for the built-in engine.
    #[serde(default)]
    pub rules: RulesConfig,

    /// Watch mode settings.
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Options controlling how results are partitioned, formatted and persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintOptions {
    /// Report error-severity messages.
    #[serde(default = "default_true")]
    pub emit_error: bool,

    /// Report warning-severity messages.
    #[serde(default = "default_true")]
    pub emit_warning: bool,

    /// Report errors only, regardless of `emit_warning`.
    #[serde(default)]
    pub quiet: bool,

    /// Reported errors fail the build.
    #[serde(default)]
    pub fail_on_error: bool,

    /// Reported warnings fail the build.
    #[serde(default)]
    pub fail_on_warning: bool,

    /// Formatter for the returned report. Defaults to the engine's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatter: Option<FormatterSpec>,

    /// Persist the full report to a file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_report: Option<OutputReport>,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            emit_error: true,
            emit_warning: true,
            quiet: false,
            fail_on_error: false,
            fail_on_warning: false,
            formatter: None,
            output_report: None,
        }
    }
}

impl LintOptions {
    /// Whether warnings end up in the returned report.
    pub fn reports_warnings(&self) -> bool {
        self.emit_warning && !self.quiet
    }
}

/// Where and how to persist the full report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputReport {
    /// Target path. Relative paths resolve against the build output directory.
    pub file_path: PathBuf,

    /// Overrides the report formatter for the persisted file only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatter: Option<FormatterSpec>,
}

/// File scanner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// File extensions to include.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory or file names never visited.
    #[serde(default = "default_excludes")]
    pub excludes: Vec<String>,

    /// Path substrings whose files are linted as ignored.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Maximum file size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            excludes: default_excludes(),
            ignore_patterns: Vec::new(),
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec![
        "rs", "py", "js", "ts", "jsx", "tsx", "go", "java", "c", "cpp", "h", "hpp", "toml", "md",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_excludes() -> Vec<String> {
    vec![
        ".git",
        "target",
        "node_modules",
        "vendor",
        "dist",
        "build",
        "__pycache__",
        ".venv",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_max_file_size() -> u64 {
    1024 * 1024 // 1MB
}

/// Rule settings for the built-in line engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Maximum line length in characters (0 disables the rule).
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,

    /// Warn on trailing whitespace.
    #[serde(default = "default_true")]
    pub trailing_whitespace: bool,

    /// Error on merge conflict markers.
    #[serde(default = "default_true")]
    pub conflict_markers: bool,

    /// Warn on tab characters.
    #[serde(default)]
    pub tabs: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            max_line_length: default_max_line_length(),
            trailing_whitespace: true,
            conflict_markers: true,
            tabs: false,
        }
    }
}

fn default_max_line_length() -> usize {
    120
}

/// Watch mode settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Polling interval in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_interval_ms() -> u64 {
    500
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from a project directory.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref format) = args.format {
            self.lint.formatter = Some(FormatterSpec::Named(format.clone()));
        }

        if let Some(ref path) = args.output_report {
            let formatter = args
                .report_format
                .as_deref()
                .map(FormatterSpec::from)
                .or_else(|| {
                    self.lint
                        .output_report
                        .as_ref()
                        .and_then(|r| r.formatter.clone())
                });
            self.lint.output_report = Some(OutputReport {
                file_path: path.clone(),
                formatter,
            });
        }

        if let Some(interval) = args.interval_ms {
            self.watch.interval_ms = interval;
        }

        // Flags always override
        if args.quiet {
            self.lint.quiet = true;
        }
        if args.no_emit_error {
            self.lint.emit_error = false;
        }
        if args.no_emit_warning {
            self.lint.emit_warning = false;
        }
        if args.fail_on_error {
            self.lint.fail_on_error = true;
        }
        if args.fail_on_warning {
            self.lint.fail_on_warning = true;
        }
    }

    /// Check values that only become final after merging file and CLI
    /// settings.
    pub fn validate(&self) -> Result<()> {
        if self.watch.interval_ms == 0 {
            anyhow::bail!("Watch interval must be at least 1 ms (watch.interval_ms = 0)");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
