//! Built-in line-oriented lint engine.
//!
//! Checks each line of a file against a small set of configurable rules:
//! line length, trailing whitespace, tab characters and merge conflict
//! markers. Files matching an ignore pattern produce an ignored result.

use crate::config::RulesConfig;
use crate::engine::LintEngine;
use crate::models::{normalize_path, LintMessage, LintResult};
use crate::report::FormatterRegistry;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const RULE_MAX_LINE_LENGTH: &str = "max-line-length";
pub const RULE_TRAILING_SPACES: &str = "no-trailing-spaces";
pub const RULE_TABS: &str = "no-tabs";
pub const RULE_CONFLICT_MARKERS: &str = "no-conflict-markers";

/// Lint engine applying [`RulesConfig`] to files under a project root.
pub struct LineRulesEngine {
    root: PathBuf,
    rules: RulesConfig,
    ignore_patterns: Vec<String>,
    formatters: FormatterRegistry,
}

impl LineRulesEngine {
    pub fn new(root: PathBuf, rules: RulesConfig, ignore_patterns: Vec<String>) -> Self {
        Self {
            root,
            rules,
            ignore_patterns,
            formatters: FormatterRegistry::builtin(),
        }
    }

    /// Check the engine can work on its root.
    pub fn validate(&self) -> Result<()> {
        if !self.root.is_dir() {
            anyhow::bail!("Project root is not a directory: {}", self.root.display());
        }
        Ok(())
    }

    fn is_ignored(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        self.ignore_patterns
            .iter()
            .any(|pattern| !pattern.is_empty() && path.contains(pattern.as_str()))
    }

    async fn lint_file(&self, file: &Path) -> Result<LintResult> {
        let relative = normalize_path(file);

        if self.is_ignored(&relative) {
            debug!("Ignoring {}", relative.display());
            return Ok(LintResult::ignored(relative));
        }

        let source = tokio::fs::read_to_string(self.root.join(&relative))
            .await
            .with_context(|| format!("Failed to read {}", relative.display()))?;

        Ok(lint_source(&relative, &source, &self.rules))
    }
}

#[async_trait]
impl LintEngine for LineRulesEngine {
    async fn lint_files(&self, files: &[PathBuf]) -> Result<Vec<LintResult>> {
        let mut results = Vec::with_capacity(files.len());
        for file in files {
            results.push(self.lint_file(file).await?);
        }
        Ok(results)
    }

    fn formatters(&self) -> &FormatterRegistry {
        &self.formatters
    }
}

fn is_conflict_marker(line: &str) -> bool {
    line.starts_with("<<<<<<<") || line.starts_with(">>>>>>>") || line == "======="
}

/// Apply `rules` to the contents of one file.
pub fn lint_source(path: &Path, source: &str, rules: &RulesConfig) -> LintResult {
    let mut messages = Vec::new();

    for (index, line) in source.lines().enumerate() {
        let line_no = index + 1;

        if rules.conflict_markers && is_conflict_marker(line) {
            messages.push(LintMessage::error(
                RULE_CONFLICT_MARKERS,
                "Merge conflict marker",
                line_no,
                1,
            ));
        }

        let length = line.chars().count();
        if rules.max_line_length > 0 && length > rules.max_line_length {
            messages.push(LintMessage::warning(
                RULE_MAX_LINE_LENGTH,
                format!(
                    "Line is too long ({} > {})",
                    length, rules.max_line_length
                ),
                line_no,
                rules.max_line_length + 1,
            ));
        }

        if rules.trailing_whitespace {
            let trimmed = line.trim_end();
            if trimmed.len() < line.len() {
                messages.push(LintMessage::warning(
                    RULE_TRAILING_SPACES,
                    "Trailing spaces not allowed",
                    line_no,
                    trimmed.chars().count() + 1,
                ));
            }
        }

        if rules.tabs {
            if let Some(column) = line.chars().position(|c| c == '\t') {
                messages.push(LintMessage::warning(
                    RULE_TABS,
                    "Unexpected tab character",
                    line_no,
                    column + 1,
                ));
            }
        }
    }

    LintResult::new(path, messages)
}
