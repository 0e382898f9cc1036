//! Analysis engine interface.
//!
//! The linter core does not evaluate rules itself. It drives an engine that
//! analyzes batches of files and exposes a registry of named formatters.

pub mod line_rules;

pub use line_rules::LineRulesEngine;

use crate::models::LintResult;
use crate::report::FormatterRegistry;
use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// An analysis engine driven by the linter.
#[async_trait]
pub trait LintEngine: Send + Sync {
    /// Analyze exactly `files` and return one result per analyzed file.
    /// A returned error fails the whole batch.
    async fn lint_files(&self, files: &[PathBuf]) -> Result<Vec<LintResult>>;

    /// Release resources held between passes. Called once per report cycle.
    async fn cleanup(&self) -> Result<()> {
        Ok(())
    }

    /// Named formatters provided by this engine.
    fn formatters(&self) -> &FormatterRegistry;
}
