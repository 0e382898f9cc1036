//! Result statistics.
//!
//! This module computes summary statistics over a set of lint results for
//! use by the formatters and the command-line summary.

use crate::models::{LintResult, Severity};
use std::collections::HashMap;

/// Summary of the problems in a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSummary {
    /// Number of files in the result set.
    pub files: usize,
    /// Number of files with at least one message.
    pub files_with_problems: usize,
    /// Number of error-severity messages.
    pub errors: usize,
    /// Number of warning-severity messages.
    pub warnings: usize,
    /// Messages grouped by rule id.
    pub by_rule: HashMap<String, usize>,
}

impl ResultSummary {
    /// Creates a summary from a list of results.
    pub fn from_results(results: &[LintResult]) -> Self {
        let mut summary = Self {
            files: results.len(),
            ..Self::default()
        };

        for result in results {
            if !result.messages.is_empty() {
                summary.files_with_problems += 1;
            }

            for message in &result.messages {
                match message.severity {
                    Severity::Error => summary.errors += 1,
                    Severity::Warning => summary.warnings += 1,
                }

                let rule = message.rule_id.as_deref().unwrap_or("(none)");
                *summary.by_rule.entry(rule.to_string()).or_insert(0) += 1;
            }
        }

        summary
    }

    /// Total number of messages.
    pub fn total(&self) -> usize {
        self.errors + self.warnings
    }
}

/// Identify the files with the most messages.
pub fn most_problematic_files(results: &[LintResult], n: usize) -> Vec<(&LintResult, usize)> {
    let mut file_problems: Vec<_> = results
        .iter()
        .map(|r| (r, r.messages.len()))
        .filter(|(_, count)| *count > 0)
        .collect();

    // Stable sort keeps path order for ties
    file_problems.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
    file_problems.truncate(n);

    file_problems
}

/// Rules ordered by how often they fired.
pub fn rules_by_frequency(summary: &ResultSummary) -> Vec<(&str, usize)> {
    let mut rules: Vec<_> = summary
        .by_rule
        .iter()
        .map(|(rule, count)| (rule.as_str(), *count))
        .collect();

    rules.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    rules
}

/// Generate a one-line text summary.
pub fn generate_summary_text(summary: &ResultSummary) -> String {
    format!(
        "{} problem{} ({} error{}, {} warning{}) in {} of {} file{}",
        summary.total(),
        plural(summary.total()),
        summary.errors,
        plural(summary.errors),
        summary.warnings,
        plural(summary.warnings),
        summary.files_with_problems,
        summary.files,
        plural(summary.files),
    )
}

pub(crate) fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
