//! Data models for lint results.
//!
//! This module contains the core data structures passed between the
//! analysis engine, the result store and the report formatters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Severity level of a lint message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Reported, but does not indicate a broken file.
    Warning,
    /// The file violates a rule configured as an error.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single message produced by a rule for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintMessage {
    /// Identifier of the rule that produced the message, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    /// Severity of the message.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// Line number (1-indexed, 0 when not tied to a line).
    pub line: usize,
    /// Column number (1-indexed, 0 when not tied to a column).
    pub column: usize,
}

impl LintMessage {
    /// Creates an error-severity message.
    pub fn error(rule_id: &str, message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            rule_id: Some(rule_id.to_string()),
            severity: Severity::Error,
            message: message.into(),
            line,
            column,
        }
    }

    /// Creates a warning-severity message.
    pub fn warning(rule_id: &str, message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            rule_id: Some(rule_id.to_string()),
            severity: Severity::Warning,
            message: message.into(),
            line,
            column,
        }
    }
}

/// Outcome of analyzing one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintResult {
    /// Normalized path of the analyzed file.
    pub file_path: PathBuf,
    /// Excluded from all reporting (e.g. matched an ignore pattern).
    #[serde(default)]
    pub ignored: bool,
    /// Messages in the order the engine produced them.
    pub messages: Vec<LintMessage>,
}

impl LintResult {
    /// Creates a result with the given messages.
    pub fn new(file_path: impl AsRef<Path>, messages: Vec<LintMessage>) -> Self {
        Self {
            file_path: normalize_path(file_path.as_ref()),
            ignored: false,
            messages,
        }
    }

    /// Creates a result for a file excluded from reporting.
    pub fn ignored(file_path: impl AsRef<Path>) -> Self {
        Self {
            file_path: normalize_path(file_path.as_ref()),
            ignored: true,
            messages: Vec::new(),
        }
    }

    /// Number of error-severity messages.
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    /// Number of warning-severity messages.
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.messages
            .iter()
            .filter(|m| m.severity == severity)
            .count()
    }

    /// Returns a copy holding only the messages of one severity.
    pub fn only(&self, severity: Severity) -> Self {
        Self {
            file_path: self.file_path.clone(),
            ignored: self.ignored,
            messages: self
                .messages
                .iter()
                .filter(|m| m.severity == severity)
                .cloned()
                .collect(),
        }
    }
}

/// Lexically normalizes a path so that `./src/../src/a.rs` and `src/a.rs`
/// map to the same store key.
///
/// The filesystem is never consulted; symlinks are not resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let ends_in_name =
                    matches!(normalized.components().next_back(), Some(Component::Normal(_)));
                let popped = ends_in_name && normalized.pop();
                if !popped && !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }

    normalized
}
