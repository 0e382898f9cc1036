//! Error types for the lint result engine.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the linter core.
#[derive(Debug, Error)]
pub enum LintError {
    /// The analysis engine could not be acquired.
    #[error("Failed to set up lint engine: {0}")]
    Setup(String),

    /// A scheduled analysis job failed. Recorded in the build context's
    /// error sink, never returned to the caller of `schedule` or `report`.
    #[error("Lint job for {} file(s) failed: {message}", .files.len())]
    Job { files: Vec<PathBuf>, message: String },

    /// The engine failed outside of a job (e.g. during cleanup).
    #[error("Lint engine error: {0}")]
    Engine(String),

    /// The report asset could not be written.
    #[error("Failed to write lint report to {}: {source}", .path.display())]
    Asset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Which half of a partitioned report a failure payload carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Errors,
    Warnings,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Errors => write!(f, "errors"),
            FailureKind::Warnings => write!(f, "warnings"),
        }
    }
}

/// Formatted lint output for one severity, surfaced to the build as an error
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[lintkeeper] {kind}:\n{message}")]
pub struct ReportFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl ReportFailure {
    pub fn errors(message: String) -> Self {
        Self {
            kind: FailureKind::Errors,
            message,
        }
    }

    pub fn warnings(message: String) -> Self {
        Self {
            kind: FailureKind::Warnings,
            message,
        }
    }
}
