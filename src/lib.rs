//! lintkeeper - incremental lint result engine
//!
//! Keeps per-file lint results alive across many partially overlapping
//! passes of the same project. Files are (re)linted in background jobs via
//! [`Linter::schedule`]; [`Linter::report`] drains the finished jobs and
//! reports on every file with a known result, not just the ones touched by
//! the latest pass.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod linter;
pub mod models;
pub mod report;
pub mod scanner;
pub mod store;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::{Config, LintOptions, OutputReport};
pub use context::{BuildContext, OutputFileSystem, TokioFileSystem};
pub use engine::{LineRulesEngine, LintEngine};
pub use error::{FailureKind, LintError, ReportFailure};
pub use linter::Linter;
pub use models::{LintMessage, LintResult, Severity};
pub use report::{Formatter, FormatterRegistry, FormatterSpec, Report, ReportAsset};
pub use store::{ResultStore, StoreRegistry};
