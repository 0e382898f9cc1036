//! Splitting an aggregate result set into error and warning reports.

use crate::config::LintOptions;
use crate::error::ReportFailure;
use crate::models::{LintResult, Severity};
use crate::report::{Formatter, ReportAsset};

/// Results split by severity. Each result holds only messages of its half.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partitioned {
    pub errors: Vec<LintResult>,
    pub warnings: Vec<LintResult>,
}

/// Split `results` into error-only and warning-only copies.
///
/// A file appears in a half only when it has at least one message that
/// half keeps under `options`.
pub fn partition(results: &[LintResult], options: &LintOptions) -> Partitioned {
    let mut partitioned = Partitioned::default();

    for result in results {
        if options.emit_error {
            let errors = result.only(Severity::Error);
            if !errors.messages.is_empty() {
                partitioned.errors.push(errors);
            }
        }

        if options.reports_warnings() {
            let warnings = result.only(Severity::Warning);
            if !warnings.messages.is_empty() {
                partitioned.warnings.push(warnings);
            }
        }
    }

    partitioned
}

/// Render each non-empty half through `formatter`.
pub fn format_partitioned(
    partitioned: &Partitioned,
    formatter: &Formatter,
) -> (Option<ReportFailure>, Option<ReportFailure>) {
    let warnings = (!partitioned.warnings.is_empty())
        .then(|| ReportFailure::warnings(formatter.format(&partitioned.warnings)));
    let errors = (!partitioned.errors.is_empty())
        .then(|| ReportFailure::errors(formatter.format(&partitioned.errors)));

    (errors, warnings)
}

/// Outcome of one report cycle.
#[derive(Debug, Default)]
pub struct Report {
    /// Formatted error-severity results, if any qualified.
    pub errors: Option<ReportFailure>,
    /// Formatted warning-severity results, if any qualified.
    pub warnings: Option<ReportFailure>,
    /// Deferred writer for the full report file.
    pub asset: Option<ReportAsset>,
    fail_on_error: bool,
    fail_on_warning: bool,
}

impl Report {
    /// Build a report from the aggregate result set captured in `asset`.
    pub(crate) fn build(asset: ReportAsset, options: &LintOptions, formatter: &Formatter) -> Self {
        let partitioned = partition(asset.results(), options);
        let (errors, warnings) = format_partitioned(&partitioned, formatter);

        Self {
            errors,
            warnings,
            asset: Some(asset),
            fail_on_error: options.fail_on_error,
            fail_on_warning: options.fail_on_warning,
        }
    }

    /// No errors, no warnings and nothing to write.
    pub fn is_empty(&self) -> bool {
        self.errors.is_none() && self.warnings.is_none() && self.asset.is_none()
    }

    /// Whether the reported problems should fail the build.
    pub fn fails_build(&self) -> bool {
        (self.fail_on_error && self.errors.is_some())
            || (self.fail_on_warning && self.warnings.is_some())
    }
}
