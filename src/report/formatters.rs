//! Result formatters.
//!
//! A formatter turns a slice of [`LintResult`] into text. Formatters are
//! either looked up by name in a [`FormatterRegistry`] or supplied directly
//! as a closure.

use crate::analysis::aggregator::plural;
use crate::analysis::{
    generate_summary_text, most_problematic_files, rules_by_frequency, ResultSummary,
};
use crate::models::{LintResult, Severity};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Signature shared by all formatters.
pub type FormatFn = dyn Fn(&[LintResult]) -> String + Send + Sync;

/// A named formatting function.
#[derive(Clone)]
pub struct Formatter {
    name: String,
    render: Arc<FormatFn>,
}

impl Formatter {
    pub fn new<F>(name: impl Into<String>, render: F) -> Self
    where
        F: Fn(&[LintResult]) -> String + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            render: Arc::new(render),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self, results: &[LintResult]) -> String {
        (self.render)(results)
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Formatter").field(&self.name).finish()
    }
}

/// How a formatter is chosen: by registry name or supplied directly.
#[derive(Debug, Clone)]
pub enum FormatterSpec {
    Named(String),
    Custom(Formatter),
}

impl From<&str> for FormatterSpec {
    fn from(name: &str) -> Self {
        FormatterSpec::Named(name.to_string())
    }
}

impl From<Formatter> for FormatterSpec {
    fn from(formatter: Formatter) -> Self {
        FormatterSpec::Custom(formatter)
    }
}

// Only names round-trip through config files.
impl Serialize for FormatterSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FormatterSpec::Named(name) => serializer.serialize_str(name),
            FormatterSpec::Custom(formatter) => serializer.serialize_str(formatter.name()),
        }
    }
}

impl<'de> Deserialize<'de> for FormatterSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(FormatterSpec::Named)
    }
}

/// Named formatters plus one designated default.
#[derive(Debug, Clone)]
pub struct FormatterRegistry {
    formatters: HashMap<String, Formatter>,
    default: Formatter,
}

pub const DEFAULT_FORMATTER: &str = "stylish";

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FormatterRegistry {
    /// Registry holding the built-in `stylish`, `compact`, `json` and
    /// `markdown` formatters, with `stylish` as the default.
    pub fn builtin() -> Self {
        let default = Formatter::new(DEFAULT_FORMATTER, format_stylish);
        let mut registry = Self {
            formatters: HashMap::new(),
            default: default.clone(),
        };
        registry.register(default);
        registry.register(Formatter::new("compact", format_compact));
        registry.register(Formatter::new("json", format_json));
        registry.register(Formatter::new("markdown", format_markdown));
        registry
    }

    /// Add or replace a named formatter.
    pub fn register(&mut self, formatter: Formatter) {
        self.formatters.insert(formatter.name().to_string(), formatter);
    }

    pub fn get(&self, name: &str) -> Option<&Formatter> {
        self.formatters.get(name)
    }

    pub fn default_formatter(&self) -> &Formatter {
        &self.default
    }

    /// Sorted list of registered names.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.formatters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve a formatter spec. Unknown names and a missing spec fall back
    /// to the default formatter; this never fails.
    pub fn resolve(&self, spec: Option<&FormatterSpec>) -> Formatter {
        match spec {
            Some(FormatterSpec::Custom(formatter)) => formatter.clone(),
            Some(FormatterSpec::Named(name)) => match self.get(name) {
                Some(formatter) => formatter.clone(),
                None => {
                    debug!(
                        "Unknown formatter '{}', using '{}'",
                        name,
                        self.default.name()
                    );
                    self.default.clone()
                }
            },
            None => self.default.clone(),
        }
    }
}

fn location(line: usize, column: usize) -> String {
    format!("{}:{}", line, column)
}

/// Grouped by file, one aligned line per message, totals at the end.
pub fn format_stylish(results: &[LintResult]) -> String {
    let summary = ResultSummary::from_results(results);
    if summary.total() == 0 {
        return String::new();
    }

    let mut output = String::new();

    for result in results.iter().filter(|r| !r.messages.is_empty()) {
        output.push_str(&format!("\n{}\n", result.file_path.display()));

        let loc_width = result
            .messages
            .iter()
            .map(|m| location(m.line, m.column).len())
            .max()
            .unwrap_or(0);

        for message in &result.messages {
            output.push_str(&format!(
                "  {:>width$}  {:<7}  {}",
                location(message.line, message.column),
                message.severity.to_string(),
                message.message,
                width = loc_width
            ));
            if let Some(ref rule) = message.rule_id {
                output.push_str(&format!("  {}", rule));
            }
            output.push('\n');
        }
    }

    output.push_str(&format!(
        "\n\u{2716} {} problem{} ({} error{}, {} warning{})\n",
        summary.total(),
        plural(summary.total()),
        summary.errors,
        plural(summary.errors),
        summary.warnings,
        plural(summary.warnings),
    ));

    output
}

/// One line per message.
pub fn format_compact(results: &[LintResult]) -> String {
    let mut lines = Vec::new();

    for result in results {
        for message in &result.messages {
            let severity = match message.severity {
                Severity::Error => "Error",
                Severity::Warning => "Warning",
            };
            let mut line = format!(
                "{}: line {}, col {}, {} - {}",
                result.file_path.display(),
                message.line,
                message.column,
                severity,
                message.message
            );
            if let Some(ref rule) = message.rule_id {
                line.push_str(&format!(" ({})", rule));
            }
            lines.push(line);
        }
    }

    let total: usize = results.iter().map(|r| r.messages.len()).sum();
    if total > 0 {
        lines.push(String::new());
        lines.push(format!("{} problem{}", total, plural(total)));
    }

    lines.join("\n")
}

/// The results as a JSON array.
pub fn format_json(results: &[LintResult]) -> String {
    serde_json::to_string(results).unwrap_or_else(|_| "[]".to_string())
}

/// A Markdown document grouped by file.
pub fn format_markdown(results: &[LintResult]) -> String {
    let summary = ResultSummary::from_results(results);
    let mut output = String::new();

    output.push_str("# Lint Report\n\n");

    // Summary section
    output.push_str("## Summary\n\n");
    output.push_str(&format!("{}\n\n", generate_summary_text(&summary)));
    output.push_str("| Errors | Warnings | **Total** |\n");
    output.push_str("|:---:|:---:|:---:|\n");
    output.push_str(&format!(
        "| {} | {} | **{}** |\n\n",
        summary.errors,
        summary.warnings,
        summary.total()
    ));

    if !summary.by_rule.is_empty() {
        output.push_str("### Problems by Rule\n\n");
        output.push_str("| Rule | Count |\n");
        output.push_str("|:---|:---:|\n");
        for (rule, count) in rules_by_frequency(&summary) {
            output.push_str(&format!("| `{}` | {} |\n", rule, count));
        }
        output.push('\n');
    }

    let problematic = most_problematic_files(results, 5);
    if !problematic.is_empty() {
        output.push_str("### Most Problematic Files\n\n");
        output.push_str("| File | Problems |\n");
        output.push_str("|:---|:---:|\n");
        for (result, count) in problematic {
            output.push_str(&format!("| `{}` | {} |\n", result.file_path.display(), count));
        }
        output.push('\n');
    }

    // Problems by file
    output.push_str("## Problems by File\n\n");
    let with_problems: Vec<_> = results.iter().filter(|r| !r.messages.is_empty()).collect();

    if with_problems.is_empty() {
        output.push_str("No problems were found.\n");
        return output;
    }

    for result in with_problems {
        output.push_str(&format!("### {}\n\n", result.file_path.display()));
        output.push_str("| Line | Severity | Rule | Message |\n");
        output.push_str("|:---:|:---|:---|:---|\n");
        for message in &result.messages {
            output.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                location(message.line, message.column),
                message.severity,
                message.rule_id.as_deref().unwrap_or(""),
                message.message.replace('|', "\\|"),
            ));
        }
        output.push('\n');
    }

    output
}
