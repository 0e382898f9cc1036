//! Report formatting and output.
//!
//! This module partitions aggregate results by severity, renders them
//! through formatters and persists the full report to a file.

pub mod formatters;
pub mod partition;
pub mod writer;

pub use formatters::{Formatter, FormatterRegistry, FormatterSpec, DEFAULT_FORMATTER};
pub use partition::{format_partitioned, partition, Partitioned, Report};
pub use writer::{resolve_report_path, AssetTarget, ReportAsset};
