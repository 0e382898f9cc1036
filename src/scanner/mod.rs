//! File scanner for discovering and filtering source files.
//!
//! This module provides a file scanner that respects configuration for
//! extensions, excludes and file size limits, plus snapshot diffing used by
//! watch mode to find the files touched between passes.

use crate::models::normalize_path;
use anyhow::{anyhow, Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Configuration for file scanning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// File extensions to include (e.g., ["rs", "py", "js"])
    pub extensions: Vec<String>,
    /// Directory or file names to skip (e.g., ["node_modules", "target"])
    pub excludes: Vec<String>,
    /// Maximum file size in bytes
    pub max_file_size: u64,
}

impl From<&crate::config::ScannerConfig> for ScanConfig {
    fn from(config: &crate::config::ScannerConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            excludes: config.excludes.clone(),
            max_file_size: config.max_file_size,
        }
    }
}

/// Scanned file information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Normalized path relative to the project root
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modification time, when the platform reports one
    pub modified: Option<SystemTime>,
}

/// File scanner for discovering source files.
pub struct FileScanner {
    config: ScanConfig,
    root: PathBuf,
}

impl FileScanner {
    /// Create a new file scanner.
    pub fn new(root: PathBuf, config: ScanConfig) -> Self {
        Self { config, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scan for all matching files, ordered by path.
    pub fn scan(&self) -> Result<Vec<ScannedFile>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_excluded_entry(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.has_matching_extension(entry.path()) {
                continue;
            }

            let metadata = entry
                .metadata()
                .with_context(|| format!("Failed to stat {}", entry.path().display()))?;
            if metadata.len() > self.config.max_file_size {
                debug!("Skipping large file: {}", entry.path().display());
                continue;
            }

            let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            files.push(ScannedFile {
                path: normalize_path(relative),
                size: metadata.len(),
                modified: metadata.modified().ok(),
            });
        }

        Ok(files)
    }

    /// Modification times of all matching files, keyed by relative path.
    pub fn snapshot(&self) -> Result<Snapshot> {
        Ok(self
            .scan()?
            .into_iter()
            .map(|file| (file.path, file.modified))
            .collect())
    }

    /// Express a user-supplied file as a path relative to the root, the
    /// form used by [`FileScanner::snapshot`] keys.
    ///
    /// Relative paths are taken as relative to the root already. Paths that
    /// leave the root are rejected.
    pub fn relative_path(&self, path: &Path) -> Result<PathBuf> {
        let normalized = normalize_path(path);

        if normalized.is_relative() {
            if normalized.starts_with("..") {
                return Err(anyhow!(
                    "{} is outside the project root {}",
                    path.display(),
                    self.root.display()
                ));
            }
            return Ok(normalized);
        }

        if let Ok(relative) = normalized.strip_prefix(normalize_path(&self.root)) {
            return Ok(normalize_path(relative));
        }

        let canonical_root = self
            .root
            .canonicalize()
            .with_context(|| format!("Failed to resolve {}", self.root.display()))?;
        normalized
            .strip_prefix(&canonical_root)
            .map(normalize_path)
            .map_err(|_| {
                anyhow!(
                    "{} is outside the project root {}",
                    path.display(),
                    self.root.display()
                )
            })
    }

    fn has_matching_extension(&self, path: &Path) -> bool {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        self.config.extensions.iter().any(|e| e == ext)
    }

    fn is_excluded_entry(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        is_excluded_name(&name, &self.config.excludes)
    }
}

/// Hidden entries and explicitly excluded names are skipped.
fn is_excluded_name(name: &str, excludes: &[String]) -> bool {
    name.starts_with('.') || excludes.iter().any(|pattern| name == pattern)
}

/// Relative path to modification time.
pub type Snapshot = BTreeMap<PathBuf, Option<SystemTime>>;

/// Files that differ between two snapshots.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Changes {
    /// New files and files whose modification time changed.
    pub changed: Vec<PathBuf>,
    /// Files present before and missing now.
    pub removed: Vec<PathBuf>,
}

impl Changes {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.removed.is_empty()
    }
}

/// Compare two snapshots.
pub fn diff_snapshots(previous: &Snapshot, current: &Snapshot) -> Changes {
    let changed = current
        .iter()
        .filter(|(path, modified)| previous.get(*path) != Some(*modified))
        .map(|(path, _)| path.clone())
        .collect();
    let removed = previous
        .keys()
        .filter(|path| !current.contains_key(*path))
        .cloned()
        .collect();

    Changes { changed, removed }
}
