//! Persisting the full report to a file.

use crate::context::BuildContext;
use crate::error::LintError;
use crate::models::LintResult;
use crate::report::Formatter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Where the report asset goes and how it is rendered.
#[derive(Debug, Clone)]
pub struct AssetTarget {
    pub file_path: PathBuf,
    pub formatter: Formatter,
}

/// Deferred report file write, captured at the end of a report cycle.
///
/// The result set is a snapshot: later passes do not change what this asset
/// writes.
#[derive(Debug, Clone)]
pub struct ReportAsset {
    results: Arc<Vec<LintResult>>,
    target: Option<AssetTarget>,
}

impl ReportAsset {
    pub fn new(results: Vec<LintResult>, target: Option<AssetTarget>) -> Self {
        Self {
            results: Arc::new(results),
            target,
        }
    }

    /// The unfiltered results this asset renders.
    pub fn results(&self) -> &[LintResult] {
        &self.results
    }

    pub fn target(&self) -> Option<&AssetTarget> {
        self.target.as_ref()
    }

    /// Render and write the report file.
    ///
    /// Returns the written path, or `None` when no output report is
    /// configured.
    pub async fn generate(&self, context: &BuildContext) -> Result<Option<PathBuf>, LintError> {
        let Some(target) = &self.target else {
            debug!("No output report configured");
            return Ok(None);
        };

        let content = target.formatter.format(&self.results);
        let path = resolve_report_path(&target.file_path, context.output_dir());
        let fs = context.fs();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs.create_dir_all(parent)
                .await
                .map_err(|source| LintError::Asset {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        fs.write(&path, content.as_bytes())
            .await
            .map_err(|source| LintError::Asset {
                path: path.clone(),
                source,
            })?;

        info!(
            "Wrote {} report for {} file(s) to {}",
            target.formatter.name(),
            self.results.len(),
            path.display()
        );
        Ok(Some(path))
    }
}

/// Absolute paths are used as-is; relative paths join onto `output_dir`.
pub fn resolve_report_path(file_path: &Path, output_dir: &Path) -> PathBuf {
    if file_path.is_absolute() {
        file_path.to_path_buf()
    } else {
        output_dir.join(file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::OutputFileSystem;
    use crate::models::LintMessage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingFs {
        dirs: Mutex<Vec<PathBuf>>,
        files: Mutex<Vec<(PathBuf, String)>>,
        fail_mkdir: bool,
        fail_write: bool,
    }

    #[async_trait]
    impl OutputFileSystem for RecordingFs {
        async fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
            if self.fail_mkdir {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "mkdir denied",
                ));
            }
            self.dirs.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }

        async fn write(&self, path: &Path, contents: &[u8]) -> std::io::Result<()> {
            if self.fail_write {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
            }
            self.files.lock().unwrap().push((
                path.to_path_buf(),
                String::from_utf8_lossy(contents).to_string(),
            ));
            Ok(())
        }
    }

    fn results() -> Vec<LintResult> {
        vec![LintResult::new(
            "a.rs",
            vec![
                LintMessage::error("no-conflict-markers", "conflict", 1, 1),
                LintMessage::warning("no-tabs", "tab", 2, 1),
            ],
        )]
    }

    fn target(path: &str) -> AssetTarget {
        AssetTarget {
            file_path: PathBuf::from(path),
            formatter: Formatter::new("messages", |results| {
                results.iter().map(|r| r.messages.len()).sum::<usize>().to_string()
            }),
        }
    }

    #[test]
    fn test_resolve_report_path() {
        assert_eq!(
            resolve_report_path(Path::new("report.json"), Path::new("/out")),
            PathBuf::from("/out/report.json")
        );
        assert_eq!(
            resolve_report_path(Path::new("/abs/report.json"), Path::new("/out")),
            PathBuf::from("/abs/report.json")
        );
    }

    #[tokio::test]
    async fn test_generate_without_target_is_noop() {
        let fs = Arc::new(RecordingFs::default());
        let ctx = BuildContext::with_fs("/out", fs.clone());

        let written = ReportAsset::new(results(), None).generate(&ctx).await.unwrap();

        assert!(written.is_none());
        assert!(fs.files.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_writes_unfiltered_results() {
        let fs = Arc::new(RecordingFs::default());
        let ctx = BuildContext::with_fs("/out", fs.clone());

        let asset = ReportAsset::new(results(), Some(target("reports/lint.txt")));
        let written = asset.generate(&ctx).await.unwrap();

        assert_eq!(written, Some(PathBuf::from("/out/reports/lint.txt")));
        assert_eq!(*fs.dirs.lock().unwrap(), vec![PathBuf::from("/out/reports")]);
        let files = fs.files.lock().unwrap();
        assert_eq!(files[0].0, PathBuf::from("/out/reports/lint.txt"));
        // Both severities are rendered
        assert_eq!(files[0].1, "2");
    }

    #[tokio::test]
    async fn test_generate_surfaces_mkdir_failure() {
        let fs = Arc::new(RecordingFs {
            fail_mkdir: true,
            ..RecordingFs::default()
        });
        let ctx = BuildContext::with_fs("/out", fs.clone());

        let err = ReportAsset::new(results(), Some(target("nested/lint.txt")))
            .generate(&ctx)
            .await
            .unwrap_err();

        assert!(matches!(err, LintError::Asset { ref path, .. } if path == Path::new("/out/nested")));
        assert!(fs.files.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_surfaces_write_failure() {
        let fs = Arc::new(RecordingFs {
            fail_write: true,
            ..RecordingFs::default()
        });
        let ctx = BuildContext::with_fs("/out", fs);

        let err = ReportAsset::new(results(), Some(target("/abs/lint.txt")))
            .generate(&ctx)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("/abs/lint.txt"));
        assert!(err.to_string().contains("disk full"));
    }

    #[tokio::test]
    async fn test_generate_on_real_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = BuildContext::new(dir.path());

        let asset = ReportAsset::new(results(), Some(target("deep/er/lint.txt")));
        asset.generate(&ctx).await.unwrap();

        let written = std::fs::read_to_string(dir.path().join("deep/er/lint.txt")).unwrap();
        assert_eq!(written, "2");
    }
}
