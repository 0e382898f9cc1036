//! Job scheduling and result aggregation.
//!
//! [`Linter::schedule`] evicts the given files from the context's result
//! store and starts one background job for the batch. [`Linter::report`]
//! drains every job started since the previous report, merges their results
//! into the store and reports on the whole store, so files untouched by the
//! latest pass keep their last known result.

use crate::config::LintOptions;
use crate::context::{lock, BuildContext};
use crate::engine::LintEngine;
use crate::error::LintError;
use crate::models::{normalize_path, LintResult};
use crate::report::{AssetTarget, Formatter, Report, ReportAsset};
use crate::store::{ResultStore, StoreRegistry};
use futures::future::join_all;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A batch that has been handed to the engine and not yet reported on.
struct PendingJob {
    files: Vec<PathBuf>,
    handle: JoinHandle<Vec<LintResult>>,
}

/// Runs lint jobs for one build context and reports on the accumulated
/// results.
pub struct Linter {
    engine: Arc<dyn LintEngine>,
    options: LintOptions,
    context: BuildContext,
    store: ResultStore,
    pending: Mutex<Vec<PendingJob>>,
    formatter: Formatter,
    asset_target: Option<AssetTarget>,
}

impl Linter {
    /// Acquire an engine and build a linter around it.
    ///
    /// A failing `acquire` aborts construction with [`LintError::Setup`].
    pub fn new<F, E>(
        options: LintOptions,
        context: BuildContext,
        registry: &StoreRegistry,
        acquire: F,
    ) -> Result<Self, LintError>
    where
        F: FnOnce() -> Result<Arc<dyn LintEngine>, E>,
        E: fmt::Display,
    {
        let engine = acquire().map_err(|e| LintError::Setup(e.to_string()))?;
        Ok(Self::with_engine(options, context, registry, engine))
    }

    /// Build a linter around an already acquired engine.
    pub fn with_engine(
        options: LintOptions,
        context: BuildContext,
        registry: &StoreRegistry,
        engine: Arc<dyn LintEngine>,
    ) -> Self {
        let formatters = engine.formatters();
        let formatter = formatters.resolve(options.formatter.as_ref());
        let asset_target = options.output_report.as_ref().map(|output| AssetTarget {
            file_path: output.file_path.clone(),
            formatter: match output.formatter {
                Some(ref spec) => formatters.resolve(Some(spec)),
                None => formatter.clone(),
            },
        });
        let store = registry.get_or_create(&context);

        debug!(
            "Linter ready for context {:?} (formatter: {}, {} known result(s))",
            context.id(),
            formatter.name(),
            store.len()
        );

        Self {
            engine,
            options,
            context,
            store,
            pending: Mutex::new(Vec::new()),
            formatter,
            asset_target,
        }
    }

    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn options(&self) -> &LintOptions {
        &self.options
    }

    /// Number of jobs waiting for the next report.
    pub fn pending_jobs(&self) -> usize {
        lock(&self.pending).len()
    }

    /// Lint a batch of files in the background.
    ///
    /// The files' previous results are removed before this returns; their
    /// new results are only visible after a later [`Linter::report`]. A
    /// failing job is recorded in the build context's error sink and
    /// contributes no results.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<I, P>(&self, files: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let files: Vec<PathBuf> = files
            .into_iter()
            .map(|file| normalize_path(&file.into()))
            .collect();

        if files.is_empty() {
            debug!("Nothing to schedule");
            return;
        }

        let evicted = self.store.evict(&files);
        debug!(
            "Scheduling {} file(s), evicted {} stale result(s)",
            files.len(),
            evicted
        );

        let engine = Arc::clone(&self.engine);
        let context = self.context.clone();
        let batch = files.clone();
        let handle = tokio::spawn(async move {
            match engine.lint_files(&batch).await {
                Ok(results) => results,
                Err(err) => {
                    context.push_error(LintError::Job {
                        files: batch,
                        message: format!("{:#}", err),
                    });
                    Vec::new()
                }
            }
        });

        lock(&self.pending).push(PendingJob { files, handle });
    }

    /// Wait for every job scheduled since the previous report, merge their
    /// results and report on all known results.
    ///
    /// Jobs scheduled while this is waiting are left for the next report.
    pub async fn report(&self) -> Report {
        let drained = std::mem::take(&mut *lock(&self.pending));
        debug!("Draining {} lint job(s)", drained.len());

        let outcomes = join_all(
            drained
                .into_iter()
                .map(|job| async move { (job.files, job.handle.await) }),
        )
        .await;

        let mut results = Vec::new();
        for (files, outcome) in outcomes {
            match outcome {
                Ok(batch) => results.extend(batch),
                Err(join_err) => self.context.push_error(LintError::Job {
                    files,
                    message: join_err.to_string(),
                }),
            }
        }

        if let Err(err) = self.engine.cleanup().await {
            warn!("Engine cleanup failed: {:#}", err);
            self.context
                .push_error(LintError::Engine(format!("cleanup failed: {:#}", err)));
        }

        let merged = self
            .store
            .merge(results.into_iter().filter(|result| !result.ignored));
        let snapshot = self.store.snapshot();
        info!(
            "Merged {} new result(s); reporting on {} file(s)",
            merged,
            snapshot.len()
        );

        if snapshot.is_empty() {
            return Report::default();
        }

        let asset = ReportAsset::new(snapshot, self.asset_target.clone());
        Report::build(asset, &self.options, &self.formatter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputReport;
    use crate::report::FormatterSpec;
    use crate::test_utils::{error_result, mixed_result, warning_result, MockEngine};
    use std::path::Path;

    fn linter_with(engine: &Arc<MockEngine>, options: LintOptions) -> Linter {
        let registry = StoreRegistry::new();
        Linter::with_engine(options, BuildContext::new("/out"), &registry, engine.clone())
    }

    fn linter(engine: &Arc<MockEngine>) -> Linter {
        linter_with(engine, LintOptions::default())
    }

    fn reported_files(report: &Report) -> Vec<String> {
        report
            .asset
            .as_ref()
            .map(|asset| {
                asset
                    .results()
                    .iter()
                    .map(|r| r.file_path.to_string_lossy().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_report_without_results_is_empty() {
        let engine = MockEngine::new();
        let linter = linter(&engine);

        let report = linter.report().await;

        assert!(report.is_empty());
        assert_eq!(engine.cleanups(), 1);
    }

    #[tokio::test]
    async fn test_empty_batch_starts_no_job() {
        let engine = MockEngine::new();
        let linter = linter(&engine);

        linter.schedule(Vec::<PathBuf>::new());

        assert_eq!(linter.pending_jobs(), 0);
        linter.report().await;
        assert_eq!(engine.batches(), 0);
    }

    #[tokio::test]
    async fn test_results_persist_across_passes() {
        let engine = MockEngine::new();
        engine.push_result(warning_result("a.rs", "from a"));
        engine.push_result(warning_result("b.rs", "from b"));
        let linter = linter(&engine);

        linter.schedule(["a.rs"]);
        linter.report().await;
        linter.schedule(["b.rs"]);
        let report = linter.report().await;

        assert_eq!(reported_files(&report), vec!["a.rs", "b.rs"]);
        let warnings = report.warnings.unwrap().message;
        assert!(warnings.contains("from a"));
        assert!(warnings.contains("from b"));
        assert!(report.errors.is_none());
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let engine = MockEngine::new();
        engine.push_result(warning_result("a.rs", "first outcome"));
        engine.push_result(error_result("a.rs", "second outcome"));
        let linter = linter(&engine);

        linter.schedule(["a.rs"]);
        linter.schedule(["a.rs"]);
        let report = linter.report().await;

        assert_eq!(engine.batches(), 2);
        assert_eq!(reported_files(&report), vec!["a.rs"]);
        assert!(report.warnings.is_none());
        assert!(report.errors.unwrap().message.contains("second outcome"));
    }

    #[tokio::test]
    async fn test_schedule_evicts_immediately() {
        let engine = MockEngine::new();
        engine.push_result(warning_result("a.rs", "old"));
        engine.push_result(warning_result("b.rs", "b"));
        let linter = linter(&engine);

        linter.schedule(["a.rs", "b.rs"]);
        linter.report().await;
        assert!(linter.store().get("a.rs").is_some());

        engine.push_failure("a.rs", "parser crashed");
        linter.schedule(["./a.rs"]);
        // Gone before the job has had a chance to run
        assert!(linter.store().get("a.rs").is_none());

        let report = linter.report().await;
        assert_eq!(reported_files(&report), vec!["b.rs"]);

        let errors = linter.context().take_errors();
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            LintError::Job { files, message } => {
                assert_eq!(files, &vec![PathBuf::from("a.rs")]);
                assert!(message.contains("parser crashed"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_failed_job_does_not_affect_others() {
        let engine = MockEngine::new();
        engine.push_failure("a.rs", "boom");
        engine.push_result(warning_result("b.rs", "b"));
        let linter = linter(&engine);

        linter.schedule(["a.rs"]);
        linter.schedule(["b.rs"]);
        let report = linter.report().await;

        assert_eq!(reported_files(&report), vec!["b.rs"]);
        assert_eq!(linter.context().error_count(), 1);
    }

    #[tokio::test]
    async fn test_panicking_job_is_recorded_as_job_error() {
        let engine = MockEngine::new();
        engine.push_panic("a.rs", "engine blew up");
        engine.push_result(warning_result("b.rs", "b"));
        let linter = linter(&engine);

        linter.schedule(["a.rs"]);
        linter.schedule(["b.rs"]);
        let report = linter.report().await;

        assert_eq!(reported_files(&report), vec!["b.rs"]);
        let errors = linter.context().take_errors();
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            LintError::Job { files, .. } => assert_eq!(files, &vec![PathBuf::from("a.rs")]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_ignored_results_are_discarded() {
        let engine = MockEngine::new();
        engine.push_result(LintResult::ignored("generated.rs"));
        engine.push_result(warning_result("a.rs", "a"));
        let linter = linter(&engine);

        linter.schedule(["a.rs", "generated.rs"]);
        let report = linter.report().await;

        assert_eq!(reported_files(&report), vec!["a.rs"]);
        assert!(linter.store().get("generated.rs").is_none());
    }

    #[tokio::test]
    async fn test_repeated_report_is_stable() {
        let engine = MockEngine::new();
        engine.push_result(mixed_result("a.rs"));
        let linter = linter(&engine);

        linter.schedule(["a.rs"]);
        let first = linter.report().await;
        let second = linter.report().await;

        assert!(first.errors.is_some());
        assert_eq!(first.errors, second.errors);
        assert_eq!(first.warnings, second.warnings);
        assert_eq!(engine.batches(), 1);
        assert_eq!(engine.cleanups(), 2);
    }

    #[tokio::test]
    async fn test_emit_flags_select_payloads() {
        let engine = MockEngine::new();
        engine.push_result(mixed_result("a.rs"));
        let only_errors = linter_with(
            &engine,
            LintOptions {
                emit_warning: false,
                ..LintOptions::default()
            },
        );
        only_errors.schedule(["a.rs"]);
        let report = only_errors.report().await;
        assert!(report.errors.is_some());
        assert!(report.warnings.is_none());

        engine.push_result(mixed_result("a.rs"));
        let only_warnings = linter_with(
            &engine,
            LintOptions {
                emit_error: false,
                ..LintOptions::default()
            },
        );
        only_warnings.schedule(["a.rs"]);
        let report = only_warnings.report().await;
        assert!(report.errors.is_none());
        assert!(report.warnings.is_some());
    }

    #[tokio::test]
    async fn test_schedule_during_report_is_not_lost() {
        let engine = MockEngine::new();
        engine.push_result(warning_result("a.rs", "a"));
        engine.push_result(warning_result("c.rs", "c"));
        let gate = engine.gate("a.rs");
        let linter = Arc::new(linter(&engine));

        linter.schedule(["a.rs"]);
        let in_flight = {
            let linter = Arc::clone(&linter);
            tokio::spawn(async move { linter.report().await })
        };

        // Let the report drain and start waiting on the gated job
        while linter.pending_jobs() > 0 {
            tokio::task::yield_now().await;
        }
        linter.schedule(["c.rs"]);
        gate.notify_one();

        let first = in_flight.await.unwrap();
        assert_eq!(reported_files(&first), vec!["a.rs"]);

        let second = linter.report().await;
        assert_eq!(reported_files(&second), vec!["a.rs", "c.rs"]);
        let warnings = second.warnings.unwrap().message;
        assert_eq!(warnings.matches("c.rs").count(), 1);
        assert_eq!(linter.context().error_count(), 0);
    }

    #[tokio::test]
    async fn test_store_outlives_linter_instances() {
        let engine = MockEngine::new();
        engine.push_result(warning_result("a.rs", "a"));
        let registry = StoreRegistry::new();
        let context = BuildContext::new("/out");

        let first = Linter::with_engine(
            LintOptions::default(),
            context.clone(),
            &registry,
            engine.clone(),
        );
        first.schedule(["a.rs"]);
        first.report().await;
        drop(first);

        let second =
            Linter::with_engine(LintOptions::default(), context, &registry, engine.clone());
        let report = second.report().await;

        assert_eq!(reported_files(&report), vec!["a.rs"]);
    }

    #[tokio::test]
    async fn test_asset_captures_results_at_report_time() {
        let engine = MockEngine::new();
        engine.push_result(warning_result("a.rs", "a"));
        engine.push_result(error_result("a.rs", "changed"));
        let linter = linter(&engine);

        linter.schedule(["a.rs"]);
        let first = linter.report().await;
        linter.schedule(["a.rs"]);
        linter.report().await;

        let asset = first.asset.unwrap();
        assert_eq!(asset.results()[0].warning_count(), 1);
        assert_eq!(asset.results()[0].error_count(), 0);
    }

    #[tokio::test]
    async fn test_asset_formatter_selection() {
        let engine = MockEngine::new();
        let options = LintOptions {
            formatter: Some(FormatterSpec::Named("compact".to_string())),
            output_report: Some(OutputReport {
                file_path: PathBuf::from("lint.json"),
                formatter: Some(FormatterSpec::Named("json".to_string())),
            }),
            ..LintOptions::default()
        };
        let linter = linter_with(&engine, options);
        linter.schedule(["a.rs"]);
        let report = linter.report().await;
        let asset = report.asset.unwrap();
        let target = asset.target().unwrap();
        assert_eq!(target.formatter.name(), "json");
        assert_eq!(target.file_path, Path::new("lint.json"));

        let options = LintOptions {
            formatter: Some(FormatterSpec::Named("compact".to_string())),
            output_report: Some(OutputReport {
                file_path: PathBuf::from("lint.txt"),
                formatter: None,
            }),
            ..LintOptions::default()
        };
        let linter = linter_with(&engine, options);
        linter.schedule(["a.rs"]);
        let report = linter.report().await;
        assert_eq!(report.asset.unwrap().target().unwrap().formatter.name(), "compact");
    }

    #[tokio::test]
    async fn test_clean_results_still_produce_asset() {
        let engine = MockEngine::new();
        let linter = linter(&engine);

        linter.schedule(["clean.rs"]);
        let report = linter.report().await;

        assert!(report.errors.is_none());
        assert!(report.warnings.is_none());
        assert_eq!(reported_files(&report), vec!["clean.rs"]);
    }

    #[test]
    fn test_setup_failure_aborts_construction() {
        let result = Linter::new(
            LintOptions::default(),
            BuildContext::new("/out"),
            &StoreRegistry::new(),
            || Err::<Arc<dyn LintEngine>, _>("engine not installed"),
        );

        match result {
            Err(LintError::Setup(message)) => assert_eq!(message, "engine not installed"),
            _ => panic!("expected setup failure"),
        }
    }
}
