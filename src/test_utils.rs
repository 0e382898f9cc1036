//! Test helpers shared across modules.

use crate::engine::LintEngine;
use crate::models::{normalize_path, LintMessage, LintResult};
use crate::report::FormatterRegistry;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// What the mock engine does the next time it sees a file.
pub(crate) enum Outcome {
    Result(LintResult),
    Fail(String),
    Panic(String),
}

/// Engine returning scripted outcomes per file.
///
/// Files without a scripted outcome come back clean. A gated file makes its
/// whole batch wait until the gate is notified.
#[derive(Default)]
pub(crate) struct MockEngine {
    outcomes: Mutex<HashMap<PathBuf, VecDeque<Outcome>>>,
    gates: Mutex<HashMap<PathBuf, Arc<Notify>>>,
    batches: AtomicUsize,
    cleanups: AtomicUsize,
    formatters: FormatterRegistry,
}

impl MockEngine {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn push_result(&self, result: LintResult) {
        let key = normalize_path(&result.file_path);
        self.push(key, Outcome::Result(result));
    }

    pub(crate) fn push_failure(&self, file: &str, message: &str) {
        self.push(normalize_path(Path::new(file)), Outcome::Fail(message.to_string()));
    }

    pub(crate) fn push_panic(&self, file: &str, message: &str) {
        self.push(normalize_path(Path::new(file)), Outcome::Panic(message.to_string()));
    }

    fn push(&self, key: PathBuf, outcome: Outcome) {
        self.outcomes
            .lock()
            .unwrap()
            .entry(key)
            .or_default()
            .push_back(outcome);
    }

    /// Hold the next batch containing `file` until the returned gate fires.
    pub(crate) fn gate(&self, file: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(normalize_path(Path::new(file)), Arc::clone(&notify));
        notify
    }

    pub(crate) fn batches(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }

    pub(crate) fn cleanups(&self) -> usize {
        self.cleanups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LintEngine for MockEngine {
    async fn lint_files(&self, files: &[PathBuf]) -> anyhow::Result<Vec<LintResult>> {
        self.batches.fetch_add(1, Ordering::SeqCst);

        let mut results = Vec::new();
        for file in files {
            let key = normalize_path(file);

            let gate = self.gates.lock().unwrap().remove(&key);
            if let Some(gate) = gate {
                gate.notified().await;
            }

            let outcome = self
                .outcomes
                .lock()
                .unwrap()
                .get_mut(&key)
                .and_then(VecDeque::pop_front);

            match outcome {
                Some(Outcome::Result(result)) => results.push(result),
                Some(Outcome::Fail(message)) => anyhow::bail!(message),
                Some(Outcome::Panic(message)) => panic!("{}", message),
                None => results.push(LintResult::new(&key, Vec::new())),
            }
        }
        Ok(results)
    }

    async fn cleanup(&self) -> anyhow::Result<()> {
        self.cleanups.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn formatters(&self) -> &FormatterRegistry {
        &self.formatters
    }
}

pub(crate) fn warning_result(file: &str, message: &str) -> LintResult {
    LintResult::new(file, vec![LintMessage::warning("test-rule", message, 1, 1)])
}

pub(crate) fn error_result(file: &str, message: &str) -> LintResult {
    LintResult::new(file, vec![LintMessage::error("test-rule", message, 1, 1)])
}

pub(crate) fn mixed_result(file: &str) -> LintResult {
    LintResult::new(
        file,
        vec![
            LintMessage::error("test-rule", "an error", 1, 1),
            LintMessage::warning("test-rule", "a warning", 2, 1),
        ],
    )
}
