//! Build context: the long-lived identity of one build session.
//!
//! A context carries the pieces of the host build that the linter core
//! needs: an error sink for build-level errors, the output directory used to
//! resolve relative report paths, and the filesystem used to write reports.

use crate::error::LintError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::error;

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a build context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

/// Filesystem capability used to persist report assets.
#[async_trait]
pub trait OutputFileSystem: Send + Sync {
    /// Recursively create `path` and all of its parents.
    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()>;

    /// Write `contents` to `path`, replacing any existing file.
    async fn write(&self, path: &Path, contents: &[u8]) -> std::io::Result<()>;
}

/// [`OutputFileSystem`] backed by `tokio::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioFileSystem;

#[async_trait]
impl OutputFileSystem for TokioFileSystem {
    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> std::io::Result<()> {
        tokio::fs::write(path, contents).await
    }
}

pub(crate) struct ContextInner {
    id: ContextId,
    output_dir: PathBuf,
    fs: Arc<dyn OutputFileSystem>,
    errors: Mutex<Vec<LintError>>,
}

/// Handle to a build context. Clones share the same identity.
#[derive(Clone)]
pub struct BuildContext {
    inner: Arc<ContextInner>,
}

impl BuildContext {
    /// Create a context writing through `tokio::fs`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_fs(output_dir, Arc::new(TokioFileSystem))
    }

    /// Create a context with a custom filesystem.
    pub fn with_fs(output_dir: impl Into<PathBuf>, fs: Arc<dyn OutputFileSystem>) -> Self {
        let id = ContextId(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed));
        Self {
            inner: Arc::new(ContextInner {
                id,
                output_dir: output_dir.into(),
                fs,
                errors: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn id(&self) -> ContextId {
        self.inner.id
    }

    /// Directory relative report paths are resolved against.
    pub fn output_dir(&self) -> &Path {
        &self.inner.output_dir
    }

    pub fn fs(&self) -> &dyn OutputFileSystem {
        self.inner.fs.as_ref()
    }

    /// Record a build-level error.
    pub fn push_error(&self, err: LintError) {
        error!("{}", err);
        lock(&self.inner.errors).push(err);
    }

    /// Number of build-level errors recorded so far.
    pub fn error_count(&self) -> usize {
        lock(&self.inner.errors).len()
    }

    /// Remove and return all recorded build-level errors.
    pub fn take_errors(&self) -> Vec<LintError> {
        std::mem::take(&mut *lock(&self.inner.errors))
    }

    pub(crate) fn downgrade(&self) -> Weak<ContextInner> {
        Arc::downgrade(&self.inner)
    }
}

impl std::fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext")
            .field("id", &self.inner.id)
            .field("output_dir", &self.inner.output_dir)
            .finish()
    }
}

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
