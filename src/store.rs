//! Cross-pass result store.
//!
//! Each build context owns one [`ResultStore`] mapping normalized file paths
//! to the last known [`LintResult`]. The [`StoreRegistry`] hands out the
//! store for a context and only holds a weak reference to the context, so
//! dropping the context releases its store.

use crate::context::{lock, BuildContext, ContextId, ContextInner};
use crate::models::{normalize_path, LintResult};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Weak};
use tracing::debug;

/// Shared, mutable mapping from file path to last known result.
///
/// Absence of an entry means "no current known result", not "clean".
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    results: Arc<Mutex<BTreeMap<PathBuf, LintResult>>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove the entries for `files`. Returns how many were present.
    pub fn evict<I, P>(&self, files: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut results = lock(&self.results);
        files
            .into_iter()
            .filter(|file| results.remove(&normalize_path(file.as_ref())).is_some())
            .count()
    }

    /// Insert or overwrite entries keyed by each result's file path.
    pub fn merge<I>(&self, incoming: I) -> usize
    where
        I: IntoIterator<Item = LintResult>,
    {
        let mut results = lock(&self.results);
        let mut merged = 0;
        for result in incoming {
            results.insert(normalize_path(&result.file_path), result);
            merged += 1;
        }
        merged
    }

    pub fn get(&self, file: impl AsRef<Path>) -> Option<LintResult> {
        lock(&self.results)
            .get(&normalize_path(file.as_ref()))
            .cloned()
    }

    /// All known results, ordered by path.
    pub fn snapshot(&self) -> Vec<LintResult> {
        lock(&self.results).values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.results).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether both handles refer to the same underlying mapping.
    pub fn same_store(&self, other: &ResultStore) -> bool {
        Arc::ptr_eq(&self.results, &other.results)
    }
}

struct RegistryEntry {
    context: Weak<ContextInner>,
    store: ResultStore,
}

/// Associates each live build context with its result store.
#[derive(Clone, Default)]
pub struct StoreRegistry {
    entries: Arc<Mutex<HashMap<ContextId, RegistryEntry>>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the store for `context`, creating an empty one on first use.
    pub fn get_or_create(&self, context: &BuildContext) -> ResultStore {
        let mut entries = lock(&self.entries);
        prune(&mut entries);

        entries
            .entry(context.id())
            .or_insert_with(|| {
                debug!("Creating result store for context {:?}", context.id());
                RegistryEntry {
                    context: context.downgrade(),
                    store: ResultStore::new(),
                }
            })
            .store
            .clone()
    }

    /// Number of stores whose context is still alive.
    pub fn len(&self) -> usize {
        let mut entries = lock(&self.entries);
        prune(&mut entries);
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn prune(entries: &mut HashMap<ContextId, RegistryEntry>) {
    entries.retain(|id, entry| {
        let alive = entry.context.strong_count() > 0;
        if !alive {
            debug!("Releasing result store for dropped context {:?}", id);
        }
        alive
    });
}
