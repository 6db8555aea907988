//! Process-wide diagnostic state.

use std::collections::HashMap;
use std::fmt;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::debug;

use crate::{FileId, FileReport, IssueRecord};

/// Score assumed for a file cleared without a prior report.
const CLEAN_SCORE: f64 = 100.0;

/// A change that observers of the store are told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// These files now have a new report (possibly empty).
    Updated(Vec<FileId>),
    /// This file was removed and is now "never analyzed".
    Removed(FileId),
}

#[derive(Default)]
struct StoreInner {
    entries: HashMap<FileId, FileReport>,
    root_scores: HashMap<FileId, f64>,
}

/// Mapping from file identity to its latest [`FileReport`].
///
/// An absent key means the file was never analyzed; a report with no issues
/// means it was analyzed and is clean. All mutations go through one
/// internal lock, so a batch published by [`replace_many`](Self::replace_many)
/// becomes visible to readers all at once, and two writers to the same key
/// are ordered by when they acquire the lock.
///
/// The store is an explicit instance: create it at startup and pass it by
/// reference to sessions.
pub struct DiagnosticStore {
    inner: RwLock<StoreInner>,
    observers: Mutex<Vec<UnboundedSender<StoreEvent>>>,
}

impl fmt::Debug for DiagnosticStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("DiagnosticStore")
            .field("entries", &inner.entries.len())
            .field("root_scores", &inner.root_scores.len())
            .finish()
    }
}

impl Default for DiagnosticStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Overwrites the entry for one file.
    pub fn replace(&self, id: FileId, report: FileReport) {
        {
            let mut inner = self.inner.write();
            inner.entries.insert(id.clone(), report);
        }
        debug!("Replaced diagnostics for {}", id);
        self.notify(StoreEvent::Updated(vec![id]));
    }

    /// Overwrites the entries for a batch of files.
    ///
    /// Equivalent to calling [`replace`](Self::replace) for each pair in
    /// order, but readers never observe a partially applied batch.
    pub fn replace_many(&self, reports: impl IntoIterator<Item = (FileId, FileReport)>) {
        let mut ids = Vec::new();
        {
            let mut inner = self.inner.write();
            for (id, report) in reports {
                inner.entries.insert(id.clone(), report);
                ids.push(id);
            }
        }
        if ids.is_empty() {
            return;
        }
        debug!("Replaced diagnostics for {} files", ids.len());
        self.notify(StoreEvent::Updated(ids));
    }

    /// Marks a file as analyzed with zero issues.
    ///
    /// The previous score is kept when there is one.
    pub fn clear(&self, id: &FileId) {
        {
            let mut inner = self.inner.write();
            match inner.entries.get_mut(id) {
                Some(report) => report.issues.clear(),
                None => {
                    inner.entries.insert(
                        id.clone(),
                        FileReport::clean(id.clone(), id.clone(), CLEAN_SCORE),
                    );
                }
            }
        }
        self.notify(StoreEvent::Updated(vec![id.clone()]));
    }

    /// Forgets a file entirely, e.g. after it was deleted.
    pub fn remove(&self, id: &FileId) -> Option<FileReport> {
        let removed = self.inner.write().entries.remove(id);
        if removed.is_some() {
            self.notify(StoreEvent::Removed(id.clone()));
        }
        removed
    }

    /// Returns the current report for a file.
    pub fn get(&self, id: &FileId) -> Option<FileReport> {
        self.inner.read().entries.get(id).cloned()
    }

    /// Returns true when the file has been analyzed.
    pub fn contains(&self, id: &FileId) -> bool {
        self.inner.read().entries.contains_key(id)
    }

    /// Returns the current issues for a file, empty when never analyzed.
    pub fn diagnostics(&self, id: &FileId) -> Vec<IssueRecord> {
        self.inner
            .read()
            .entries
            .get(id)
            .map(|r| r.issues.clone())
            .unwrap_or_default()
    }

    /// Returns the score of the analysis that produced a file's report.
    pub fn score(&self, id: &FileId) -> Option<f64> {
        self.inner.read().entries.get(id).map(|r| r.score)
    }

    /// Records the aggregate score of the latest run over `root`.
    pub fn set_root_score(&self, root: FileId, score: f64) {
        self.inner.write().root_scores.insert(root, score);
    }

    /// Returns the aggregate score of the latest run over `root`.
    pub fn root_score(&self, root: &FileId) -> Option<f64> {
        self.inner.read().root_scores.get(root).copied()
    }

    /// Number of analyzed files.
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Returns true when no file has been analyzed.
    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// Returns all reports sorted by identity.
    pub fn snapshot(&self) -> Vec<FileReport> {
        let mut reports: Vec<FileReport> = self.inner.read().entries.values().cloned().collect();
        reports.sort_by(|a, b| a.id.cmp(&b.id));
        reports
    }

    /// Registers an observer. Events are sent after the change is visible.
    pub fn subscribe(&self) -> UnboundedReceiver<StoreEvent> {
        let (tx, rx) = unbounded_channel();
        self.observers.lock().push(tx);
        rx
    }

    fn notify(&self, event: StoreEvent) {
        let mut observers = self.observers.lock();
        observers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Severity;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::thread;

    fn report(id: &str, score: f64, issues: usize) -> FileReport {
        FileReport {
            id: id.into(),
            path: id.into(),
            score,
            issues: (0..issues)
                .map(|i| IssueRecord::new(i as u32 + 1, Severity::Warning, format!("issue {i}")))
                .collect(),
        }
    }

    #[test]
    fn test_absent_vs_clean() {
        let store = DiagnosticStore::new();
        let id = FileId::from("/ws/a.yaml");

        assert!(store.get(&id).is_none());
        assert!(!store.contains(&id));

        store.clear(&id);

        let entry = store.get(&id).unwrap();
        assert!(entry.issues.is_empty());
        assert!(store.contains(&id));
    }

    #[test]
    fn test_clear_keeps_score() {
        let store = DiagnosticStore::new();
        let id = FileId::from("/ws/a.yaml");
        store.replace(id.clone(), report("/ws/a.yaml", 42.0, 3));

        store.clear(&id);

        assert_eq!(store.score(&id), Some(42.0));
        assert!(store.diagnostics(&id).is_empty());
    }

    #[test]
    fn test_replace_isolation() {
        let store = DiagnosticStore::new();
        let a = FileId::from("/ws/a.yaml");
        let b = FileId::from("/ws/b.yaml");
        store.replace(b.clone(), report("/ws/b.yaml", 10.0, 2));
        let before = store.get(&b);

        store.replace(a.clone(), report("/ws/a.yaml", 90.0, 1));
        store.replace(a.clone(), report("/ws/a.yaml", 95.0, 0));

        assert_eq!(store.get(&b), before);
        assert_eq!(store.score(&a), Some(95.0));
    }

    #[test]
    fn test_replace_many_last_wins_in_order() {
        let store = DiagnosticStore::new();
        let a = FileId::from("/ws/a.yaml");

        store.replace_many(vec![
            (a.clone(), report("/ws/a.yaml", 1.0, 1)),
            (a.clone(), report("/ws/a.yaml", 2.0, 2)),
        ]);

        assert_eq!(store.diagnostics(&a).len(), 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove() {
        let store = DiagnosticStore::new();
        let a = FileId::from("/ws/a.yaml");
        store.clear(&a);

        assert!(store.remove(&a).is_some());
        assert!(store.get(&a).is_none());
        assert!(store.remove(&a).is_none());
    }

    #[test]
    fn test_root_score() {
        let store = DiagnosticStore::new();
        let root = FileId::from("/ws");
        assert_eq!(store.root_score(&root), None);
        store.set_root_score(root.clone(), 77.0);
        assert_eq!(store.root_score(&root), Some(77.0));
    }

    #[test]
    fn test_snapshot_sorted() {
        let store = DiagnosticStore::new();
        store.replace_many(vec![
            ("/ws/b.yaml".into(), report("/ws/b.yaml", 1.0, 0)),
            ("/ws/a.yaml".into(), report("/ws/a.yaml", 1.0, 0)),
        ]);

        let ids: Vec<_> = store
            .snapshot()
            .into_iter()
            .map(|r| r.id.to_string())
            .collect();
        assert_eq!(ids, vec!["/ws/a.yaml", "/ws/b.yaml"]);
    }

    #[test]
    fn test_subscribe_receives_events() {
        let store = DiagnosticStore::new();
        let mut rx = store.subscribe();
        let a = FileId::from("/ws/a.yaml");

        store.replace_many(vec![(a.clone(), report("/ws/a.yaml", 1.0, 0))]);
        store.remove(&a);

        assert_eq!(rx.try_recv().unwrap(), StoreEvent::Updated(vec![a.clone()]));
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::Removed(a));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_observer_is_pruned() {
        let store = DiagnosticStore::new();
        drop(store.subscribe());

        store.clear(&FileId::from("/ws/a.yaml"));

        assert!(store.observers.lock().is_empty());
    }

    #[test]
    fn test_batch_is_never_partially_visible() {
        let store = Arc::new(DiagnosticStore::new());
        let ids: Vec<FileId> = (0..50).map(|i| FileId::from(format!("/ws/{i}.yaml").as_str())).collect();

        let writer = {
            let store = Arc::clone(&store);
            let ids = ids.clone();
            thread::spawn(move || {
                for generation in 1..=200u32 {
                    store.replace_many(ids.iter().map(|id| {
                        let mut r = report(id.as_str(), f64::from(generation), 0);
                        r.id = id.clone();
                        (id.clone(), r)
                    }));
                }
            })
        };

        for _ in 0..200 {
            let snapshot = store.snapshot();
            if let Some(first) = snapshot.first() {
                assert_eq!(snapshot.len(), ids.len());
                assert!(snapshot.iter().all(|r| r.score == first.score));
            }
        }

        writer.join().unwrap();
        assert_eq!(store.score(&ids[0]), Some(200.0));
    }
}
