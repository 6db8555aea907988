//! Save-triggered analysis queue.
//!
//! Saves arrive in bursts. The queue waits for the debounce window before
//! dispatching a file, never holds the same file twice, and schedules exactly
//! one follow-up run for a file saved while its run is in flight.

use std::collections::HashSet;
use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tracing::debug;

#[derive(Debug, Default)]
struct QueueState {
    /// Waiting for dispatch.
    pending: HashSet<PathBuf>,
    /// Currently being analyzed.
    in_flight: HashSet<PathBuf>,
    /// Saved while in flight.
    rerun: HashSet<PathBuf>,
}

/// Handle to the queue worker.
#[derive(Debug, Clone)]
pub struct AnalysisQueue {
    tx: UnboundedSender<PathBuf>,
    state: Arc<Mutex<QueueState>>,
    debounce_ms: Arc<AtomicU64>,
}

impl AnalysisQueue {
    /// Spawns the worker on the current Tokio runtime.
    ///
    /// `run` is awaited once per dispatched file.
    pub fn spawn<F, Fut>(debounce: Duration, run: F) -> Self
    where
        F: Fn(PathBuf) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = unbounded_channel::<PathBuf>();
        let state = Arc::new(Mutex::new(QueueState::default()));
        let run = Arc::new(run);
        let debounce_ms = Arc::new(AtomicU64::new(duration_ms(debounce)));

        let worker_tx = tx.downgrade();
        let worker_state = Arc::clone(&state);
        let worker_debounce = Arc::clone(&debounce_ms);
        tokio::spawn(async move {
            while let Some(path) = rx.recv().await {
                let run = Arc::clone(&run);
                let state = Arc::clone(&worker_state);
                let tx = worker_tx.clone();
                let delay = Duration::from_millis(worker_debounce.load(Ordering::Relaxed));

                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;

                    {
                        let mut s = state.lock().unwrap_or_else(PoisonError::into_inner);
                        s.pending.remove(&path);
                        s.in_flight.insert(path.clone());
                    }

                    debug!("Dispatching analysis for {}", path.display());
                    run(path.clone()).await;

                    let follow_up = {
                        let mut s = state.lock().unwrap_or_else(PoisonError::into_inner);
                        s.in_flight.remove(&path);
                        s.rerun.remove(&path) && s.pending.insert(path.clone())
                    };

                    if follow_up
                        && let Some(tx) = tx.upgrade()
                        && tx.send(path.clone()).is_ok()
                    {
                        debug!("Scheduled follow-up analysis for {}", path.display());
                    }
                });
            }
        });

        Self {
            tx,
            state,
            debounce_ms,
        }
    }

    /// Changes the debounce window for files enqueued from now on.
    pub fn set_debounce(&self, debounce: Duration) {
        self.debounce_ms
            .store(duration_ms(debounce), Ordering::Relaxed);
    }

    /// Requests an analysis of `path`.
    ///
    /// Returns false when the request was merged into an existing one.
    pub fn enqueue(&self, path: PathBuf) -> bool {
        let mut s = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if s.pending.contains(&path) {
            debug!("Analysis already pending for {}", path.display());
            return false;
        }
        if s.in_flight.contains(&path) {
            debug!("Analysis in flight for {}, follow-up requested", path.display());
            s.rerun.insert(path);
            return false;
        }

        s.pending.insert(path.clone());
        if self.tx.send(path.clone()).is_err() {
            s.pending.remove(&path);
            return false;
        }
        true
    }

    /// Number of files waiting for dispatch.
    pub fn pending(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .len()
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
