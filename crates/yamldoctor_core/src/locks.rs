//! Per-root run serialization.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::FileId;

/// One async mutex per analysis root.
///
/// Holding the guard returned by [`acquire`](Self::acquire) for the whole
/// duration of a run keeps at most one run in flight per root.
#[derive(Debug, Default)]
pub struct RootLocks {
    locks: Mutex<HashMap<FileId, Arc<AsyncMutex<()>>>>,
}

impl RootLocks {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive use of `root`.
    pub async fn acquire(&self, root: &FileId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock();
            Arc::clone(locks.entry(root.clone()).or_default())
        };
        lock.lock_owned().await
    }
}
