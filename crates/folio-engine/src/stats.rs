//! Shared statistics state with a pending-sync flag

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use folio_core::StatsSnapshot;

#[derive(Debug, Clone, Default)]
pub struct StatsState {
    pub snapshot: Option<StatsSnapshot>,
    pub syncing: bool,
    /// Message from the last failed fetch or sync
    pub error: Option<String>,
}

/// Cloneable handle, so a UI can watch a sync that is still running
#[derive(Debug, Clone, Default)]
pub struct StatsHandle {
    inner: Arc<RwLock<StatsState>>,
}

impl StatsHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> StatsState {
        self.read().clone()
    }

    pub fn snapshot(&self) -> Option<StatsSnapshot> {
        self.read().snapshot.clone()
    }

    pub fn is_syncing(&self) -> bool {
        self.read().syncing
    }

    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    /// Mark a sync as started. Returns `None` if one is already running.
    ///
    /// Dropping the guard without calling [`SyncGuard::finish`] clears the
    /// flag, so an abandoned sync does not block the next one.
    pub(crate) fn begin_sync(&self) -> Option<SyncGuard> {
        let mut state = self.write();
        if state.syncing {
            return None;
        }
        state.syncing = true;
        state.error = None;
        Some(SyncGuard {
            handle: self.clone(),
            finished: false,
        })
    }

    fn finish_sync(&self, result: Result<StatsSnapshot, String>) {
        let mut state = self.write();
        state.syncing = false;
        match result {
            Ok(snapshot) => {
                state.snapshot = Some(snapshot);
                state.error = None;
            }
            Err(message) => state.error = Some(message),
        }
    }

    pub(crate) fn set_snapshot(&self, snapshot: Option<StatsSnapshot>) {
        let mut state = self.write();
        state.snapshot = snapshot;
        state.error = None;
    }

    pub(crate) fn set_error(&self, message: String) {
        self.write().error = Some(message);
    }

    fn read(&self) -> RwLockReadGuard<'_, StatsState> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, StatsState> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Holds the *syncing* flag for one running sync
pub(crate) struct SyncGuard {
    handle: StatsHandle,
    finished: bool,
}

impl SyncGuard {
    pub(crate) fn finish(mut self, result: Result<StatsSnapshot, String>) {
        self.finished = true;
        self.handle.finish_sync(result);
    }
}

impl Drop for SyncGuard {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!("Stats sync abandoned before it finished");
            self.handle.write().syncing = false;
        }
    }
}
