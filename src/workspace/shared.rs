//! Thread-safe handle to a workspace.

use std::sync::{Arc, Mutex, MutexGuard};

use super::Workspace;
use crate::error::LabelerError;

/// A workspace behind a single mutex.
///
/// Every load, assign, clear, delete and persist runs while holding the
/// lock, so concurrent callers cannot lose each other's updates.
#[derive(Clone, Debug)]
pub struct SharedWorkspace {
    inner: Arc<Mutex<Workspace>>,
}

impl SharedWorkspace {
    pub fn new(workspace: Workspace) -> Self {
        Self {
            inner: Arc::new(Mutex::new(workspace)),
        }
    }

    /// Locks the workspace for the duration of the returned guard.
    pub fn lock(&self) -> Result<MutexGuard<'_, Workspace>, LabelerError> {
        self.inner.lock().map_err(|_| LabelerError::Poisoned)
    }

    /// Runs `f` with exclusive access to the workspace.
    pub fn with<T>(
        &self,
        f: impl FnOnce(&mut Workspace) -> Result<T, LabelerError>,
    ) -> Result<T, LabelerError> {
        let mut guard = self.lock()?;
        f(&mut *guard)
    }
}
