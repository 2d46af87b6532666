use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard};

use parcoord_core::models::DownloadQueue;
use parcoord_diskstate::{DiskState, StateFormat};

use crate::error::QueueError;

/// Persistence target for [`QueueGuard::save`].
pub trait QueueStore: Send + Sync {
    fn save(&self, queue: &DownloadQueue) -> anyhow::Result<()>;
}

impl<F: StateFormat> QueueStore for DiskState<F> {
    fn save(&self, queue: &DownloadQueue) -> anyhow::Result<()> {
        self.save_queue(queue)
    }
}

/// The download queue behind the single global lock.
///
/// Every reader and writer of collection, file and post-processing state goes
/// through [`SharedQueue::lock`]. The lock is not re-entrant: an entry point
/// locks once, acts, and drops the guard before calling anything that might
/// lock again.
pub struct SharedQueue {
    queue: Mutex<DownloadQueue>,
    store: Option<Arc<dyn QueueStore>>,
}

impl SharedQueue {
    pub fn new(queue: DownloadQueue) -> Self {
        Self {
            queue: Mutex::new(queue),
            store: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn QueueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn lock(&self) -> QueueGuard<'_> {
        QueueGuard {
            inner: self.queue.lock().expect("download queue lock"),
            store: self.store.as_deref(),
        }
    }
}

impl std::fmt::Debug for SharedQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedQueue")
            .field("has_store", &self.store.is_some())
            .finish_non_exhaustive()
    }
}

/// Scoped access to the locked queue; dropping it unlocks.
pub struct QueueGuard<'a> {
    inner: MutexGuard<'a, DownloadQueue>,
    store: Option<&'a dyn QueueStore>,
}

impl QueueGuard<'_> {
    pub fn save(&self) -> Result<(), QueueError> {
        match self.store {
            Some(store) => {
                store.save(&self.inner)?;
                tracing::debug!(nzbs = self.inner.queue.len(), "saved queue state");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Deref for QueueGuard<'_> {
    type Target = DownloadQueue;

    fn deref(&self) -> &DownloadQueue {
        &self.inner
    }
}

impl DerefMut for QueueGuard<'_> {
    fn deref_mut(&mut self) -> &mut DownloadQueue {
        &mut self.inner
    }
}
