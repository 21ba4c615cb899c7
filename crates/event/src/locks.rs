use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError, Weak},
};

use tokio::sync::OwnedMutexGuard;
use ulid::Ulid;

const PRUNE_THRESHOLD: usize = 1024;

/// One async mutex per event id. Entries are created on demand and dropped
/// once no task holds or waits on them.
#[derive(Clone, Default)]
pub struct EventLocks {
    inner: Arc<Mutex<HashMap<Ulid, Weak<tokio::sync::Mutex<()>>>>>,
}

/// Held while a read-modify-write on one event is in progress.
pub struct EventLockGuard {
    event_id: Ulid,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for EventLockGuard {
    fn drop(&mut self) {
        tracing::trace!(event_id = %self.event_id, "released event lock");
    }
}

impl EventLocks {
    pub async fn lock(&self, event_id: Ulid) -> EventLockGuard {
        let mutex = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

            if map.len() >= PRUNE_THRESHOLD {
                map.retain(|_, weak| weak.strong_count() > 0);
            }

            match map.get(&event_id).and_then(Weak::upgrade) {
                Some(mutex) => mutex,
                None => {
                    let mutex = Arc::new(tokio::sync::Mutex::new(()));
                    map.insert(event_id, Arc::downgrade(&mutex));
                    mutex
                }
            }
        };

        let guard = mutex.lock_owned().await;
        tracing::trace!(event_id = %event_id, "acquired event lock");

        EventLockGuard {
            event_id,
            _guard: guard,
        }
    }

    /// Number of events with a live lock.
    pub fn len(&self) -> usize {
        let map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.values().filter(|weak| weak.strong_count() > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
